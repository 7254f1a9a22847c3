// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// Message sent by the browser over the live search socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Current contents of the search input, sent on every keystroke
    Query { text: String },
    /// Open the detail view of a result
    Select { id: String },
    /// Return from the detail view to the result list
    Back,
}

/// Message pushed to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Replacement markup for the view area
    View { html: String },
}
