// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Route handlers that hold a connection open beyond one request.

pub mod live;

pub use live::{live_search_handler, LiveSession};
