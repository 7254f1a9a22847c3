// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod debounce;
pub mod delivery;
pub mod fields;
pub mod logging;
pub mod markup;
pub mod pages;
pub mod rich_text;
pub mod search;
pub mod styles;
