// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Utility CSS classes emitted into rendered pages.

pub const CONTAINER: &str = "container mx-auto p-4";
pub const HEADING: &str = "text-2xl font-bold mb-4 text-gray-800";
pub const INPUT: &str =
    "w-full p-2 border border-gray-300 rounded shadow-sm focus:outline-none focus:ring-2 focus:ring-blue-500";
pub const LOADING_TEXT: &str = "text-blue-500";
pub const ERROR_TEXT: &str = "text-red-500";
pub const NO_RESULTS_TEXT: &str = "text-gray-500";
pub const GRID: &str = "grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-6";
pub const CARD: &str =
    "p-6 border border-gray-300 rounded-lg shadow-md bg-gray-100 hover:shadow-lg transition-shadow";
pub const CARD_HEADING: &str = "text-xl font-semibold mb-2 text-gray-900";
pub const LIST_ITEM: &str = "capitalize text-gray-700";
pub const IMAGE: &str = "max-w-full h-auto rounded shadow-md";
pub const LINK: &str = "text-blue-500 underline hover:text-blue-700";
pub const RICH_TEXT: &str = "text-gray-800 leading-relaxed";
pub const SOCIAL_LINK: &str = "text-green-500 underline hover:text-green-700";
pub const BUTTON: &str = "mt-4 px-3 py-1 rounded bg-blue-500 text-white hover:bg-blue-700";
pub const NESTED_CARD: &str = "mt-2 p-3 border-l-4 border-gray-300";
