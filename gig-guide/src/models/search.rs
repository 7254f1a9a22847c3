// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Depth of linked items requested from the delivery API.
pub const DEFAULT_DEPTH: u32 = 5;

/// Query against the delivery API item listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsQuery {
    /// Restrict to one content type (`system.type`)
    pub content_type: Option<String>,
    /// Exact-match element filters, e.g. `("elements.slug", "the-wind")`
    pub equals: Vec<(String, String)>,
    /// Linked-item depth
    pub depth: u32,
    /// Read unpublished content through the preview API
    pub preview: bool,
}

impl ItemsQuery {
    pub fn of_type(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            equals: Vec::new(),
            depth: DEFAULT_DEPTH,
            preview: false,
        }
    }

    pub fn with_equals(mut self, element: &str, value: &str) -> Self {
        self.equals.push((element.to_string(), value.to_string()));
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

/// Query string accepted by the search page and the JSON search API
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive name fragment
    pub q: Option<String>,
    /// Read unpublished content through the preview API
    pub preview: Option<bool>,
}

impl SearchParams {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }

    pub fn preview(&self) -> bool {
        self.preview.unwrap_or(false)
    }
}

/// Condensed view of a matching item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemSummary {
    pub id: String,
    pub codename: String,
    pub name: String,
    pub content_type: String,
    /// Path of the item's detail page
    pub detail_path: String,
}

/// JSON search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchApiResponse {
    pub catalog: String,
    pub query: String,
    /// Matching items in delivery order
    pub results: Vec<ItemSummary>,
    pub total: usize,
    /// User-facing message when nothing matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_query_defaults() {
        let query = ItemsQuery::of_type("venue");
        assert_eq!(query.content_type.as_deref(), Some("venue"));
        assert_eq!(query.depth, DEFAULT_DEPTH);
        assert!(!query.preview);
        assert!(query.equals.is_empty());
    }

    #[test]
    fn test_search_params_defaults() {
        let params = SearchParams::default();
        assert_eq!(params.query(), "");
        assert!(!params.preview());
    }
}
