// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Catalog search: fetch, name filtering, and the per-page search state.

use crate::models::catalog::Catalog;
use crate::models::content::ContentItem;
use crate::services::delivery::{CmsError, ContentSource};

/// Fetch a catalog's items and keep those whose name contains `query`,
/// ignoring case. Delivery order is preserved.
pub async fn search_catalog(
    source: &dyn ContentSource,
    catalog: &Catalog,
    query: &str,
    preview: bool,
) -> Result<Vec<ContentItem>, CmsError> {
    let request = catalog.items_query().with_preview(preview);
    let items = source.fetch_items(&request).await?;
    let fetched = items.len();
    let matches = filter_by_name(items, catalog, query);

    tracing::debug!(
        catalog = %catalog.kind,
        query,
        fetched,
        matched = matches.len(),
        "Catalog search finished"
    );
    Ok(matches)
}

/// Keep items of the catalog's content type whose name field contains
/// `query`, case-insensitively. Items without a text name never match.
pub fn filter_by_name(items: Vec<ContentItem>, catalog: &Catalog, query: &str) -> Vec<ContentItem> {
    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| item.system.content_type == catalog.content_type)
        .filter(|item| {
            item.text(catalog.name_field)
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Display state of one search page
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// No query entered
    Idle,
    /// Fetch in flight
    Loading,
    Results(Vec<ContentItem>),
    NoMatches,
    Failed,
}

/// Handle for one started search. Its outcome is applied only while the
/// ticket's generation is still the page's current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

/// Search lifecycle of one page: idle → loading → results / no matches /
/// failed, plus selection of a single result for the detail view.
#[derive(Debug)]
pub struct SearchPage {
    catalog: &'static Catalog,
    generation: u64,
    query: String,
    status: SearchStatus,
    /// `system.id` of the item shown in the detail view
    selected: Option<String>,
}

impl SearchPage {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            generation: 0,
            query: String::new(),
            status: SearchStatus::Idle,
            selected: None,
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// React to a new debounced query.
    ///
    /// Returns a ticket when a fetch must be started. Clearing the query
    /// returns to idle and invalidates any fetch still in flight.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        if query.is_empty() {
            self.generation += 1;
            self.query.clear();
            self.status = SearchStatus::Idle;
            self.selected = None;
            return None;
        }
        if query == self.query && self.status != SearchStatus::Idle {
            return None;
        }

        self.generation += 1;
        self.query = query.to_string();
        self.status = SearchStatus::Loading;
        self.selected = None;

        Some(SearchTicket {
            generation: self.generation,
            query: self.query.clone(),
        })
    }

    /// Apply the outcome of a search. Returns false when the ticket has been
    /// superseded and the outcome was discarded.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<ContentItem>, CmsError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                query = %ticket.query,
                "Discarding superseded search result"
            );
            return false;
        }

        self.status = match outcome {
            Ok(items) if items.is_empty() => SearchStatus::NoMatches,
            Ok(items) => SearchStatus::Results(items),
            Err(e) => {
                tracing::warn!(catalog = %self.catalog.kind, query = %ticket.query, error = %e, "Search failed");
                SearchStatus::Failed
            }
        };
        true
    }

    /// User-facing message for the current state, if it carries one.
    pub fn message(&self) -> Option<String> {
        match self.status {
            SearchStatus::NoMatches => Some(self.catalog.no_match_message()),
            SearchStatus::Failed => Some(self.catalog.error_message()),
            _ => None,
        }
    }

    pub fn results(&self) -> &[ContentItem] {
        match &self.status {
            SearchStatus::Results(items) => items,
            _ => &[],
        }
    }

    /// Switch to the detail view of a displayed result.
    pub fn select(&mut self, id: &str) -> bool {
        if self.results().iter().any(|item| item.system.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Back to the result list; the results are kept.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected_item(&self) -> Option<&ContentItem> {
        let id = self.selected.as_deref()?;
        self.results().iter().find(|item| item.system.id == id)
    }
}
