// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::catalog::{Catalog, CatalogKind};
use crate::models::content::ContentItem;
use crate::models::search::{ItemSummary, SearchApiResponse, SearchParams};
use crate::models::version::VersionResponse;
use crate::routes::live_search_handler;
use crate::services::delivery::{CmsError, ContentSource};
use crate::services::fields::FieldRenderer;
use crate::services::pages::{
    render_detail_page, render_index, render_message_page, render_search_page, render_view,
};
use crate::services::search::{search_catalog, SearchPage};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `GIG_GUIDE_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("GIG_GUIDE_VERSION");

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Where catalog content is read from; the delivery API in production.
    pub source: Arc<dyn ContentSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }
}

type HtmlResponse = (StatusCode, Html<String>);

/// Resolve the `{catalog}` path segment, 404 for anything unknown.
pub fn parse_catalog(segment: &str) -> Result<CatalogKind, (StatusCode, String)> {
    segment
        .parse::<CatalogKind>()
        .map_err(|e| (StatusCode::NOT_FOUND, e))
}

fn cms_status(error: &CmsError) -> StatusCode {
    match error {
        CmsError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "gig-guide".to_string(),
        version: VERSION.to_string(),
    })
}

pub async fn index_handler() -> Html<String> {
    Html(render_index())
}

/// Search page. With `q` the result view is rendered server-side so the page
/// works without the live socket.
pub async fn search_page_handler(
    State(state): State<AppState>,
    Path(catalog): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let catalog = parse_catalog(&catalog)?.catalog();
    let fields = FieldRenderer::for_catalog(catalog);
    let mut page = SearchPage::new(catalog);

    if let Some(ticket) = page.begin(params.query()) {
        let outcome =
            search_catalog(state.source.as_ref(), catalog, &ticket.query, params.preview()).await;
        page.complete(ticket, outcome);
    }

    let view = render_view(&page, &fields);
    Ok(Html(render_search_page(
        catalog,
        params.query(),
        params.preview(),
        &view,
    )))
}

/// Detail page of one item, by codename.
pub async fn item_page_handler(
    State(state): State<AppState>,
    Path((catalog, codename)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
) -> Result<HtmlResponse, (StatusCode, String)> {
    let catalog = parse_catalog(&catalog)?.catalog();

    let item = match state.source.fetch_item(&codename, params.preview()).await {
        Ok(item) if item.system.content_type == catalog.content_type => Some(item),
        Ok(_) | Err(CmsError::NotFound(_)) => None,
        Err(e) => {
            tracing::error!(catalog = %catalog.kind, codename = %codename, error = %e, "Failed to load item");
            return Ok(detail_error(catalog, cms_status(&e)));
        }
    };

    Ok(detail_response(catalog, item))
}

/// Detail page of one item, by URL slug.
pub async fn slug_page_handler(
    State(state): State<AppState>,
    Path((catalog, slug)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
) -> Result<HtmlResponse, (StatusCode, String)> {
    let catalog = parse_catalog(&catalog)?.catalog();
    let query = catalog.slug_query(&slug).with_preview(params.preview());

    let item = match state.source.fetch_items(&query).await {
        Ok(items) => items
            .into_iter()
            .find(|item| item.system.content_type == catalog.content_type),
        Err(e) => {
            tracing::error!(catalog = %catalog.kind, slug = %slug, error = %e, "Failed to load item by slug");
            return Ok(detail_error(catalog, cms_status(&e)));
        }
    };

    Ok(detail_response(catalog, item))
}

fn detail_response(catalog: &Catalog, item: Option<ContentItem>) -> HtmlResponse {
    match item {
        Some(item) => (
            StatusCode::OK,
            Html(render_detail_page(
                catalog,
                &item,
                &FieldRenderer::for_catalog(catalog),
            )),
        ),
        None => detail_error(catalog, StatusCode::NOT_FOUND),
    }
}

fn detail_error(catalog: &Catalog, status: StatusCode) -> HtmlResponse {
    let message = if status == StatusCode::NOT_FOUND {
        format!("No matching {} found.", catalog.noun)
    } else {
        catalog.error_message()
    };
    (status, Html(render_message_page(catalog, &message)))
}

/// Search a catalog by name
#[utoipa::path(
    get,
    path = "/api/search/{catalog}",
    params(
        ("catalog" = String, Path, description = "Catalog to search: `artists` or `venues`"),
        SearchParams
    ),
    responses(
        (status = 200, description = "Matching items in delivery order", body = SearchApiResponse),
        (status = 404, description = "Unknown catalog"),
        (status = 502, description = "Content delivery API unavailable")
    ),
    tag = "search"
)]
pub async fn api_search_handler(
    State(state): State<AppState>,
    Path(catalog): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchApiResponse>, (StatusCode, String)> {
    let catalog = parse_catalog(&catalog)?.catalog();
    let query = params.query();

    let items = if query.is_empty() {
        Vec::new()
    } else {
        search_catalog(state.source.as_ref(), catalog, query, params.preview())
            .await
            .map_err(|e| {
                tracing::warn!(catalog = %catalog.kind, query, error = %e, "Search failed");
                (cms_status(&e), catalog.error_message())
            })?
    };

    let results: Vec<ItemSummary> = items.iter().map(|item| summarize(catalog, item)).collect();
    let message = (!query.is_empty() && results.is_empty()).then(|| catalog.no_match_message());

    Ok(Json(SearchApiResponse {
        catalog: catalog.kind.to_string(),
        query: query.to_string(),
        total: results.len(),
        results,
        message,
    }))
}

fn summarize(catalog: &Catalog, item: &ContentItem) -> ItemSummary {
    ItemSummary {
        id: item.system.id.clone(),
        codename: item.system.codename.clone(),
        name: item
            .text(catalog.name_field)
            .unwrap_or(item.system.name.as_str())
            .to_string(),
        content_type: item.system.content_type.clone(),
        detail_path: catalog.item_path(&item.system.codename),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(api_search_handler),
    components(schemas(SearchApiResponse, ItemSummary)),
    tags((name = "search", description = "Artist and venue search"))
)]
pub struct SearchApiDoc;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router, Swagger UI included.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/version", get(version_handler))
        .route("/search/{catalog}", get(search_page_handler))
        .route("/search/{catalog}/live", get(live_search_handler))
        .route("/search/{catalog}/items/{codename}", get(item_page_handler))
        .route("/search/{catalog}/slug/{slug}", get(slug_page_handler))
        .route("/api/search/{catalog}", get(api_search_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", SearchApiDoc::openapi()))
}
