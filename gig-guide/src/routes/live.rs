// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Live search over a WebSocket.
//!
//! Each connection owns one [`SearchPage`]. Keystrokes go through a
//! [`Debouncer`]; settled queries start a fetch task whose outcome is applied
//! only if no newer search has begun since.

use crate::app::{parse_catalog, AppState};
use crate::models::catalog::Catalog;
use crate::models::content::ContentItem;
use crate::models::live::{ClientMessage, ServerMessage};
use crate::models::search::SearchParams;
use crate::services::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::services::delivery::{CmsError, ContentSource};
use crate::services::fields::FieldRenderer;
use crate::services::pages::render_view;
use crate::services::search::{search_catalog, SearchPage, SearchTicket};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

type SearchOutcome = (SearchTicket, Result<Vec<ContentItem>, CmsError>);

/// One browser's live search page
pub struct LiveSession {
    source: Arc<dyn ContentSource>,
    catalog: &'static Catalog,
    fields: FieldRenderer,
    preview: bool,
}

impl LiveSession {
    pub fn new(source: Arc<dyn ContentSource>, catalog: &'static Catalog, preview: bool) -> Self {
        Self {
            source,
            catalog,
            fields: FieldRenderer::for_catalog(catalog),
            preview,
        }
    }

    /// Run until `inbound` closes, pushing a fresh view whenever the page
    /// state changes.
    pub async fn drive(
        self,
        mut inbound: mpsc::Receiver<ClientMessage>,
        outbound: mpsc::Sender<ServerMessage>,
    ) {
        let mut page = SearchPage::new(self.catalog);
        let (debouncer, mut settled) = Debouncer::spawn(SEARCH_DEBOUNCE);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SearchOutcome>();
        let mut in_flight: Option<JoinHandle<()>> = None;

        if self.send_view(&page, &outbound).await.is_err() {
            return;
        }

        loop {
            let changed = tokio::select! {
                message = inbound.recv() => match message {
                    Some(ClientMessage::Query { text }) => {
                        debouncer.push(text);
                        false
                    }
                    Some(ClientMessage::Select { id }) => page.select(&id),
                    Some(ClientMessage::Back) => {
                        page.deselect();
                        true
                    }
                    None => break,
                },
                Some(query) = settled.recv() => {
                    if let Some(previous) = in_flight.take() {
                        previous.abort();
                    }
                    if let Some(ticket) = page.begin(&query) {
                        in_flight = Some(self.start_search(ticket, done_tx.clone()));
                    }
                    true
                }
                Some((ticket, outcome)) = done_rx.recv() => page.complete(ticket, outcome),
            };

            if changed && self.send_view(&page, &outbound).await.is_err() {
                break;
            }
        }

        if let Some(task) = in_flight {
            task.abort();
        }
        tracing::debug!(generation = page.generation(), "Live session closed");
    }

    fn start_search(
        &self,
        ticket: SearchTicket,
        done: mpsc::UnboundedSender<SearchOutcome>,
    ) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let catalog = self.catalog;
        let preview = self.preview;
        tokio::spawn(
            async move {
                let outcome = search_catalog(source.as_ref(), catalog, &ticket.query, preview).await;
                // The session may already be gone
                let _ = done.send((ticket, outcome));
            }
            .in_current_span(),
        )
    }

    async fn send_view(
        &self,
        page: &SearchPage,
        outbound: &mpsc::Sender<ServerMessage>,
    ) -> Result<(), mpsc::error::SendError<ServerMessage>> {
        let html = render_view(page, &self.fields);
        outbound.send(ServerMessage::View { html }).await
    }
}

pub async fn live_search_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(catalog): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Response, (StatusCode, String)> {
    let catalog = parse_catalog(&catalog)?.catalog();
    let session = LiveSession::new(state.source.clone(), catalog, params.preview());
    let span = tracing::info_span!("live_search", session = %Uuid::now_v7(), catalog = %catalog.kind);

    Ok(ws.on_upgrade(move |socket| serve_socket(socket, session).instrument(span)))
}

/// Bridge a WebSocket to a [`LiveSession`].
async fn serve_socket(socket: WebSocket, session: LiveSession) {
    let (mut sink, mut stream) = socket.split();
    let (inbound_tx, inbound_rx) = mpsc::channel::<ClientMessage>(32);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerMessage>(32);

    tracing::info!("Live session opened");

    let reader = async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(message) => {
                        if inbound_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Ignoring malformed client message"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    };

    let writer = async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode view");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    };

    tokio::join!(reader, session.drive(inbound_rx, outbound_tx), writer);
}
