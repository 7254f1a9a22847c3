// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use futures::future::BoxFuture;
use futures::FutureExt;
use gig_guide::models::catalog::CatalogKind;
use gig_guide::models::content::{ContentItem, Field, SystemInfo};
use gig_guide::models::live::{ClientMessage, ServerMessage};
use gig_guide::models::search::ItemsQuery;
use gig_guide::routes::LiveSession;
use gig_guide::services::delivery::{CmsError, ContentSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

/// Serves a fixed band list. The n-th fetch takes `delays[n]`; `None`
/// entries fail instead.
struct ScriptedSource {
    items: Vec<ContentItem>,
    delays: Vec<Option<Duration>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(delays: Vec<Option<Duration>>) -> Arc<Self> {
        Arc::new(Self {
            items: vec![
                band("1", "The Mighty Wind"),
                band("2", "Brass Lungs"),
                band("3", "Windy City"),
            ],
            delays,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentSource for ScriptedSource {
    fn fetch_items<'a>(
        &'a self,
        _query: &'a ItemsQuery,
    ) -> BoxFuture<'a, Result<Vec<ContentItem>, CmsError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .get(call)
            .copied()
            .unwrap_or(Some(Duration::from_millis(10)));
        async move {
            match delay {
                Some(delay) => {
                    sleep(delay).await;
                    Ok(self.items.clone())
                }
                None => Err(CmsError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }
        .boxed()
    }

    fn fetch_item<'a>(
        &'a self,
        codename: &'a str,
        _preview: bool,
    ) -> BoxFuture<'a, Result<ContentItem, CmsError>> {
        async move { Err(CmsError::NotFound(codename.to_string())) }.boxed()
    }
}

fn band(id: &str, name: &str) -> ContentItem {
    ContentItem::new(SystemInfo {
        id: id.to_string(),
        name: name.to_string(),
        codename: format!("band_{id}"),
        content_type: "company_band".to_string(),
        language: "default".to_string(),
        last_modified: None,
    })
    .with_element("band_name", Field::Text(name.to_string()))
}

struct Harness {
    input: mpsc::Sender<ClientMessage>,
    views: mpsc::Receiver<ServerMessage>,
}

impl Harness {
    fn start(source: Arc<ScriptedSource>) -> Self {
        let (input, inbound) = mpsc::channel(16);
        let (outbound, views) = mpsc::channel(64);
        let session = LiveSession::new(source, CatalogKind::Artists.catalog(), false);
        tokio::spawn(session.drive(inbound, outbound));
        Self { input, views }
    }

    async fn send(&self, message: ClientMessage) {
        self.input.send(message).await.unwrap();
    }

    async fn query(&self, text: &str) {
        self.send(ClientMessage::Query {
            text: text.to_string(),
        })
        .await;
    }

    async fn next_view(&mut self) -> String {
        let message = timeout(Duration::from_secs(30), self.views.recv())
            .await
            .expect("view within timeout")
            .expect("session still running");
        match message {
            ServerMessage::View { html } => html,
        }
    }

    /// Skip views until one contains `needle`, returning every view seen.
    async fn views_until(&mut self, needle: &str) -> Vec<String> {
        let mut seen = Vec::new();
        loop {
            let view = self.next_view().await;
            let done = view.contains(needle);
            seen.push(view);
            if done {
                return seen;
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_starts_idle() {
    let mut harness = Harness::start(ScriptedSource::new(vec![]));
    let view = harness.next_view().await;
    assert!(view.contains("No results found."));
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_keystrokes_fetches_once() {
    let source = ScriptedSource::new(vec![]);
    let mut harness = Harness::start(source.clone());
    harness.next_view().await;

    for text in ["w", "wi", "win", "wind"] {
        harness.query(text).await;
        sleep(Duration::from_millis(50)).await;
    }

    let views = harness.views_until("Windy City").await;
    assert!(views[0].contains("Loading..."));
    let results = views.last().unwrap();
    assert!(results.contains("The Mighty Wind"));
    assert!(!results.contains("Brass Lungs"));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_superseded_response_is_never_shown() {
    // First search is slow, second is fast
    let source = ScriptedSource::new(vec![
        Some(Duration::from_secs(5)),
        Some(Duration::from_millis(10)),
    ]);
    let mut harness = Harness::start(source.clone());
    harness.next_view().await;

    harness.query("wind").await;
    sleep(Duration::from_millis(400)).await;
    harness.query("windy").await;

    let views = harness.views_until("Windy City").await;
    assert!(views.iter().all(|view| !view.contains("The Mighty Wind")));

    // Give the slow fetch ample time to have landed
    sleep(Duration::from_secs(10)).await;
    assert!(harness.views.try_recv().is_err());
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_shows_generic_error() {
    let mut harness = Harness::start(ScriptedSource::new(vec![None]));
    harness.next_view().await;

    harness.query("wind").await;
    let views = harness.views_until("An error occurred").await;
    let error = views.last().unwrap();
    assert!(error.contains("An error occurred while searching for artists."));
    assert!(!error.contains("Loading..."));
    assert!(!error.contains("Windy City"));
}

#[tokio::test(start_paused = true)]
async fn test_no_matches_message() {
    let mut harness = Harness::start(ScriptedSource::new(vec![]));
    harness.next_view().await;

    harness.query("zzz").await;
    let views = harness.views_until("No matching artists found.").await;
    assert!(!views.last().unwrap().contains("data-select"));
}

#[tokio::test(start_paused = true)]
async fn test_select_and_back_keep_results() {
    let source = ScriptedSource::new(vec![]);
    let mut harness = Harness::start(source.clone());
    harness.next_view().await;

    harness.query("wind").await;
    harness.views_until("Windy City").await;

    harness
        .send(ClientMessage::Select {
            id: "3".to_string(),
        })
        .await;
    let detail = harness.next_view().await;
    assert!(detail.contains("No bio available."));
    assert!(detail.contains("Windy City"));
    assert!(!detail.contains("The Mighty Wind"));

    harness.send(ClientMessage::Back).await;
    let list = harness.next_view().await;
    assert!(list.contains("The Mighty Wind"));
    assert!(list.contains("Windy City"));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_query_returns_to_idle() {
    let mut harness = Harness::start(ScriptedSource::new(vec![]));
    harness.next_view().await;

    harness.query("wind").await;
    harness.views_until("Windy City").await;

    harness.query("").await;
    let idle = harness.next_view().await;
    assert!(idle.contains("No results found."));
    assert!(!idle.contains("Windy City"));
}

#[tokio::test(start_paused = true)]
async fn test_session_ends_when_input_closes() {
    let (input, inbound) = mpsc::channel::<ClientMessage>(1);
    let (outbound, mut views) = mpsc::channel(8);
    let session = LiveSession::new(
        ScriptedSource::new(vec![]),
        CatalogKind::Venues.catalog(),
        false,
    );
    let task = tokio::spawn(session.drive(inbound, outbound));

    assert!(views.recv().await.is_some());
    drop(input);
    timeout(Duration::from_secs(1), task)
        .await
        .expect("session stops")
        .unwrap();
    assert!(views.recv().await.is_none());
}
