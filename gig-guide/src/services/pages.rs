// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HTML pages and the live view fragment.

use crate::models::catalog::{Catalog, CatalogKind};
use crate::models::content::ContentItem;
use crate::services::fields::FieldRenderer;
use crate::services::markup::{escape_attr, escape_text};
use crate::services::search::{SearchPage, SearchStatus};
use crate::services::styles;

/// Browser side of the live search socket: forwards keystrokes and clicks,
/// swaps in the view fragments pushed by the server.
const LIVE_SEARCH_SCRIPT: &str = r#"
(() => {
  const root = document.getElementById('live-search');
  const input = root.querySelector('input[name="q"]');
  const view = document.getElementById('view');
  const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
  const socket = new WebSocket(`${scheme}://${location.host}${root.dataset.live}`);
  const send = (message) => {
    if (socket.readyState === WebSocket.OPEN) socket.send(JSON.stringify(message));
  };
  socket.addEventListener('open', () => send({ type: 'query', text: input.value }));
  socket.addEventListener('message', (event) => {
    const message = JSON.parse(event.data);
    if (message.type === 'view') view.innerHTML = message.html;
  });
  input.addEventListener('input', () => send({ type: 'query', text: input.value }));
  root.querySelector('form').addEventListener('submit', (event) => event.preventDefault());
  view.addEventListener('click', (event) => {
    const select = event.target.closest('[data-select]');
    if (select) {
      send({ type: 'select', id: select.dataset.select });
    } else if (event.target.closest('[data-back]')) {
      send({ type: 'back' });
    }
  });
})();
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title></head><body><main class=\"{}\">{}</main></body></html>",
        escape_text(title),
        styles::CONTAINER,
        body
    )
}

pub fn render_index() -> String {
    let links: String = CatalogKind::ALL
        .iter()
        .map(|kind| {
            let catalog = kind.catalog();
            format!(
                "<li><a href=\"{}\" class=\"{}\">{}</a></li>",
                catalog.search_path(),
                styles::LINK,
                catalog.title
            )
        })
        .collect();
    layout(
        "Gig Guide",
        &format!(
            "<h1 class=\"{}\">Gig Guide</h1><ul class=\"space-y-2\">{}</ul>",
            styles::HEADING,
            links
        ),
    )
}

/// Search page shell. `view` is the initial content of the view area.
pub fn render_search_page(catalog: &Catalog, query: &str, preview: bool, view: &str) -> String {
    let live_path = format!(
        "{}/live{}",
        catalog.search_path(),
        if preview { "?preview=true" } else { "" }
    );
    let preview_field = if preview {
        "<input type=\"hidden\" name=\"preview\" value=\"true\">"
    } else {
        ""
    };

    let body = format!(
        "<h1 class=\"{heading}\">{title}</h1>\
         <div id=\"live-search\" data-live=\"{live}\">\
         <form method=\"get\" action=\"{action}\" class=\"mb-4\">\
         <input type=\"text\" name=\"q\" value=\"{query}\" placeholder=\"{placeholder}\" \
         autocomplete=\"off\" class=\"{input}\">{preview_field}</form></div>\
         <div id=\"view\">{view}</div><script>{script}</script>",
        heading = styles::HEADING,
        title = escape_text(catalog.title),
        live = escape_attr(&live_path),
        action = catalog.search_path(),
        query = escape_attr(query),
        placeholder = escape_attr(catalog.input_placeholder),
        input = styles::INPUT,
        preview_field = preview_field,
        view = view,
        script = LIVE_SEARCH_SCRIPT,
    );
    layout(catalog.title, &body)
}

/// Content of the view area for the current state of a search page.
pub fn render_view(page: &SearchPage, fields: &FieldRenderer) -> String {
    if let Some(item) = page.selected_item() {
        return render_detail(page.catalog(), item, fields, BackControl::Button);
    }

    let catalog = page.catalog();
    match page.status() {
        SearchStatus::Idle => status_line(styles::NO_RESULTS_TEXT, "No results found."),
        SearchStatus::Loading => status_line(styles::LOADING_TEXT, "Loading..."),
        SearchStatus::NoMatches | SearchStatus::Failed => status_line(
            styles::ERROR_TEXT,
            &page.message().unwrap_or_default(),
        ),
        SearchStatus::Results(items) => {
            let cards: String = items
                .iter()
                .map(|item| render_card(catalog, item, fields))
                .collect();
            format!("<div class=\"{}\">{}</div>", styles::GRID, cards)
        }
    }
}

fn status_line(class: &str, text: &str) -> String {
    format!("<p class=\"{}\">{}</p>", class, escape_text(text))
}

fn item_name<'a>(catalog: &Catalog, item: &'a ContentItem) -> &'a str {
    item.text(catalog.name_field)
        .filter(|name| !name.is_empty())
        .unwrap_or(item.system.name.as_str())
}

fn render_card(catalog: &Catalog, item: &ContentItem, fields: &FieldRenderer) -> String {
    format!(
        "<div class=\"{card}\"><h2 class=\"{heading}\">{name}</h2>{fields}\
         <button type=\"button\" data-select=\"{id}\" class=\"{button}\">View details</button> \
         <a href=\"{permalink}\" class=\"{link}\">Permalink</a></div>",
        card = styles::CARD,
        heading = styles::CARD_HEADING,
        name = escape_text(item_name(catalog, item)),
        fields = fields.render_fields(item, &[]),
        id = escape_attr(&item.system.id),
        button = styles::BUTTON,
        permalink = escape_attr(&catalog.item_path(&item.system.codename)),
        link = styles::LINK,
    )
}

/// How the detail view returns to the result list
enum BackControl {
    /// Live view: the session keeps the results, no navigation
    Button,
    /// Standalone page: navigate to the search page
    Link(String),
}

impl BackControl {
    fn render(&self) -> String {
        match self {
            BackControl::Button => format!(
                "<button type=\"button\" data-back class=\"{}\">&larr; Back to results</button>",
                styles::BUTTON
            ),
            BackControl::Link(href) => format!(
                "<a href=\"{}\" class=\"{}\">&larr; Back to results</a>",
                escape_attr(href),
                styles::LINK
            ),
        }
    }
}

fn render_detail(
    catalog: &Catalog,
    item: &ContentItem,
    fields: &FieldRenderer,
    back: BackControl,
) -> String {
    let summary = match item.element(catalog.summary_field) {
        Some(element) if !element.field.is_empty() => fields.render_field(element),
        _ => format!(
            "<p class=\"{}\">{}</p>",
            styles::NO_RESULTS_TEXT,
            escape_text(catalog.summary_placeholder)
        ),
    };

    format!(
        "<article class=\"{card}\">{back}<h2 class=\"{heading}\">{name}</h2>\
         <section>{summary}</section>{rest}</article>",
        card = styles::CARD,
        back = back.render(),
        heading = styles::CARD_HEADING,
        name = escape_text(item_name(catalog, item)),
        summary = summary,
        rest = fields.render_fields(item, &[catalog.summary_field, catalog.name_field]),
    )
}

/// Standalone detail page reached by permalink.
pub fn render_detail_page(catalog: &Catalog, item: &ContentItem, fields: &FieldRenderer) -> String {
    let body = render_detail(
        catalog,
        item,
        fields,
        BackControl::Link(catalog.search_path()),
    );
    layout(item_name(catalog, item), &body)
}

/// Page shown when a detail page cannot be produced.
pub fn render_message_page(catalog: &Catalog, message: &str) -> String {
    let body = format!(
        "<h1 class=\"{}\">{}</h1>{}<a href=\"{}\" class=\"{}\">&larr; Back to search</a>",
        styles::HEADING,
        escape_text(catalog.title),
        status_line(styles::ERROR_TEXT, message),
        catalog.search_path(),
        styles::LINK
    );
    layout(catalog.title, &body)
}
