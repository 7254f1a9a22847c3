// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Rendering of content item fields into HTML fragments.

use crate::models::catalog::Catalog;
use crate::models::content::{Asset, ContentItem, Element, Field, Hyperlink, ListEntry};
use crate::services::markup::{
    escape_attr, escape_text, humanize_key, sanitize_href, LinkClassInjector, MarkupPostProcessor,
};
use crate::services::{rich_text, styles};
use std::collections::HashMap;
use std::sync::Arc;

/// Renders fields by kind. Text fields with a registered post-processor are
/// emitted as processed markup instead of escaped text.
#[derive(Clone, Default)]
pub struct FieldRenderer {
    post_processors: HashMap<String, Arc<dyn MarkupPostProcessor>>,
}

impl FieldRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with the catalog's social-links field styled.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        match catalog.social_field {
            Some(field) => {
                Self::new().with_post_processor(field, LinkClassInjector::new(styles::SOCIAL_LINK))
            }
            None => Self::new(),
        }
    }

    pub fn with_post_processor(
        mut self,
        field: &str,
        processor: impl MarkupPostProcessor + 'static,
    ) -> Self {
        self.post_processors
            .insert(field.to_string(), Arc::new(processor));
        self
    }

    pub fn render_field(&self, element: &Element) -> String {
        let key = element.codename.as_str();
        match &element.field {
            Field::RichText(rich) => {
                if rich.is_empty() {
                    return String::new();
                }
                format!(
                    "<div class=\"{}\">{}</div>",
                    styles::RICH_TEXT,
                    rich_text::render(rich, self)
                )
            }
            Field::List(entries) => self.render_list(key, entries),
            Field::Text(text) => match self.post_processors.get(key) {
                Some(processor) => format!("<div>{}</div>", processor.process(text)),
                None => escape_text(text),
            },
            Field::Image(asset) => {
                let alt = asset
                    .description
                    .clone()
                    .unwrap_or_else(|| humanize_key(key));
                render_image(asset, &alt)
            }
            Field::Link(link) => render_link(link),
            Field::Other(value) => escape_text(&value.to_string()),
        }
    }

    fn render_list(&self, key: &str, entries: &[ListEntry]) -> String {
        let last = entries.len().saturating_sub(1);
        let mut out = String::new();
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                ListEntry::Image(asset) => {
                    let alt = asset
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Image for {key}"));
                    out.push_str(&render_image(asset, &alt));
                }
                ListEntry::Item(item) => out.push_str(&self.render_linked_item(item)),
                ListEntry::Label(label) => {
                    out.push_str("<span>");
                    out.push_str(&escape_text(label));
                    if index < last {
                        out.push_str(", ");
                    }
                    out.push_str("</span>");
                }
            }
        }
        out
    }

    /// Every element of an item as a labelled list, skipping `exclude`.
    pub fn render_fields(&self, item: &ContentItem, exclude: &[&str]) -> String {
        let mut out = String::from("<ul class=\"space-y-2\">");
        for element in item
            .elements
            .iter()
            .filter(|e| !exclude.contains(&e.codename.as_str()))
        {
            out.push_str(&format!(
                "<li><strong class=\"{}\">{}:</strong> {}</li>",
                styles::LIST_ITEM,
                escape_text(&humanize_key(&element.codename)),
                self.render_field(element)
            ));
        }
        out.push_str("</ul>");
        out
    }

    /// A linked item nested inside another item's field.
    pub fn render_linked_item(&self, item: &ContentItem) -> String {
        format!(
            "<div class=\"{}\"><h3 class=\"font-semibold\">{}</h3>{}</div>",
            styles::NESTED_CARD,
            escape_text(&item.system.name),
            self.render_fields(item, &[])
        )
    }
}

fn render_image(asset: &Asset, alt: &str) -> String {
    match sanitize_href(&asset.url) {
        Some(src) => format!(
            "<img src=\"{}\" alt=\"{}\" class=\"{}\">",
            escape_attr(src),
            escape_attr(alt),
            styles::IMAGE
        ),
        None => escape_text(alt),
    }
}

fn render_link(link: &Hyperlink) -> String {
    let text = link.text.as_deref().unwrap_or(&link.href);
    match sanitize_href(&link.href) {
        Some(href) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"{}\">{}</a>",
            escape_attr(href),
            styles::LINK,
            escape_text(text)
        ),
        None => escape_text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogKind;
    use crate::models::content::{ItemsEnvelope, RichText, SystemInfo};
    use serde_json::json;

    fn element(codename: &str, field: Field) -> Element {
        Element {
            codename: codename.to_string(),
            name: String::new(),
            field,
        }
    }

    fn asset(url: &str, description: Option<&str>) -> Asset {
        Asset {
            url: url.to_string(),
            description: description.map(str::to_string),
            name: None,
            width: None,
            height: None,
        }
    }

    #[test]
    fn test_rich_text_path_wins_over_link_shape() {
        // Tagged rich text whose value looks like a link
        let items: Vec<ContentItem> = serde_json::from_value::<ItemsEnvelope>(json!({
            "items": [{
                "system": { "id": "1", "name": "Wind", "codename": "wind", "type": "company_band" },
                "elements": {
                    "band_bio": {
                        "type": "rich_text",
                        "value": { "href": "https://wind.example", "text": "site" }
                    }
                }
            }]
        }))
        .unwrap()
        .into_items();

        let html = FieldRenderer::new().render_field(&items[0].elements[0]);
        assert!(!html.contains("<a"));
        assert!(!html.contains("wind.example"));
    }

    #[test]
    fn test_rich_text_wrapped() {
        let html = FieldRenderer::new().render_field(&element(
            "band_bio",
            Field::RichText(RichText {
                html: "<p>Formed in 1999.</p>".to_string(),
                ..Default::default()
            }),
        ));
        assert_eq!(
            html,
            format!("<div class=\"{}\"><p>Formed in 1999.</p></div>", styles::RICH_TEXT)
        );
    }

    #[test]
    fn test_list_images_and_labels() {
        let html = FieldRenderer::new().render_field(&element(
            "genres",
            Field::List(vec![
                ListEntry::Image(asset("https://cdn.example/a.jpg", None)),
                ListEntry::Label("Rock".to_string()),
                ListEntry::Label("Folk".to_string()),
            ]),
        ));
        assert!(html.contains("alt=\"Image for genres\""));
        assert!(html.ends_with("<span>Rock, </span><span>Folk</span>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = FieldRenderer::new()
            .render_field(&element("band_name", Field::Text("Salt & <Pepper>".to_string())));
        assert_eq!(html, "Salt &amp; &lt;Pepper&gt;");
    }

    #[test]
    fn test_social_field_links_are_styled() {
        let renderer = FieldRenderer::for_catalog(CatalogKind::Artists.catalog());
        let html = renderer.render_field(&element(
            "social_media",
            Field::Text("<a href=\"https://instagram.com/wind\">Instagram</a>".to_string()),
        ));
        assert!(html.starts_with("<div><a "));
        assert!(html.contains(&format!("class=\"{}\"", styles::SOCIAL_LINK)));

        // Same markup in another field stays text
        let html = renderer.render_field(&element(
            "notes",
            Field::Text("<a href=\"https://instagram.com/wind\">Instagram</a>".to_string()),
        ));
        assert!(html.starts_with("&lt;a"));
    }

    #[test]
    fn test_single_image_alt_falls_back_to_key() {
        let html = FieldRenderer::new().render_field(&element(
            "hero_image",
            Field::Image(asset("https://cdn.example/h.jpg", None)),
        ));
        assert!(html.contains("alt=\"hero image\""));
    }

    #[test]
    fn test_link_uses_text_or_href() {
        let renderer = FieldRenderer::new();
        let with_text = renderer.render_field(&element(
            "website",
            Field::Link(Hyperlink {
                href: "https://wind.example".to_string(),
                text: Some("Official site".to_string()),
            }),
        ));
        assert!(with_text.contains(">Official site</a>"));
        assert!(with_text.contains("rel=\"noopener noreferrer\""));

        let bare = renderer.render_field(&element(
            "website",
            Field::Link(Hyperlink {
                href: "https://wind.example".to_string(),
                text: None,
            }),
        ));
        assert!(bare.contains(">https://wind.example</a>"));
    }

    #[test]
    fn test_other_values_render_as_json() {
        let renderer = FieldRenderer::new();
        assert_eq!(renderer.render_field(&element("rating", Field::Other(json!(4)))), "4");
        assert_eq!(
            renderer.render_field(&element("meta", Field::Other(json!({"a": "<b>"})))),
            "{\"a\":\"&lt;b&gt;\"}"
        );
    }

    #[test]
    fn test_linked_items_render_recursively() {
        let member = ContentItem::new(SystemInfo {
            id: "p1".to_string(),
            name: "Jay".to_string(),
            codename: "jay".to_string(),
            content_type: "person".to_string(),
            language: "default".to_string(),
            last_modified: None,
        })
        .with_element("instrument", Field::Text("Drums".to_string()));

        let html = FieldRenderer::new()
            .render_field(&element("members", Field::List(vec![ListEntry::Item(member)])));
        assert!(html.contains(">Jay</h3>"));
        assert!(html.contains("instrument:</strong> Drums"));
    }
}
