// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Rendering of CMS rich text into display markup.
//!
//! The stored HTML is parsed and re-emitted element by element: known block
//! and mark elements pass through without attributes, content-item links are
//! pointed at the linked item's detail page, embedded components are rendered
//! as nested items, and anything unknown is unwrapped to its children.

use crate::models::catalog::CatalogKind;
use crate::models::content::{LinkTarget, RichText};
use crate::services::fields::FieldRenderer;
use crate::services::markup::{escape_attr, escape_text, sanitize_href, DROPPED_ELEMENTS};
use crate::services::styles;
use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: [&str; 19] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "table",
    "thead", "tbody", "tr", "td", "th", "figcaption",
];

const MARK_ELEMENTS: [&str; 6] = ["strong", "em", "u", "sub", "sup", "code"];

/// Render a rich text value. Embedded items are rendered through `fields`.
pub fn render(rich: &RichText, fields: &FieldRenderer) -> String {
    let fragment = Html::parse_fragment(&rich.html);
    let mut writer = RichTextWriter {
        rich,
        fields,
        out: String::with_capacity(rich.html.len()),
    };
    writer.children(fragment.root_element());
    writer.out
}

struct RichTextWriter<'a> {
    rich: &'a RichText,
    fields: &'a FieldRenderer,
    out: String,
}

impl RichTextWriter<'_> {
    fn children(&mut self, parent: ElementRef<'_>) {
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => self.out.push_str(&escape_text(text)),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.element(element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            _ if BLOCK_ELEMENTS.contains(&name) || MARK_ELEMENTS.contains(&name) => {
                self.wrap(name, element)
            }
            "b" => self.wrap("strong", element),
            "i" => self.wrap("em", element),
            "br" => self.out.push_str("<br>"),
            "a" => self.link(element),
            "object" => self.component(element),
            "figure" => self.figure(element),
            "img" => {
                let src = element.value().attr("src").unwrap_or_default();
                self.image(src, element.value().attr("alt"));
            }
            _ if DROPPED_ELEMENTS.contains(&name) => {}
            _ => self.children(element),
        }
    }

    fn wrap(&mut self, tag: &str, element: ElementRef<'_>) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
        self.children(element);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn link(&mut self, element: ElementRef<'_>) {
        let attrs = element.value();

        if let Some(item_id) = attrs.attr("data-item-id") {
            match self.rich.links.get(item_id).and_then(item_link_path) {
                Some(path) => {
                    self.out.push_str(&format!(
                        "<a href=\"{}\" class=\"{}\">",
                        escape_attr(&path),
                        styles::LINK
                    ));
                    self.children(element);
                    self.out.push_str("</a>");
                }
                // Linked item outside the searchable catalogs
                None => self.children(element),
            }
            return;
        }

        match attrs.attr("href").and_then(sanitize_href) {
            Some(href) => {
                let external = href.starts_with("http://") || href.starts_with("https://");
                self.out.push_str(&format!(
                    "<a href=\"{}\" class=\"{}\"{}>",
                    escape_attr(href),
                    styles::LINK,
                    if external {
                        " target=\"_blank\" rel=\"noopener noreferrer\""
                    } else {
                        ""
                    }
                ));
                self.children(element);
                self.out.push_str("</a>");
            }
            None => self.children(element),
        }
    }

    /// `<object type="application/kenticocloud" data-codename="...">`
    fn component(&mut self, element: ElementRef<'_>) {
        let Some(codename) = element.value().attr("data-codename") else {
            return;
        };
        match self.rich.components.get(codename) {
            Some(item) => {
                self.out.push_str("<div class=\"rich-text-component\">");
                self.out.push_str(&self.fields.render_linked_item(item));
                self.out.push_str("</div>");
            }
            None => {
                tracing::debug!(codename, "Embedded item missing from response");
                self.out.push_str(&format!(
                    "<p class=\"{}\">Embedded content '{}' is unavailable.</p>",
                    styles::ERROR_TEXT,
                    escape_text(codename)
                ));
            }
        }
    }

    fn figure(&mut self, element: ElementRef<'_>) {
        let attrs = element.value();
        let asset = attrs
            .attr("data-image-id")
            .or_else(|| attrs.attr("data-asset-id"))
            .and_then(|id| self.rich.images.get(id));

        self.out.push_str("<figure>");
        match asset {
            Some(asset) => {
                let (url, description) = (asset.url.clone(), asset.description.clone());
                self.image(&url, description.as_deref());
            }
            None => {
                let img = element
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|e| e.value().name() == "img");
                if let Some(img) = img {
                    let src = img.value().attr("src").unwrap_or_default();
                    self.image(src, img.value().attr("alt"));
                }
            }
        }
        for caption in element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "figcaption")
        {
            self.wrap("figcaption", caption);
        }
        self.out.push_str("</figure>");
    }

    fn image(&mut self, src: &str, alt: Option<&str>) {
        let Some(src) = sanitize_href(src) else {
            return;
        };
        self.out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" class=\"{}\">",
            escape_attr(src),
            escape_attr(alt.unwrap_or_default()),
            styles::IMAGE
        ));
    }
}

/// Detail page of a linked item, when it belongs to a searchable catalog.
fn item_link_path(target: &LinkTarget) -> Option<String> {
    CatalogKind::for_content_type(&target.content_type)
        .map(|kind| kind.catalog().item_path(&target.codename))
}
