// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HTML escaping and post-processing of CMS-provided markup.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never carried over from CMS markup.
pub const DROPPED_ELEMENTS: [&str; 4] = ["script", "style", "iframe", "noscript"];

/// Elements kept in post-processed text-field markup. Others are unwrapped.
const ALLOWED_ELEMENTS: [&str; 9] = ["a", "p", "span", "br", "strong", "em", "ul", "li", "img"];

/// Attributes kept on allowed elements.
const ALLOWED_ATTRIBUTES: [&str; 7] = ["href", "src", "alt", "title", "class", "target", "rel"];

const VOID_ELEMENTS: [&str; 2] = ["br", "img"];

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `band_name` → `band name`
pub fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
}

/// Accept http(s), mailto, tel and relative links; reject script URLs.
pub fn sanitize_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match url::Url::parse(href) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto" | "tel").then_some(href),
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(href),
        Err(_) => None,
    }
}

/// Post-processing applied to raw markup stored in a text field.
pub trait MarkupPostProcessor: Send + Sync {
    fn process(&self, markup: &str) -> String;
}

/// Adds styling classes to every hyperlink in a markup fragment.
///
/// The fragment is re-serialised from the parsed tree through an allow-list
/// of elements and attributes. Anything else is unwrapped to its text, and
/// script URLs do not survive.
pub struct LinkClassInjector {
    classes: Vec<String>,
}

impl LinkClassInjector {
    pub fn new(classes: &str) -> Self {
        Self {
            classes: classes.split_whitespace().map(str::to_string).collect(),
        }
    }

    fn write_children(&self, parent: ElementRef<'_>, out: &mut String) {
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.write_element(element, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn write_element(&self, element: ElementRef<'_>, out: &mut String) {
        let name = element.value().name();
        if DROPPED_ELEMENTS.contains(&name) {
            return;
        }
        if !ALLOWED_ELEMENTS.contains(&name) {
            self.write_children(element, out);
            return;
        }

        out.push('<');
        out.push_str(name);

        let mut has_class = false;
        for (attr, value) in element.value().attrs() {
            if !ALLOWED_ATTRIBUTES.contains(&attr) {
                continue;
            }
            if matches!(attr, "href" | "src") && sanitize_href(value).is_none() {
                continue;
            }
            let value = if name == "a" && attr == "class" {
                has_class = true;
                self.merge_classes(value)
            } else {
                value.to_string()
            };
            push_attr(out, attr, &value);
        }
        if name == "a" && !has_class {
            push_attr(out, "class", &self.classes.join(" "));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.write_children(element, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn merge_classes(&self, existing: &str) -> String {
        let mut classes: Vec<&str> = existing.split_whitespace().collect();
        for class in &self.classes {
            if !classes.contains(&class.as_str()) {
                classes.push(class);
            }
        }
        classes.join(" ")
    }
}

impl MarkupPostProcessor for LinkClassInjector {
    fn process(&self, markup: &str) -> String {
        let fragment = Html::parse_fragment(markup);
        let mut out = String::with_capacity(markup.len() + 64);
        self.write_children(fragment.root_element(), &mut out);
        out
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}
