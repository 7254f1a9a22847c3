// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Content items as returned by the CMS delivery API.
//!
//! The delivery API describes every element as loosely typed JSON. The raw
//! wire types below are resolved exactly once, at the response boundary, into
//! [`ContentItem`]s whose elements carry a [`Field`] tagged union. Renderers
//! match on the tag and never re-inspect JSON shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Linked items are resolved at most this many levels deep, matching the
/// `depth` parameter sent to the delivery API.
pub const MAX_LINK_DEPTH: usize = 5;

/// Element type tag the delivery API uses for rich text.
const RICH_TEXT_TYPE: &str = "rich_text";

// ============================================================================
// Wire types
// ============================================================================

/// System block shared by every content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub codename: String,
    /// Content type codename, e.g. `venue`
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// A content item exactly as delivered, elements still untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub system: SystemInfo,
    #[serde(default)]
    pub elements: Map<String, Value>,
}

/// One element of a raw item.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub images: HashMap<String, RawImage>,
    #[serde(default)]
    pub links: HashMap<String, LinkTarget>,
    #[serde(default)]
    pub modular_content: Vec<String>,
}

/// Image referenced from a rich-text element.
#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Content item referenced by a hyperlink inside rich text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkTarget {
    pub codename: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub url_slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_page: String,
}

/// Response body of the item listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsEnvelope {
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub modular_content: HashMap<String, RawItem>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ItemsEnvelope {
    /// Resolve every listed item against this page's linked-item pool.
    pub fn into_items(self) -> Vec<ContentItem> {
        let pool = LinkedItemPool::new(&self.modular_content);
        self.items.iter().map(|raw| pool.resolve(raw)).collect()
    }
}

/// Response body of the single item endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEnvelope {
    pub item: RawItem,
    #[serde(default)]
    pub modular_content: HashMap<String, RawItem>,
}

impl ItemEnvelope {
    pub fn into_item(self) -> ContentItem {
        LinkedItemPool::new(&self.modular_content).resolve(&self.item)
    }
}

// ============================================================================
// Resolved model
// ============================================================================

/// A content item with typed fields, elements kept in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub system: SystemInfo,
    pub elements: Vec<Element>,
}

impl ContentItem {
    pub fn new(system: SystemInfo) -> Self {
        Self {
            system,
            elements: Vec::new(),
        }
    }

    /// Append an element, builder style.
    pub fn with_element(mut self, codename: &str, field: Field) -> Self {
        self.elements.push(Element {
            codename: codename.to_string(),
            name: String::new(),
            field,
        });
        self
    }

    pub fn element(&self, codename: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.codename == codename)
    }

    /// Value of a plain text element, if the element exists and is text.
    pub fn text(&self, codename: &str) -> Option<&str> {
        match self.element(codename).map(|e| &e.field) {
            Some(Field::Text(text)) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub codename: String,
    /// Display name configured in the CMS (may be empty)
    pub name: String,
    pub field: Field,
}

/// Field kinds, in the precedence order used by [`LinkedItemPool::classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    RichText(RichText),
    List(Vec<ListEntry>),
    Text(String),
    Image(Asset),
    Link(Hyperlink),
    Other(Value),
}

impl Field {
    /// Whether the field has nothing worth displaying.
    pub fn is_empty(&self) -> bool {
        match self {
            Field::RichText(rich) => rich.is_empty(),
            Field::List(entries) => entries.is_empty(),
            Field::Text(text) => text.trim().is_empty(),
            Field::Other(value) => value.is_null(),
            Field::Image(_) | Field::Link(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Image(Asset),
    Item(ContentItem),
    Label(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub url: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Asset {
    fn from_object(map: &Map<String, Value>, url: &str) -> Self {
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let dimension = |key: &str| {
            map.get(key)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
        };
        Self {
            url: url.to_string(),
            description: text("description"),
            name: text("name"),
            width: dimension("width"),
            height: dimension("height"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hyperlink {
    pub href: String,
    pub text: Option<String>,
}

/// Rich text value together with everything it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText {
    pub html: String,
    /// Asset id → image
    pub images: HashMap<String, Asset>,
    /// Item id → linked item
    pub links: HashMap<String, LinkTarget>,
    /// Codename → embedded component or linked item
    pub components: HashMap<String, ContentItem>,
}

impl RichText {
    /// The CMS stores an untouched rich text element as `<p><br></p>`.
    pub fn is_empty(&self) -> bool {
        if ["<object", "<figure", "<img"]
            .iter()
            .any(|tag| self.html.contains(tag))
        {
            return false;
        }
        let fragment = scraper::Html::parse_fragment(&self.html);
        let all_blank = fragment
            .root_element()
            .text()
            .all(|t| t.trim().is_empty());
        all_blank
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Linked items delivered alongside a response (`modular_content`), used to
/// resolve codename references into nested items.
pub struct LinkedItemPool<'a> {
    items: &'a HashMap<String, RawItem>,
}

impl<'a> LinkedItemPool<'a> {
    pub fn new(items: &'a HashMap<String, RawItem>) -> Self {
        Self { items }
    }

    pub fn resolve(&self, raw: &RawItem) -> ContentItem {
        self.resolve_at(raw, &mut Vec::new())
    }

    fn resolve_at(&self, raw: &RawItem, path: &mut Vec<String>) -> ContentItem {
        path.push(raw.system.codename.clone());
        let elements = raw
            .elements
            .iter()
            .map(|(codename, value)| self.element(codename, value, path))
            .collect();
        path.pop();

        ContentItem {
            system: raw.system.clone(),
            elements,
        }
    }

    fn element(&self, codename: &str, value: &Value, path: &mut Vec<String>) -> Element {
        match serde_json::from_value::<RawElement>(value.clone()) {
            Ok(raw) => Element {
                codename: codename.to_string(),
                name: raw.name.clone(),
                field: self.classify(&raw, path),
            },
            Err(e) => {
                tracing::debug!(element = codename, error = %e, "Unexpected element shape");
                Element {
                    codename: codename.to_string(),
                    name: String::new(),
                    field: Field::Other(value.clone()),
                }
            }
        }
    }

    /// Map an element to its field kind. Shapes can satisfy several rules, so
    /// the order of the checks is significant.
    fn classify(&self, raw: &RawElement, path: &mut Vec<String>) -> Field {
        if raw.element_type == RICH_TEXT_TYPE {
            return Field::RichText(self.rich_text(raw, path));
        }

        match &raw.value {
            Value::Array(entries) => Field::List(
                entries
                    .iter()
                    .map(|entry| self.list_entry(entry, path))
                    .collect(),
            ),
            Value::String(text) => Field::Text(text.clone()),
            Value::Object(map) => {
                if let Some(url) = map.get("url").and_then(Value::as_str) {
                    Field::Image(Asset::from_object(map, url))
                } else if let Some(href) = map.get("href").and_then(Value::as_str) {
                    Field::Link(Hyperlink {
                        href: href.to_string(),
                        text: map
                            .get("text")
                            .and_then(Value::as_str)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string),
                    })
                } else {
                    Field::Other(raw.value.clone())
                }
            }
            other => Field::Other(other.clone()),
        }
    }

    fn list_entry(&self, entry: &Value, path: &mut Vec<String>) -> ListEntry {
        match entry {
            Value::Object(map) => {
                if let Some(url) = map.get("url").and_then(Value::as_str) {
                    return ListEntry::Image(Asset::from_object(map, url));
                }
                let label = ["name", "title"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| entry.to_string());
                ListEntry::Label(label)
            }
            Value::String(codename) => match self.linked(codename, path) {
                Some(item) => ListEntry::Item(item),
                None => ListEntry::Label(codename.clone()),
            },
            other => ListEntry::Label(other.to_string()),
        }
    }

    fn rich_text(&self, raw: &RawElement, path: &mut Vec<String>) -> RichText {
        let html = match &raw.value {
            Value::String(html) => html.clone(),
            _ => String::new(),
        };

        let images = raw
            .images
            .iter()
            .map(|(id, image)| {
                (
                    id.clone(),
                    Asset {
                        url: image.url.clone(),
                        description: image.description.clone().filter(|d| !d.is_empty()),
                        name: None,
                        width: image.width,
                        height: image.height,
                    },
                )
            })
            .collect();

        let components = raw
            .modular_content
            .iter()
            .filter_map(|codename| {
                self.linked(codename, path)
                    .map(|item| (codename.clone(), item))
            })
            .collect();

        RichText {
            html,
            images,
            links: raw.links.clone(),
            components,
        }
    }

    /// Resolve a codename, refusing cycles and anything past the depth limit.
    /// `path` starts with the top-level item, so its length is the nesting
    /// level the codename would be resolved at.
    fn linked(&self, codename: &str, path: &mut Vec<String>) -> Option<ContentItem> {
        if path.len() > MAX_LINK_DEPTH || path.iter().any(|c| c == codename) {
            return None;
        }
        self.items
            .get(codename)
            .map(|raw| self.resolve_at(raw, path))
    }
}
