// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::ItemsQuery;
use std::str::FromStr;

/// Searchable catalogs exposed by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Artists,
    Venues,
}

/// Everything that differs between the artist and venue search pages.
#[derive(Debug)]
pub struct Catalog {
    pub kind: CatalogKind,
    /// Page heading
    pub title: &'static str,
    /// Plural noun used in user-facing messages
    pub noun: &'static str,
    pub input_placeholder: &'static str,
    /// Content type codename in the CMS
    pub content_type: &'static str,
    /// Element searched by the name filter
    pub name_field: &'static str,
    /// Element holding the URL slug
    pub slug_field: &'static str,
    /// Element shown first on the detail view
    pub summary_field: &'static str,
    pub summary_placeholder: &'static str,
    /// Text element holding raw social-media link markup
    pub social_field: Option<&'static str>,
}

static ARTISTS: Catalog = Catalog {
    kind: CatalogKind::Artists,
    title: "Artist Search",
    noun: "artists",
    input_placeholder: "Enter artist name",
    content_type: "company_band",
    name_field: "band_name",
    slug_field: "slug",
    summary_field: "band_bio",
    summary_placeholder: "No bio available.",
    social_field: Some("social_media"),
};

static VENUES: Catalog = Catalog {
    kind: CatalogKind::Venues,
    title: "Venue Search",
    noun: "venues",
    input_placeholder: "Enter venue name",
    content_type: "venue",
    name_field: "venue_name",
    slug_field: "venue_slug",
    summary_field: "description",
    summary_placeholder: "No description available.",
    social_field: None,
};

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Artists, CatalogKind::Venues];

    /// Path segment used in routes
    pub fn slug(&self) -> &'static str {
        match self {
            CatalogKind::Artists => "artists",
            CatalogKind::Venues => "venues",
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        match self {
            CatalogKind::Artists => &ARTISTS,
            CatalogKind::Venues => &VENUES,
        }
    }

    /// Catalog whose items have the given content type, if any.
    pub fn for_content_type(content_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.catalog().content_type == content_type)
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artists" => Ok(CatalogKind::Artists),
            "venues" => Ok(CatalogKind::Venues),
            _ => Err(format!("Unknown catalog '{s}'")),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl Catalog {
    /// Listing query for every item of this catalog.
    pub fn items_query(&self) -> ItemsQuery {
        ItemsQuery::of_type(self.content_type)
    }

    /// Lookup of a single item by its URL slug.
    pub fn slug_query(&self, slug: &str) -> ItemsQuery {
        self.items_query()
            .with_equals(&format!("elements.{}", self.slug_field), slug)
    }

    pub fn no_match_message(&self) -> String {
        format!("No matching {} found.", self.noun)
    }

    pub fn error_message(&self) -> String {
        format!("An error occurred while searching for {}.", self.noun)
    }

    /// Path of the search page
    pub fn search_path(&self) -> String {
        format!("/search/{}", self.kind.slug())
    }

    /// Path of an item's detail page
    pub fn item_path(&self, codename: &str) -> String {
        format!("/search/{}/items/{}", self.kind.slug(), codename)
    }
}
