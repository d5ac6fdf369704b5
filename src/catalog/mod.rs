//! Derived catalog view: search, price filtering and ordering over the
//! artworks returned by `GET /artworks`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Artwork;

/// Default upper bound of the browse price slider.
pub const DEFAULT_MAX_PRICE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "priceAsc" | "price-asc" => Ok(SortKey::PriceAsc),
            "priceDesc" | "price-desc" => Ok(SortKey::PriceDesc),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "priceAsc",
            SortKey::PriceDesc => "priceDesc",
        })
    }
}

/// Filter parameters controlled by the browse page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub search: String,
    pub sort: SortKey,
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::Newest,
            min_price: 0.0,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl CatalogQuery {
    fn matches(&self, needle: &str, artwork: &Artwork) -> bool {
        let text_match = needle.is_empty()
            || [
                Some(artwork.title.as_str()),
                artwork.description.as_deref(),
                artwork.artist_name.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle));
        text_match && artwork.price >= self.min_price && artwork.price <= self.max_price
    }
}

/// Returns the artworks matching `query`, ordered by its sort key.
///
/// Matching is a case-insensitive substring test on title, description or
/// artist name, combined with an inclusive price range. The sort is stable,
/// so ties keep their input order. Artworks without a creation time sort
/// after dated ones under [`SortKey::Newest`].
pub fn catalog_view(artworks: &[Artwork], query: &CatalogQuery) -> Vec<Artwork> {
    let needle = query.search.to_lowercase();
    let mut view: Vec<Artwork> = artworks
        .iter()
        .filter(|artwork| query.matches(&needle, artwork))
        .cloned()
        .collect();

    view.sort_by(|a, b| compare(query.sort, a, b));
    view
}

fn compare(sort: SortKey, a: &Artwork, b: &Artwork) -> Ordering {
    match sort {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::PriceAsc => a.price.total_cmp(&b.price),
        SortKey::PriceDesc => b.price.total_cmp(&a.price),
    }
}
