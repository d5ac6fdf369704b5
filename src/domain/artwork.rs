use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, ArtworkId};

/// An artwork record from `GET /artworks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub artwork_id: ArtworkId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Artwork {
    pub fn new(artwork_id: ArtworkId, title: impl Into<String>, price: f64) -> Self {
        Self {
            artwork_id,
            title: title.into(),
            description: None,
            price,
            image_url: None,
            artist_name: None,
            created_at: None,
        }
    }
}
