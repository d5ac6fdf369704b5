use serde::{Deserialize, Serialize};

use super::Artwork;

/// Identifier of an artwork, unique per cart line.
pub type ArtworkId = u64;

/// One artwork entry in the cart.
///
/// Display metadata is a snapshot taken when the artwork was first added and
/// is never refreshed afterwards. On the wire the unit price travels as `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub artwork_id: ArtworkId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(rename = "price")]
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Payload for adding an artwork to the cart. Quantity is decided by the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub artwork_id: ArtworkId,
    pub title: String,
    pub image_url: Option<String>,
    pub artist_name: Option<String>,
    pub unit_price: f64,
}

impl NewLineItem {
    pub fn new(artwork_id: ArtworkId, title: impl Into<String>, unit_price: f64) -> Self {
        Self {
            artwork_id,
            title: title.into(),
            image_url: None,
            artist_name: None,
            unit_price,
        }
    }
}

impl From<NewLineItem> for CartLineItem {
    fn from(item: NewLineItem) -> Self {
        Self {
            artwork_id: item.artwork_id,
            title: item.title,
            image_url: item.image_url,
            artist_name: item.artist_name,
            unit_price: item.unit_price,
            quantity: 1,
        }
    }
}

impl From<&Artwork> for NewLineItem {
    fn from(artwork: &Artwork) -> Self {
        Self {
            artwork_id: artwork.artwork_id,
            title: artwork.title.clone(),
            image_url: artwork.image_url.clone(),
            artist_name: artwork.artist_name.clone(),
            unit_price: artwork.price,
        }
    }
}

/// Authoritative cart contents as reported by `GET /cart`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub total: f64,
}

/// Progress of the background reconciliation with the remote cart.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error { message: String },
}

impl SyncStatus {
    pub fn last_error(&self) -> Option<&str> {
        match self {
            SyncStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Checkout progress, tracked apart from [`SyncStatus`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CheckoutStatus {
    #[default]
    Idle,
    Pending,
    Failed { message: String },
}

/// The cart as seen by the presentation layer.
///
/// `items` and `total` are only changed through
/// [`transition`](crate::cart_machine::transition), which keeps `total` equal
/// to the sum of the line subtotals after every local mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    pub(crate) items: Vec<CartLineItem>,
    pub(crate) total: f64,
    pub sync_status: SyncStatus,
    pub checkout_status: CheckoutStatus,
}

impl CartState {
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, artwork_id: ArtworkId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.artwork_id == artwork_id)
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub(crate) fn recompute_total(&mut self) {
        self.total = self.items.iter().fold(0.0, |sum, line| sum + line.subtotal());
    }
}
