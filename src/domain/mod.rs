//! Storefront data model: cart lines, artworks, orders and the session.

pub mod artwork;
pub mod cart;
pub mod order;
pub mod session;
pub(crate) mod timestamp;

pub use artwork::*;
pub use cart::*;
pub use order::*;
pub use session::*;
