//! The storefront REST API as seen by the client.
//!
//! [`StorefrontApi`] is the seam between the cart actor and the network. The
//! production implementation is [`HttpStorefrontApi`]; tests drive a
//! channel-backed mock instead.

mod dtos;
mod error;
mod http;

pub use dtos::*;
pub use error::*;
pub use http::*;

use std::future::Future;

use crate::domain::{Artwork, CartLineItem, CartSnapshot, Order};

/// Remote endpoints used by the storefront client. Every authenticated call
/// takes the bearer token explicitly.
pub trait StorefrontApi: Send + Sync + 'static {
    /// `GET /cart`
    fn get_cart(&self, token: &str) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send;

    /// `POST /cart/sync`; the response body is not interpreted.
    fn sync_cart(
        &self,
        token: &str,
        items: &[CartLineItem],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /cart/checkout`
    fn checkout(&self, token: &str) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// `GET /orders`
    fn list_orders(&self, token: &str) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    /// `GET /artworks`
    fn list_artworks(&self) -> impl Future<Output = Result<Vec<Artwork>, ApiError>> + Send;

    /// `POST /auth/login`
    fn login(
        &self,
        request: LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;
}
