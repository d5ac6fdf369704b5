//! # Storefront cart
//!
//! Client-side cart for an art marketplace storefront: a local cart that stays
//! usable offline, kept in step with the server-side cart of a logged-in
//! customer, plus the filtered catalog view the browse page renders.
//!
//! ## Ingredients
//!
//! - **Foundation**
//!     - **Domain types** - Cart lines, artworks, orders and sessions → [`domain`]
//!     - **Pure transitions** - Every change to the cart lines, with no I/O → [`cart_machine::transition`]
//!     - **Catalog view** - Search, price range and sort over the artwork list → [`catalog::catalog_view`]
//! - **Actors**
//!     - **Cart service** - Owns the cart, serializes remote calls, discards stale responses → [`cart_actor::CartService`]
//!     - **Cart client** - Macro-generated methods over the service's channel → [`clients::CartClient`]
//!     - **Auto sync** - Fetches on login and pushes on every change → [`auto_sync::run`]
//! - **Edges**
//!     - **Remote API** - The REST endpoints behind a trait, `reqwest` in production → [`remote::StorefrontApi`]
//!     - **Session** - Login state shared through a `watch` channel and persisted to disk → [`session::SessionHandle`]
//! - **System Concerns**
//!     - **System coordinator** - Startup, login, browse and shutdown → [`app_system::StorefrontSystem`]
//!     - **Configuration** - Environment and `.env` settings → [`app_system::StorefrontConfig`]
//!     - **Tracing setup** → [`app_system::setup_tracing`]
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let config = StorefrontConfig::from_env()?;
//! let system = StorefrontSystem::from_config(&config)?;
//!
//! system.login("cy@example.com", "secret", Role::Customer).await?;
//! let artworks = system.browse(&CatalogQuery::default()).await?;
//! system.cart_client.add(NewLineItem::from(&artworks[0])).await?;
//! let order = system.cart_client.checkout().await?;
//!
//! system.shutdown().await?;
//! ```

pub mod app_system;
pub mod auto_sync;
pub mod cart_actor;
pub mod cart_machine;
pub mod catalog;
pub mod clients;
pub mod domain;
pub mod messages;
pub mod remote;
pub mod session;

#[cfg(test)]
mod mock_framework;
