//! Client handles for talking to actors.

#[macro_use]
mod macros;
mod cart_client;

pub use cart_client::*;
