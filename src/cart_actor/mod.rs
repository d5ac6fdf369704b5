//! The cart actor: owner of [`CartState`](crate::domain::CartState) and
//! orchestrator of the remote cart calls.

mod error;
mod remote_queue;
mod service;

pub use error::*;
pub use service::*;
