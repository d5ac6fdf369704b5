use thiserror::Error;

use crate::remote::ApiError;

/// Errors surfaced by cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Cart synchronization and checkout require a customer session")]
    NotPermitted,
    #[error("A checkout is already in progress")]
    CheckoutInProgress,
    #[error("Cart could not be synchronized before checkout")]
    NotSynced,
    #[error("Session is no longer authorized: {0}")]
    Unauthorized(String),
    #[error("Remote cart service unavailable: {0}")]
    Transport(String),
    #[error("Remote cart service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response from remote cart service: {0}")]
    InvalidResponse(String),
    #[error("Cart was reset before the request completed")]
    Cancelled,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<ApiError> for CartError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Transport(msg) => CartError::Transport(msg),
            ApiError::Unauthorized(msg) => CartError::Unauthorized(msg),
            ApiError::Rejected { status, message } => CartError::Rejected { status, message },
            ApiError::Decode(msg) => CartError::InvalidResponse(msg),
        }
    }
}

/// What became of a `fetch_cart` or `sync_cart` call.
///
/// Remote failures are reported here instead of as an `Err`: they are already
/// recorded in the cart's sync status and must not interrupt shopping.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Fetch replaced the cart, or sync was accepted by the server.
    Applied,
    /// Sync was not sent because the cart is empty.
    Skipped,
    /// Fetch response arrived after a local mutation and was discarded.
    Stale,
    /// A newer call of the same kind was issued; this result was ignored.
    Superseded,
    /// The session ended before the call completed.
    Cancelled,
    Failed(CartError),
}
