use tokio::sync::oneshot;

use crate::cart_actor::{CartError, SyncOutcome};
use crate::domain::{ArtworkId, CartSnapshot, CartState, NewLineItem, Order};
use crate::remote::ApiError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests accepted by the cart actor. Local mutations answer with the
/// resulting cart so callers can render it without another round trip.
#[derive(Debug)]
pub enum CartRequest {
    Add {
        item: NewLineItem,
        respond_to: ServiceResponse<CartState, CartError>,
    },
    UpdateQuantity {
        artwork_id: ArtworkId,
        quantity: i64,
        respond_to: ServiceResponse<CartState, CartError>,
    },
    Remove {
        artwork_id: ArtworkId,
        respond_to: ServiceResponse<CartState, CartError>,
    },
    Clear {
        respond_to: ServiceResponse<CartState, CartError>,
    },
    Snapshot {
        respond_to: ServiceResponse<CartState, CartError>,
    },
    FetchCart {
        respond_to: ServiceResponse<SyncOutcome, CartError>,
    },
    SyncCart {
        respond_to: ServiceResponse<SyncOutcome, CartError>,
    },
    Checkout {
        respond_to: ServiceResponse<Order, CartError>,
    },
    OrderHistory {
        respond_to: ServiceResponse<Vec<Order>, CartError>,
    },
    Shutdown,
    #[cfg(test)]
    PendingRemoteCalls {
        respond_to: ServiceResponse<usize, CartError>,
    },
}

/// Result of a remote call, reported back to the cart actor by the task that
/// performed it. `ticket` identifies the call it answers.
#[derive(Debug)]
pub(crate) enum RemoteCompletion {
    Fetched {
        ticket: u64,
        result: Result<CartSnapshot, ApiError>,
    },
    Synced {
        ticket: u64,
        result: Result<(), ApiError>,
    },
    CheckedOut {
        ticket: u64,
        result: Result<Order, ApiError>,
    },
}

impl RemoteCompletion {
    pub(crate) fn ticket(&self) -> u64 {
        match self {
            RemoteCompletion::Fetched { ticket, .. }
            | RemoteCompletion::Synced { ticket, .. }
            | RemoteCompletion::CheckedOut { ticket, .. } => *ticket,
        }
    }
}
