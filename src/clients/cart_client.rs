use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use crate::cart_actor::{CartError, SyncOutcome};
use crate::domain::{ArtworkId, CartState, NewLineItem, Order};
use crate::messages::CartRequest;

/// Client for the cart actor.
///
/// Cheap to clone. Reads go through [`CartClient::current`] or a
/// [`subscribe`](CartClient::subscribe)d receiver; every change to the cart
/// happens inside the actor.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    state: watch::Receiver<CartState>,
}

impl CartClient {
    pub(crate) fn new(
        sender: mpsc::Sender<CartRequest>,
        state: watch::Receiver<CartState>,
    ) -> Self {
        Self { sender, state }
    }

    /// Last published cart state, without a round trip to the actor.
    pub fn current(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.clone()
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|e| CartError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(CartClient => fn add(item: NewLineItem) -> CartState as CartRequest::Add, Error = CartError);
client_method!(CartClient => fn update_quantity(artwork_id: ArtworkId, quantity: i64) -> CartState as CartRequest::UpdateQuantity, Error = CartError);
client_method!(CartClient => fn remove(artwork_id: ArtworkId) -> CartState as CartRequest::Remove, Error = CartError);
client_method!(CartClient => fn clear() -> CartState as CartRequest::Clear, Error = CartError);
client_method!(CartClient => fn snapshot() -> CartState as CartRequest::Snapshot, Error = CartError);
client_method!(CartClient => fn fetch_cart() -> SyncOutcome as CartRequest::FetchCart, Error = CartError);
client_method!(CartClient => fn sync_cart() -> SyncOutcome as CartRequest::SyncCart, Error = CartError);
client_method!(CartClient => fn checkout() -> Order as CartRequest::Checkout, Error = CartError);
client_method!(CartClient => fn order_history() -> Vec<Order> as CartRequest::OrderHistory, Error = CartError);

// Test-only message for inspecting the remote queue
#[cfg(test)]
client_method!(CartClient => fn pending_remote_calls() -> usize as CartRequest::PendingRemoteCalls, Error = CartError);
