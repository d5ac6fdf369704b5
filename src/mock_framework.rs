//! # Mock Framework
//!
//! A [`StorefrontApi`] whose calls arrive on a channel the test controls.
//!
//! Use [`create_mock_api`] to get the mock and the receiving end, then the
//! `expect_*` helpers to take the next call and answer it whenever the
//! scenario needs. Holding a responder keeps the call in flight, which is how
//! tests interleave local edits with remote responses deterministically.

use tokio::sync::{mpsc, oneshot};

use crate::domain::{Artwork, CartLineItem, CartSnapshot, Order};
use crate::remote::{ApiError, LoginRequest, LoginResponse, StorefrontApi};

pub type Responder<T> = oneshot::Sender<Result<T, ApiError>>;

#[derive(Debug)]
pub enum RemoteCall {
    GetCart {
        token: String,
        respond_to: Responder<CartSnapshot>,
    },
    SyncCart {
        token: String,
        items: Vec<CartLineItem>,
        respond_to: Responder<()>,
    },
    Checkout {
        token: String,
        respond_to: Responder<Order>,
    },
    ListOrders {
        token: String,
        respond_to: Responder<Vec<Order>>,
    },
    ListArtworks {
        respond_to: Responder<Vec<Artwork>>,
    },
    Login {
        request: LoginRequest,
        respond_to: Responder<LoginResponse>,
    },
}

pub struct MockStorefrontApi {
    sender: mpsc::UnboundedSender<RemoteCall>,
}

impl MockStorefrontApi {
    async fn call<T>(&self, make: impl FnOnce(Responder<T>) -> RemoteCall) -> Result<T, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .map_err(|_| ApiError::Transport("mock receiver dropped".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Transport("mock responder dropped".to_string()))?
    }
}

impl StorefrontApi for MockStorefrontApi {
    async fn get_cart(&self, token: &str) -> Result<CartSnapshot, ApiError> {
        let token = token.to_string();
        self.call(|respond_to| RemoteCall::GetCart { token, respond_to })
            .await
    }

    async fn sync_cart(&self, token: &str, items: &[CartLineItem]) -> Result<(), ApiError> {
        let token = token.to_string();
        let items = items.to_vec();
        self.call(|respond_to| RemoteCall::SyncCart {
            token,
            items,
            respond_to,
        })
        .await
    }

    async fn checkout(&self, token: &str) -> Result<Order, ApiError> {
        let token = token.to_string();
        self.call(|respond_to| RemoteCall::Checkout { token, respond_to })
            .await
    }

    async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        let token = token.to_string();
        self.call(|respond_to| RemoteCall::ListOrders { token, respond_to })
            .await
    }

    async fn list_artworks(&self) -> Result<Vec<Artwork>, ApiError> {
        self.call(|respond_to| RemoteCall::ListArtworks { respond_to })
            .await
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        self.call(|respond_to| RemoteCall::Login {
            request,
            respond_to,
        })
        .await
    }
}

/// Creates a mock API and the receiver its calls arrive on.
pub fn create_mock_api() -> (MockStorefrontApi, mpsc::UnboundedReceiver<RemoteCall>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (MockStorefrontApi { sender }, receiver)
}

/// Helper to verify that the next call is `GET /cart`
pub async fn expect_fetch(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<(String, Responder<CartSnapshot>)> {
    match receiver.recv().await {
        Some(RemoteCall::GetCart { token, respond_to }) => Some((token, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `POST /cart/sync`
pub async fn expect_sync(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<(Vec<CartLineItem>, Responder<()>)> {
    match receiver.recv().await {
        Some(RemoteCall::SyncCart {
            items, respond_to, ..
        }) => Some((items, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is `POST /cart/checkout`
pub async fn expect_checkout(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<(String, Responder<Order>)> {
    match receiver.recv().await {
        Some(RemoteCall::Checkout { token, respond_to }) => Some((token, respond_to)),
        _ => None,
    }
}

pub async fn expect_list_orders(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<Responder<Vec<Order>>> {
    match receiver.recv().await {
        Some(RemoteCall::ListOrders { respond_to, .. }) => Some(respond_to),
        _ => None,
    }
}

pub async fn expect_list_artworks(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<Responder<Vec<Artwork>>> {
    match receiver.recv().await {
        Some(RemoteCall::ListArtworks { respond_to }) => Some(respond_to),
        _ => None,
    }
}

pub async fn expect_login(
    receiver: &mut mpsc::UnboundedReceiver<RemoteCall>,
) -> Option<(LoginRequest, Responder<LoginResponse>)> {
    match receiver.recv().await {
        Some(RemoteCall::Login {
            request,
            respond_to,
        }) => Some((request, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_api() {
        let (api, mut receiver) = create_mock_api();

        let fetch_task = tokio::spawn(async move { api.get_cart("tok").await });

        let (token, responder) = expect_fetch(&mut receiver).await.expect("Expected GetCart call");
        assert_eq!(token, "tok");
        responder.send(Ok(CartSnapshot::default())).unwrap();

        let result = fetch_task.await.unwrap();
        assert_eq!(result, Ok(CartSnapshot::default()));
    }

    #[tokio::test]
    async fn dropped_responder_is_a_transport_error() {
        let (api, mut receiver) = create_mock_api();
        let task = tokio::spawn(async move { api.checkout("tok").await });

        let (_, responder) = expect_checkout(&mut receiver).await.unwrap();
        drop(responder);

        assert!(matches!(task.await.unwrap(), Err(ApiError::Transport(_))));
    }
}
