use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{
    ApiError, CheckoutResponse, ErrorBody, LoginRequest, LoginResponse, OrdersResponse,
    StorefrontApi, SyncCartRequest,
};
use crate::domain::{Artwork, CartLineItem, CartSnapshot, Order};

/// [`StorefrontApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: Client,
    base_url: String,
}

impl HttpStorefrontApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = ErrorBody::describe(&body);
        warn!(status = status.as_u16(), %message, "Request rejected");
        Err(status_error(status, message))
    }
}

fn status_error(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized(message)
    } else {
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

impl StorefrontApi for HttpStorefrontApi {
    #[instrument(skip(self, token))]
    async fn get_cart(&self, token: &str) -> Result<CartSnapshot, ApiError> {
        debug!("Sending request");
        self.send(self.client.get(self.endpoint("/cart")).bearer_auth(token))
            .await
    }

    #[instrument(fields(item_count = items.len()), skip(self, token, items))]
    async fn sync_cart(&self, token: &str, items: &[CartLineItem]) -> Result<(), ApiError> {
        debug!("Sending request");
        let request = self
            .client
            .post(self.endpoint("/cart/sync"))
            .bearer_auth(token)
            .json(&SyncCartRequest { items });
        Self::check_status(request.send().await?).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn checkout(&self, token: &str) -> Result<Order, ApiError> {
        debug!("Sending request");
        let response: CheckoutResponse = self
            .send(
                self.client
                    .post(self.endpoint("/cart/checkout"))
                    .bearer_auth(token),
            )
            .await?;
        debug!(
            order_id = response.order.order_id,
            message = response.message.as_deref().unwrap_or(""),
            "Checkout accepted"
        );
        Ok(response.order)
    }

    #[instrument(skip(self, token))]
    async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        debug!("Sending request");
        let response: OrdersResponse = self
            .send(self.client.get(self.endpoint("/orders")).bearer_auth(token))
            .await?;
        Ok(response.orders)
    }

    #[instrument(skip(self))]
    async fn list_artworks(&self) -> Result<Vec<Artwork>, ApiError> {
        debug!("Sending request");
        self.send(self.client.get(self.endpoint("/artworks"))).await
    }

    #[instrument(fields(email = %request.email, role = %request.role), skip(self, request))]
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        debug!("Sending request");
        self.send(self.client.post(self.endpoint("/auth/login")).json(&request))
            .await
    }
}
