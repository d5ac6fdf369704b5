// Wire shapes of the storefront API that are not domain types themselves.
use serde::{Deserialize, Serialize};

use crate::domain::{CartLineItem, Identity, Order, Role};

#[derive(Debug, Serialize)]
pub struct SyncCartRequest<'a> {
    pub items: &'a [CartLineItem],
}

#[derive(Debug, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// Error body shape; endpoints use either `message` or `error`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn describe(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message.or(parsed.error))
            .unwrap_or_else(|| body.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_message_then_error_then_raw_text() {
        assert_eq!(
            ErrorBody::describe(r#"{"message":"No pending order found"}"#),
            "No pending order found"
        );
        assert_eq!(ErrorBody::describe(r#"{"error":"Invalid role"}"#), "Invalid role");
        assert_eq!(ErrorBody::describe(" Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn sync_request_wraps_items() {
        let items = vec![CartLineItem {
            artwork_id: 1,
            title: "Sun".to_string(),
            image_url: None,
            artist_name: None,
            unit_price: 10.0,
            quantity: 2,
        }];
        let body = serde_json::to_value(SyncCartRequest { items: &items }).unwrap();
        assert_eq!(body["items"][0]["artwork_id"], 1);
        assert_eq!(body["items"][0]["price"], 10.0);
    }

    #[test]
    fn checkout_response_keeps_message_and_order() {
        let json = r#"{
            "message": "Order confirmed",
            "order": {"order_id": 12, "total_amount": 40.0, "status": "confirmed"}
        }"#;
        let response: CheckoutResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.as_deref(), Some("Order confirmed"));
        assert_eq!(response.order.order_id, 12);
        assert!(response.order.items.is_empty());
    }

    #[test]
    fn login_response_carries_identity() {
        let json = r#"{
            "token": "abc",
            "user": {"id": 5, "email": "c@x.io", "name": "Cy", "role": "customer", "customer_id": 5}
        }"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user.role, Role::Customer);
        assert_eq!(response.user.id, 5);
    }
}
