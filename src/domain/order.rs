use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, CartLineItem};

/// Represents a customer order created by checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub total_amount: f64,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub date: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

impl Order {
    pub fn new(order_id: u64, items: Vec<CartLineItem>) -> Self {
        let total_amount = items.iter().map(CartLineItem::subtotal).sum();
        Self {
            order_id,
            total_amount,
            date: None,
            status: "confirmed".to_string(),
            customer_name: None,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_checkout_order() {
        let json = r#"{
            "order_id": 41,
            "total_amount": 300.0,
            "date": "2024-06-10T09:15:00",
            "status": "confirmed",
            "customer_name": "Jo",
            "items": [
                {"artwork_id": 1, "title": "Sun", "quantity": 3, "price": 100.0,
                 "image_url": null, "artist_name": "Ada"}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_id, 41);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
        assert!(order.date.is_some());
    }

    #[test]
    fn new_order_sums_lines() {
        let line = CartLineItem {
            artwork_id: 1,
            title: "Sun".to_string(),
            image_url: None,
            artist_name: None,
            unit_price: 25.0,
            quantity: 4,
        };
        assert_eq!(Order::new(1, vec![line]).total_amount, 100.0);
    }
}
