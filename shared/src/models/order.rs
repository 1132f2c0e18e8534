//! Order and order item models

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// CSS badge class used by the admin pages
    pub fn badge_class(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "badge-warning",
            OrderStatus::Paid => "badge-success",
            OrderStatus::Cancelled => "badge-danger",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string matches none of the known statuses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseOrderStatusError(s.to_string())),
        }
    }
}

/// An order header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// Unique order number (e.g., "ORD202601010001")
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    /// Persisted sum of quantity * price over the order's lines
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A stored order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    /// Unit price captured when the line was created or last updated
    pub price: Decimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order line joined with its item name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// Order with all of its lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderLine>,
}

/// Requested line when creating an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Input for creating an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub order_items: Vec<OrderLineInput>,
}

/// Input for changing the status of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

/// Requested line when editing an order.
///
/// `id` refers to an existing line of the order; lines without an id (or with
/// an id the order does not own) are added as new lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineChange {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Input for editing an order: target status plus the complete list of lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderInput {
    pub status: OrderStatus,
    pub order_items: Vec<OrderLineChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_as_uppercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"CANCELLED\"");
        let status: OrderStatus = serde_json::from_str("\"PAID\"").unwrap();
        assert_eq!(status, OrderStatus::Paid);
        assert!(serde_json::from_str::<OrderStatus>("\"paid\"").is_err());
    }

    #[test]
    fn test_from_str_ignores_case_and_whitespace() {
        assert_eq!(" pending ".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(
            "refunded".parse::<OrderStatus>(),
            Err(ParseOrderStatusError("refunded".to_string()))
        );
    }

    #[test]
    fn test_line_change_id_is_optional() {
        let item_id = Uuid::new_v4();
        let json = format!(r#"{{"item_id": "{}", "quantity": 2}}"#, item_id);
        let change: OrderLineChange = serde_json::from_str(&json).unwrap();
        assert_eq!(change.id, None);
        assert_eq!(change.quantity, 2);
    }

    #[test]
    fn test_detail_flattens_order_fields() {
        let order = Order {
            id: Uuid::new_v4(),
            order_number: "ORD202601010001".to_string(),
            order_date: Utc::now(),
            total_amount: Decimal::from(3000),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        let detail = OrderDetail {
            order,
            order_items: Vec::new(),
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["order_number"], "ORD202601010001");
        assert_eq!(value["status"], "PENDING");
        assert!(value["order_items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_subtotal() {
        let line = OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            quantity: 3,
            price: Decimal::from(1000),
        };
        assert_eq!(line.subtotal(), Decimal::from(3000));
    }
}
