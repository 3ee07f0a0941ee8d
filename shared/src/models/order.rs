//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Terminal orders accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Preparing => write!(f, "PREPARING"),
            Self::Served => write!(f, "SERVED"),
            Self::Paid => write!(f, "PAID"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Order line item
///
/// `subtotal` is stored, not derived; whoever mutates items keeps it equal to
/// `quantity * price` at computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Option<i64>,
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    /// Unit price in currency unit
    pub price: f64,
    /// quantity * price at computation time
    pub subtotal: f64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Referenced table (the order does not own it)
    pub table_id: Option<i64>,
    /// Display label of the referenced table, if any
    pub table_number: Option<String>,
    /// Assigned staff member, optional until assigned
    pub employee_id: Option<i64>,
    pub promotion_id: Option<i64>,
    /// Total amount in currency unit; stored independently of the items
    pub total_amount: f64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub table_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub promotion_id: Option<i64>,
    /// Total amount in currency unit
    pub total_amount: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemDraft>,
}

/// Line item within a create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    /// Unit price in currency unit
    pub price: f64,
}

/// Create order item payload (POST /order-items)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub subtotal: f64,
}

/// Update order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderUpdate {
    /// Status-only update
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Total-only update
    pub fn total_amount(total_amount: f64) -> Self {
        Self {
            total_amount: Some(total_amount),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");

        let back: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Served.is_terminal());
    }

    #[test]
    fn update_payload_skips_unset_fields() {
        let json = serde_json::to_string(&OrderUpdate::status(OrderStatus::Confirmed)).unwrap();
        assert_eq!(json, "{\"status\":\"CONFIRMED\"}");
    }
}
