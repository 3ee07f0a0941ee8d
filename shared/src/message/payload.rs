use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::order::{OrderItem, OrderStatus};
use crate::models::table::TableStatus;

// ==================== Event Payloads ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChangedPayload {
    pub order_id: i64,
    pub new_status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsAddedPayload {
    pub order_id: i64,
    pub added_items: Vec<OrderItem>,
    /// New order total in currency unit
    pub new_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCallPayload {
    pub table_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCompletedPayload {
    pub order_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    /// Amount in currency unit
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatusChangedPayload {
    pub table_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    pub new_status: TableStatus,
    /// Order that triggered the change, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    /// e.g. "order-served", "payment-completed", "order-cancelled", "staff-action"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRequestedPayload {
    pub order_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusUpdatedPayload {
    pub order_id: i64,
    pub new_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCallAckPayload {
    pub table_number: String,
    /// Session that acknowledged the call
    pub session: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAckPayload {
    pub order_id: i64,
    /// Session that acknowledged the payment
    pub session: String,
}

// ==================== Notifications ====================

/// Notification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Orders, tables, payments
    Business,
    /// Backend or channel failures
    Network,
    /// Everything else
    System,
}

/// User-facing notification
///
/// Transient toast content; the UI decides presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    pub category: NotificationCategory,
}

impl NotificationPayload {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Info,
            category: NotificationCategory::Business,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Warning,
            category: NotificationCategory::Business,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Error,
            category: NotificationCategory::Network,
        }
    }

    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }
}
