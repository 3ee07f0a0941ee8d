//! Bill Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bill entity, issued once an order is paid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub order_id: i64,
    /// Amount in currency unit
    pub total_amount: f64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

/// Create bill payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillCreate {
    pub order_id: i64,
    pub total_amount: f64,
    pub payment_method: String,
}
