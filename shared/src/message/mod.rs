//! Realtime sync protocol
//!
//! Types shared between every dashboard session connected to the sync hub.
//! Events are JSON-encoded, framed with a 4-byte little-endian length prefix
//! on the TCP transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod payload;
pub use payload::*;

use crate::models::order::Order;

/// Protocol version
pub const PROTOCOL_VERSION: u16 = 1;

/// Sync events carried over the channel.
///
/// Delivery is at-least-once and unordered; consumers re-list the affected
/// store instead of patching incrementally, so handling the same event twice
/// must be (and is) harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum SyncEvent {
    /// A new order was placed
    OrderCreated { order: Order },
    /// An order moved to a new status (broadcast by the backend)
    OrderStatusChanged(OrderStatusChangedPayload),
    /// Line items were appended to an existing order
    ItemsAddedToOrder(ItemsAddedPayload),
    /// A customer called for staff; requires an explicit acknowledgment
    StaffCall(StaffCallPayload),
    /// A payment went through
    PaymentCompleted(PaymentCompletedPayload),
    /// A table changed occupancy status
    TableStatusChanged(TableStatusChangedPayload),
    /// A customer asked to cancel; staff must accept or reject
    CancelRequested(CancelRequestedPayload),
    /// Emitted by a session after a successful status mutation
    OrderStatusUpdated(OrderStatusUpdatedPayload),
    /// Staff acknowledged a staff call
    StaffCallAck(StaffCallAckPayload),
    /// Staff acknowledged a completed payment
    PaymentAck(PaymentAckPayload),
}

impl SyncEvent {
    /// Wire name of the event (the serde tag).
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "order-created",
            Self::OrderStatusChanged(_) => "order-status-changed",
            Self::ItemsAddedToOrder(_) => "items-added-to-order",
            Self::StaffCall(_) => "staff-call",
            Self::PaymentCompleted(_) => "payment-completed",
            Self::TableStatusChanged(_) => "table-status-changed",
            Self::CancelRequested(_) => "cancel-requested",
            Self::OrderStatusUpdated(_) => "order-status-updated",
            Self::StaffCallAck(_) => "staff-call-ack",
            Self::PaymentAck(_) => "payment-ack",
        }
    }
}

/// Wire frame: one event plus tracing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub request_id: Uuid,
    /// Originating session, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub event: SyncEvent,
}

impl Frame {
    pub fn new(event: SyncEvent) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            session: None,
            event,
        }
    }

    /// Tag the frame with the originating session id
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::table::TableStatus;

    #[test]
    fn events_are_tagged_by_wire_name() {
        let event = SyncEvent::TableStatusChanged(TableStatusChangedPayload {
            table_id: 5,
            table_number: Some("T5".into()),
            new_status: TableStatus::Free,
            order_id: Some(12),
            reason: Some("payment-completed".into()),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "table-status-changed");
        assert_eq!(json["data"]["new_status"], "FREE");
        assert_eq!(event.name(), "table-status-changed");
    }

    #[test]
    fn frame_round_trips() {
        let frame = Frame::new(SyncEvent::CancelRequested(CancelRequestedPayload {
            order_id: 7,
        }))
        .with_session("session-a");

        let bytes = frame.to_bytes().unwrap();
        let back = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.session.as_deref(), Some("session-a"));
    }
}
