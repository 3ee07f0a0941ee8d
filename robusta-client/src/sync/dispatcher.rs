//! Event dispatcher
//!
//! Consumes the sync channel subscription and applies each event's handler
//! against the stores and the UI notifier. Handlers are isolated: one bad
//! event is logged and skipped, never the loop. Consumption is
//! re-list-based, so applying the same event twice is harmless.

use std::sync::Arc;

use tokio::sync::broadcast;

use shared::message::payload::{
    NotificationPayload, PaymentAckPayload, StaffCallAckPayload, TableStatusChangedPayload,
};
use shared::message::{Frame, SyncEvent};
use shared::models::{OrderStatus, TableStatus};

use crate::engine::TableEffect;
use crate::error::{ClientError, ClientResult};
use crate::session::BackofficeSession;
use crate::sync::channel::ChannelNotice;

pub struct Dispatcher {
    session: Arc<BackofficeSession>,
}

impl Dispatcher {
    pub fn new(session: Arc<BackofficeSession>) -> Self {
        Self { session }
    }

    /// Subscribe to the session's channel and run in the background.
    pub fn spawn(session: Arc<BackofficeSession>) -> tokio::task::JoinHandle<()> {
        let rx = session.channel().subscribe();
        tokio::spawn(Dispatcher::new(session).run(rx))
    }

    pub async fn run(self, mut rx: broadcast::Receiver<ChannelNotice>) {
        tracing::info!("dispatcher started");
        // The channel may have connected before we subscribed; start from a
        // known-good snapshot either way.
        self.session.resync().await;
        loop {
            match rx.recv().await {
                Ok(ChannelNotice::Connected) => {
                    // Catch up by refetching; there is no event replay.
                    self.session.resync().await;
                }
                Ok(ChannelNotice::Disconnected) => {
                    // Silent from the user's perspective until reconnect.
                    tracing::warn!("sync channel lost, waiting for reconnect");
                }
                Ok(ChannelNotice::Event(frame)) => {
                    let name = frame.event.name();
                    if let Err(e) = self.handle(frame).await {
                        tracing::warn!(event = name, error = %e, "event handler failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "dispatcher lagged, forcing full refresh");
                    self.session.resync().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("dispatcher stopped");
    }

    async fn handle(&self, frame: Frame) -> ClientResult<()> {
        let session = &self.session;
        let name = frame.event.name();
        match frame.event {
            SyncEvent::OrderCreated { order } => {
                session.orders().refresh().await?;
                session
                    .notifier()
                    .notify(NotificationPayload::info(
                        "New order",
                        format!("Order #{} placed", order.id),
                    ))
                    .await;
            }

            SyncEvent::OrderStatusChanged(_) | SyncEvent::OrderStatusUpdated(_) => {
                session.orders().refresh().await?;
            }

            SyncEvent::ItemsAddedToOrder(p) => {
                session.orders().refresh().await?;
                session
                    .notifier()
                    .notify(NotificationPayload::info(
                        "Items added",
                        format!("Order #{}: {} item(s) added", p.order_id, p.added_items.len()),
                    ))
                    .await;
            }

            SyncEvent::StaffCall(p) => {
                // Blocking prompt must not stall the event loop
                let session = Arc::clone(session);
                tokio::spawn(async move {
                    let acknowledged = session
                        .notifier()
                        .confirm(
                            "Staff call",
                            &format!("Table {}: {}", p.table_number, p.message),
                        )
                        .await;
                    if acknowledged {
                        session
                            .emit(SyncEvent::StaffCallAck(StaffCallAckPayload {
                                table_number: p.table_number,
                                session: session.channel().session_id().to_string(),
                            }))
                            .await;
                    }
                });
            }

            SyncEvent::PaymentCompleted(p) => {
                session.orders().refresh().await?;
                if let Some(table_id) = p.table_id {
                    let effect = TableEffect {
                        table_id,
                        new_status: TableStatus::Free,
                    };
                    match session.tables().apply_effect(&effect).await {
                        Ok(table) => {
                            session
                                .emit(SyncEvent::TableStatusChanged(TableStatusChangedPayload {
                                    table_id,
                                    table_number: Some(table.number),
                                    new_status: TableStatus::Free,
                                    order_id: Some(p.order_id),
                                    reason: Some("payment-completed".to_string()),
                                }))
                                .await;
                        }
                        Err(ClientError::MissingTable(id)) => {
                            tracing::warn!(table_id = id, "payment completed for a missing table");
                        }
                        Err(e) => return Err(e),
                    }
                }
                session.tables().refresh().await?;
                session
                    .notifier()
                    .notify(NotificationPayload::info(
                        "Payment received",
                        format!("Order #{} paid ({:.2})", p.order_id, p.amount),
                    ))
                    .await;
                session
                    .emit(SyncEvent::PaymentAck(PaymentAckPayload {
                        order_id: p.order_id,
                        session: session.channel().session_id().to_string(),
                    }))
                    .await;
            }

            SyncEvent::TableStatusChanged(p) => {
                session.tables().refresh().await?;
                session
                    .notifier()
                    .notify(NotificationPayload::info(
                        "Table updated",
                        format!(
                            "Table {} is now {}",
                            p.table_number.unwrap_or_else(|| p.table_id.to_string()),
                            p.new_status
                        ),
                    ))
                    .await;
            }

            SyncEvent::CancelRequested(p) => {
                let session = Arc::clone(session);
                tokio::spawn(async move {
                    let accepted = session
                        .notifier()
                        .confirm(
                            "Cancellation requested",
                            &format!("Cancel order #{}?", p.order_id),
                        )
                        .await;
                    if accepted {
                        if let Err(e) =
                            session.update_status(p.order_id, OrderStatus::Cancelled).await
                        {
                            tracing::warn!(order_id = p.order_id, error = %e, "cancel request failed");
                        }
                    } else {
                        tracing::debug!(order_id = p.order_id, "cancel request rejected");
                    }
                });
            }

            SyncEvent::StaffCallAck(_) | SyncEvent::PaymentAck(_) => {
                tracing::debug!(event = name, "acknowledgment observed");
            }
        }
        Ok(())
    }
}
