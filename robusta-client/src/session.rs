//! Backoffice session
//!
//! One connected dashboard instance: stores, sync channel, and the UI
//! notification boundary, composed behind the call surface the dashboard
//! uses. The UI never mutates cached records directly.

use std::sync::Arc;

use shared::message::SyncEvent;
use shared::message::payload::{NotificationCategory, NotificationPayload, TableStatusChangedPayload};
use shared::models::{Bill, BillCreate, Order, OrderDraft, OrderItem, OrderItemDraft, OrderStatus, OrderUpdate, Table, TableStatus};

use crate::api::BackofficeApi;
use crate::engine::{self, TableEffect};
use crate::error::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::store::{OrderStore, TableStore};
use crate::sync::SyncChannel;

/// Result of a committed status mutation.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub order_id: i64,
    pub new_status: OrderStatus,
    /// Table side effect that was persisted, if any
    pub applied_effect: Option<TableEffect>,
    /// Table that could not be resolved; the order update stands regardless
    pub missing_table: Option<i64>,
}

pub struct BackofficeSession {
    api: Arc<dyn BackofficeApi>,
    orders: Arc<OrderStore>,
    tables: Arc<TableStore>,
    channel: SyncChannel,
    notifier: Arc<dyn Notifier>,
}

impl BackofficeSession {
    pub fn new(
        api: Arc<dyn BackofficeApi>,
        channel: SyncChannel,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            orders: Arc::new(OrderStore::new(api.clone())),
            tables: Arc::new(TableStore::new(api.clone())),
            api,
            channel,
            notifier,
        })
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub fn tables(&self) -> &TableStore {
        &self.tables
    }

    pub fn channel(&self) -> &SyncChannel {
        &self.channel
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Full refresh of both stores. Used on connect/reconnect and whenever
    /// the event stream lagged; refetching is the only catch-up mechanism.
    pub async fn resync(&self) {
        if let Err(e) = self.orders.refresh().await {
            self.report(&e).await;
        }
        if let Err(e) = self.tables.refresh().await {
            self.report(&e).await;
        }
    }

    /// Create an order. Client-side validation failures never reach the
    /// backend.
    pub async fn create_order(&self, draft: &OrderDraft) -> ClientResult<Order> {
        match self.orders.create(draft).await {
            Ok(order) => {
                self.notifier
                    .notify(NotificationPayload::info(
                        "Order created",
                        format!("Order #{} placed", order.id),
                    ))
                    .await;
                Ok(order)
            }
            Err(e) => {
                self.report(&e).await;
                Err(e)
            }
        }
    }

    /// Request a status transition.
    ///
    /// Decision and application are separate steps: the engine computes the
    /// transition and its table side effect, then this method persists the
    /// order update, persists the table update if one was computed, and
    /// broadcasts both changes. The two writes go to independent backend
    /// resources; if the table write fails the order commit stands and the
    /// divergence is repaired by re-broadcast and refetch.
    pub async fn update_status(
        &self,
        order_id: i64,
        target: OrderStatus,
    ) -> ClientResult<StatusUpdate> {
        let order = match self.orders.get(order_id) {
            Some(order) => order,
            None => self.api.get_order(order_id).await.map_err(|e| {
                tracing::warn!(order_id, error = %e, "order lookup failed");
                e
            })?,
        };

        let transition = match engine::attempt_transition(&order, target) {
            Ok(t) => t,
            Err(e) => {
                self.notifier
                    .notify(NotificationPayload::warning("Not allowed", e.to_string()))
                    .await;
                return Err(e.into());
            }
        };

        if let Err(e) = self
            .orders
            .persist_status(order_id, &OrderUpdate::status(transition.new_status))
            .await
        {
            self.report(&e).await;
            return Err(e);
        }

        let mut applied_effect = None;
        let mut missing_table = None;
        if let Some(effect) = transition.table_effect {
            match self.tables.apply_effect(&effect).await {
                Ok(table) => {
                    applied_effect = Some(effect);
                    self.emit(SyncEvent::TableStatusChanged(TableStatusChangedPayload {
                        table_id: effect.table_id,
                        table_number: Some(table.number),
                        new_status: effect.new_status,
                        order_id: Some(order_id),
                        reason: Some(engine::effect_reason(target).to_string()),
                    }))
                    .await;
                }
                Err(ClientError::MissingTable(id)) => {
                    // Order update already committed; skip the table update.
                    missing_table = Some(id);
                    tracing::warn!(order_id, table_id = id, "table side effect skipped, reference does not resolve");
                    self.notifier
                        .notify(NotificationPayload::warning(
                            "Table missing",
                            format!("Table {} no longer exists; order #{} updated anyway", id, order_id),
                        ))
                        .await;
                }
                Err(e) => {
                    tracing::error!(order_id, table_id = effect.table_id, error = %e, "table side effect failed");
                    self.report(&e).await;
                }
            }
        }

        self.emit(SyncEvent::OrderStatusUpdated(
            shared::message::payload::OrderStatusUpdatedPayload {
                order_id,
                new_status: transition.new_status,
                table_number: order.table_number.clone(),
            },
        ))
        .await;

        // The mutation stands; a failed refetch still surfaces to the user.
        if let Err(e) = self.orders.refresh().await {
            tracing::warn!(error = %e, "refresh after status update failed");
            self.report(&e).await;
        }
        if transition.table_effect.is_some() {
            if let Err(e) = self.tables.refresh().await {
                tracing::warn!(error = %e, "table refresh after status update failed");
                self.report(&e).await;
            }
        }

        self.notifier
            .notify(NotificationPayload::info(
                "Order updated",
                format!("Order #{} is now {}", order_id, transition.new_status),
            ))
            .await;

        Ok(StatusUpdate {
            order_id,
            new_status: transition.new_status,
            applied_effect,
            missing_table,
        })
    }

    /// Append line items to an order.
    pub async fn add_items(
        &self,
        order_id: i64,
        items: &[OrderItemDraft],
    ) -> ClientResult<(Vec<OrderItem>, f64)> {
        match self.orders.add_items(order_id, items).await {
            Ok(result) => {
                self.notifier
                    .notify(NotificationPayload::info(
                        "Items added",
                        format!("Order #{}: {} item(s) added", order_id, result.0.len()),
                    ))
                    .await;
                Ok(result)
            }
            Err(e) => {
                self.report(&e).await;
                Err(e)
            }
        }
    }

    /// Direct staff-driven table status change (no order involved).
    pub async fn set_table_status(
        &self,
        table_id: i64,
        status: TableStatus,
    ) -> ClientResult<Table> {
        match self.tables.set_status(table_id, status).await {
            Ok(table) => {
                self.emit(SyncEvent::TableStatusChanged(TableStatusChangedPayload {
                    table_id,
                    table_number: Some(table.number.clone()),
                    new_status: status,
                    order_id: None,
                    reason: Some("staff-action".to_string()),
                }))
                .await;
                Ok(table)
            }
            Err(e) => {
                self.report(&e).await;
                Err(e)
            }
        }
    }

    /// Issue a bill for a paid order.
    pub async fn create_bill(&self, order_id: i64, payment_method: &str) -> ClientResult<Bill> {
        let order = match self.orders.get(order_id) {
            Some(order) => order,
            None => self.api.get_order(order_id).await?,
        };
        if order.status != OrderStatus::Paid {
            let e = ClientError::Validation(format!(
                "cannot bill order #{} in status {}",
                order_id, order.status
            ));
            self.report(&e).await;
            return Err(e);
        }
        match self
            .api
            .create_bill(&BillCreate {
                order_id,
                total_amount: order.total_amount,
                payment_method: payment_method.to_string(),
            })
            .await
        {
            Ok(bill) => {
                self.notifier
                    .notify(NotificationPayload::info(
                        "Bill issued",
                        format!(
                            "Order #{} billed via {} ({:.2})",
                            order_id, payment_method, bill.total_amount
                        ),
                    ))
                    .await;
                Ok(bill)
            }
            Err(e) => {
                self.report(&e).await;
                Err(e)
            }
        }
    }

    /// Best-effort emit; channel loss is silent by design.
    pub(crate) async fn emit(&self, event: SyncEvent) {
        if let Err(e) = self.channel.emit(event).await {
            tracing::debug!(error = %e, "sync emit skipped, channel down");
        }
    }

    /// Convert an error into a user-facing notification.
    pub(crate) async fn report(&self, error: &ClientError) {
        let payload = match error {
            ClientError::Validation(msg) => {
                NotificationPayload::warning("Invalid input", msg.clone())
                    .with_category(NotificationCategory::Business)
            }
            ClientError::Transition(e) => {
                NotificationPayload::warning("Not allowed", e.to_string())
                    .with_category(NotificationCategory::Business)
            }
            ClientError::MissingTable(id) => NotificationPayload::warning(
                "Table missing",
                format!("Table {} no longer exists", id),
            ),
            ClientError::Unauthorized => {
                NotificationPayload::error("Signed out", "Please sign in again")
                    .with_category(NotificationCategory::System)
            }
            other => NotificationPayload::error("Backend unavailable", other.to_string()),
        };
        self.notifier.notify(payload).await;
    }
}
