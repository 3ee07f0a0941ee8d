//! Order store

use std::sync::Arc;

use parking_lot::RwLock;

use shared::models::{Order, OrderDraft, OrderItem, OrderItemCreate, OrderItemDraft, OrderUpdate};
use shared::money;

use crate::api::BackofficeApi;
use crate::error::{ClientError, ClientResult};

/// Cache of backend orders, newest id first.
pub struct OrderStore {
    api: Arc<dyn BackofficeApi>,
    snapshot: RwLock<Vec<Order>>,
}

impl OrderStore {
    pub fn new(api: Arc<dyn BackofficeApi>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Last good snapshot, sorted by id descending.
    pub fn list(&self) -> Vec<Order> {
        self.snapshot.read().clone()
    }

    /// Look up a cached order by id.
    pub fn get(&self, order_id: i64) -> Option<Order> {
        self.snapshot.read().iter().find(|o| o.id == order_id).cloned()
    }

    /// The non-terminal order referencing a table, if any. UI-level
    /// convention only; nothing enforces uniqueness.
    pub fn active_order_for_table(&self, table_id: i64) -> Option<Order> {
        self.snapshot
            .read()
            .iter()
            .find(|o| o.table_id == Some(table_id) && !o.status.is_terminal())
            .cloned()
    }

    /// Re-fetch from the backend and swap the snapshot. On failure the
    /// previous snapshot is retained.
    pub async fn refresh(&self) -> ClientResult<Vec<Order>> {
        match self.api.list_orders().await {
            Ok(mut orders) => {
                orders.sort_by(|a, b| b.id.cmp(&a.id));
                *self.snapshot.write() = orders.clone();
                Ok(orders)
            }
            Err(e) => {
                tracing::warn!(error = %e, "order refresh failed, keeping stale snapshot");
                Err(e)
            }
        }
    }

    /// Validate and create an order. Validation failures never reach the
    /// backend.
    pub async fn create(&self, draft: &OrderDraft) -> ClientResult<Order> {
        validate_draft(draft)?;
        let order = self.api.create_order(draft).await?;
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "refresh after create failed");
        }
        Ok(order)
    }

    /// Persist a raw status update. Callers go through the session layer,
    /// which has already consulted the transition engine.
    pub(crate) async fn persist_status(&self, order_id: i64, update: &OrderUpdate) -> ClientResult<Order> {
        self.api.update_order(order_id, update).await
    }

    /// Append line items, keeping the stored total consistent.
    ///
    /// Subtotals are computed here (quantity * unit price); the order's
    /// total_amount is stored independently and updated in the same pass.
    pub async fn add_items(
        &self,
        order_id: i64,
        items: &[OrderItemDraft],
    ) -> ClientResult<(Vec<OrderItem>, f64)> {
        if items.is_empty() {
            return Err(ClientError::Validation("no items to add".into()));
        }
        for item in items {
            validate_item(item)?;
        }

        let order = self.api.get_order(order_id).await?;

        let mut added = Vec::with_capacity(items.len());
        for item in items {
            let create = OrderItemCreate {
                order_id,
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                price: item.price,
                subtotal: money::line_subtotal(item.quantity, item.price),
            };
            added.push(self.api.create_order_item(&create).await?);
        }

        let new_total =
            money::round_money(order.total_amount + money::items_total(&added));
        self.api
            .update_order(order_id, &OrderUpdate::total_amount(new_total))
            .await?;

        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "refresh after add_items failed");
        }
        Ok((added, new_total))
    }
}

fn validate_draft(draft: &OrderDraft) -> ClientResult<()> {
    if draft.table_id.is_none() {
        return Err(ClientError::Validation("order requires a table".into()));
    }
    if draft.employee_id.is_none() {
        return Err(ClientError::Validation("order requires an employee".into()));
    }
    if !draft.total_amount.is_finite() {
        return Err(ClientError::Validation(format!(
            "total_amount must be a finite number, got {}",
            draft.total_amount
        )));
    }
    if draft.total_amount <= 0.0 {
        return Err(ClientError::Validation(format!(
            "total_amount must be positive, got {}",
            draft.total_amount
        )));
    }
    for item in &draft.items {
        validate_item(item)?;
    }
    Ok(())
}

fn validate_item(item: &OrderItemDraft) -> ClientResult<()> {
    if item.quantity < 1 {
        return Err(ClientError::Validation(format!(
            "quantity must be at least 1, got {}",
            item.quantity
        )));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(ClientError::Validation(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::MockApi;
    use shared::models::OrderStatus;
    use std::sync::atomic::Ordering;

    fn draft(table_id: Option<i64>, employee_id: Option<i64>, total: f64) -> OrderDraft {
        OrderDraft {
            table_id,
            employee_id,
            promotion_id: None,
            total_amount: total,
            notes: None,
            items: vec![],
        }
    }

    #[tokio::test]
    async fn list_is_sorted_newest_id_first() {
        let api = Arc::new(MockApi::new());
        api.seed_order(3, OrderStatus::Pending, None);
        api.seed_order(11, OrderStatus::Pending, None);
        api.seed_order(7, OrderStatus::Pending, None);

        let store = OrderStore::new(api);
        store.refresh().await.unwrap();

        let ids: Vec<i64> = store.list().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![11, 7, 3]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_snapshot() {
        let api = Arc::new(MockApi::new());
        api.seed_order(1, OrderStatus::Pending, None);

        let store = OrderStore::new(api.clone());
        store.refresh().await.unwrap();
        assert_eq!(store.list().len(), 1);

        api.fail_orders.store(true, Ordering::SeqCst);
        assert!(store.refresh().await.is_err());
        // Stale-but-available
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_total_without_calling_backend() {
        let api = Arc::new(MockApi::new());
        let store = OrderStore::new(api.clone());

        let err = store.create(&draft(Some(1), Some(1), 0.0)).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(api.create_order_calls.load(Ordering::SeqCst), 0);

        let err = store.create(&draft(Some(1), Some(1), -4.2)).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(api.create_order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_requires_table_and_employee() {
        let api = Arc::new(MockApi::new());
        let store = OrderStore::new(api.clone());

        assert!(store.create(&draft(None, Some(1), 5.0)).await.is_err());
        assert!(store.create(&draft(Some(1), None, 5.0)).await.is_err());
        assert_eq!(api.create_order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn created_order_shows_up_in_list() {
        let api = Arc::new(MockApi::new());
        let store = OrderStore::new(api);

        let mut d = draft(Some(2), Some(9), 7.8);
        d.notes = Some("no sugar".into());
        let created = store.create(&d).await.unwrap();

        let listed = store
            .list()
            .into_iter()
            .find(|o| o.id == created.id)
            .expect("created order listed");
        assert_eq!(listed.table_id, Some(2));
        assert_eq!(listed.employee_id, Some(9));
        assert_eq!(listed.total_amount, 7.8);
        assert_eq!(listed.notes.as_deref(), Some("no sugar"));
        assert_eq!(listed.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn add_items_keeps_total_consistent() {
        let api = Arc::new(MockApi::new());
        api.seed_order(1, OrderStatus::Confirmed, Some(1));
        let store = OrderStore::new(api);
        store.refresh().await.unwrap();

        let items = vec![
            OrderItemDraft {
                product_id: 10,
                name: "Espresso".into(),
                quantity: 2,
                price: 1.2,
            },
            OrderItemDraft {
                product_id: 11,
                name: "Cortado".into(),
                quantity: 1,
                price: 2.5,
            },
        ];
        let (added, new_total) = store.add_items(1, &items).await.unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].subtotal, 2.4);
        // Seeded total 10.0 + 2.4 + 2.5
        assert_eq!(new_total, 14.9);
        assert_eq!(store.get(1).unwrap().total_amount, 14.9);
    }

    #[tokio::test]
    async fn add_items_rejects_zero_quantity() {
        let api = Arc::new(MockApi::new());
        api.seed_order(1, OrderStatus::Confirmed, Some(1));
        let store = OrderStore::new(api);

        let items = vec![OrderItemDraft {
            product_id: 10,
            name: "Espresso".into(),
            quantity: 0,
            price: 1.2,
        }];
        assert!(matches!(
            store.add_items(1, &items).await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn active_order_lookup_skips_terminal_orders() {
        let api = Arc::new(MockApi::new());
        api.seed_order(1, OrderStatus::Paid, Some(5));
        api.seed_order(2, OrderStatus::Preparing, Some(5));

        let store = OrderStore::new(api);
        store.refresh().await.unwrap();

        assert_eq!(store.active_order_for_table(5).unwrap().id, 2);
        assert!(store.active_order_for_table(6).is_none());
    }
}
