//! Process-local caches over the REST backend
//!
//! Stores hold the last good snapshot and refresh explicitly: after every
//! mutation and on every relevant sync event. No incremental merging; a
//! failed refresh keeps the previous snapshot (stale-but-available).

pub mod orders;
pub mod tables;

pub use orders::OrderStore;
pub use tables::TableStore;

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use shared::models::{
        Bill, BillCreate, Order, OrderDraft, OrderItem, OrderItemCreate, OrderStatus, OrderUpdate,
        Table, TableCreate, TableStatus, TableUpdate,
    };

    use shared::message::payload::{NotificationLevel, NotificationPayload};

    use crate::api::BackofficeApi;
    use crate::error::{ClientError, ClientResult};
    use crate::notify::Notifier;

    /// Notifier that keeps every toast for assertions, accepting all prompts.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub toasts: Mutex<Vec<NotificationPayload>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.toasts.lock().unwrap().len()
        }

        pub fn has_level(&self, level: NotificationLevel) -> bool {
            self.toasts.lock().unwrap().iter().any(|p| p.level == level)
        }

        pub fn has_title(&self, title: &str) -> bool {
            self.toasts.lock().unwrap().iter().any(|p| p.title == title)
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, payload: NotificationPayload) {
            self.toasts.lock().unwrap().push(payload);
        }

        async fn confirm(&self, _title: &str, _message: &str) -> bool {
            true
        }
    }

    /// In-memory backend standing in for the REST collaborator.
    #[derive(Default)]
    pub struct MockApi {
        pub orders: Mutex<Vec<Order>>,
        pub tables: Mutex<Vec<Table>>,
        pub bills: Mutex<Vec<Bill>>,
        next_id: AtomicI64,
        pub list_order_calls: AtomicUsize,
        pub list_table_calls: AtomicUsize,
        pub create_order_calls: AtomicUsize,
        pub update_order_calls: AtomicUsize,
        pub update_table_calls: AtomicUsize,
        /// When set, every order endpoint fails with a backend error
        pub fail_orders: AtomicBool,
        /// When set, only `list_orders` fails (mutations still commit)
        pub fail_order_lists: AtomicBool,
        /// When set, `create_bill` fails with a backend error
        pub fail_bills: AtomicBool,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self {
                next_id: AtomicI64::new(100),
                ..Self::default()
            }
        }

        fn next_id(&self) -> i64 {
            self.next_id.fetch_add(1, Ordering::SeqCst)
        }

        pub fn seed_order(&self, id: i64, status: OrderStatus, table_id: Option<i64>) -> Order {
            let order = Order {
                id,
                table_id,
                table_number: table_id.map(|t| format!("T{}", t)),
                employee_id: Some(1),
                promotion_id: None,
                total_amount: 10.0,
                status,
                notes: None,
                created_at: Utc::now(),
                order_items: vec![],
            };
            self.orders.lock().unwrap().push(order.clone());
            order
        }

        pub fn seed_table(&self, id: i64, status: TableStatus) -> Table {
            let table = Table {
                id,
                number: format!("T{}", id),
                capacity: 4,
                status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.tables.lock().unwrap().push(table.clone());
            table
        }

        fn check_orders_up(&self) -> ClientResult<()> {
            if self.fail_orders.load(Ordering::SeqCst) {
                Err(ClientError::Backend("orders backend down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl BackofficeApi for MockApi {
        async fn list_orders(&self) -> ClientResult<Vec<Order>> {
            self.list_order_calls.fetch_add(1, Ordering::SeqCst);
            self.check_orders_up()?;
            if self.fail_order_lists.load(Ordering::SeqCst) {
                return Err(ClientError::Backend("orders backend down".into()));
            }
            Ok(self.orders.lock().unwrap().clone())
        }

        async fn get_order(&self, id: i64) -> ClientResult<Order> {
            self.check_orders_up()?;
            self.orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("order {}", id)))
        }

        async fn create_order(&self, draft: &OrderDraft) -> ClientResult<Order> {
            self.create_order_calls.fetch_add(1, Ordering::SeqCst);
            self.check_orders_up()?;
            let order = Order {
                id: self.next_id(),
                table_id: draft.table_id,
                table_number: draft.table_id.map(|t| format!("T{}", t)),
                employee_id: draft.employee_id,
                promotion_id: draft.promotion_id,
                total_amount: draft.total_amount,
                status: OrderStatus::Pending,
                notes: draft.notes.clone(),
                created_at: Utc::now(),
                order_items: draft
                    .items
                    .iter()
                    .map(|i| OrderItem {
                        id: None,
                        product_id: i.product_id,
                        name: i.name.clone(),
                        quantity: i.quantity,
                        price: i.price,
                        subtotal: shared::money::line_subtotal(i.quantity, i.price),
                    })
                    .collect(),
            };
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        async fn update_order(&self, id: i64, update: &OrderUpdate) -> ClientResult<Order> {
            self.update_order_calls.fetch_add(1, Ordering::SeqCst);
            self.check_orders_up()?;
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| ClientError::NotFound(format!("order {}", id)))?;
            if let Some(status) = update.status {
                order.status = status;
            }
            if let Some(total) = update.total_amount {
                order.total_amount = total;
            }
            if let Some(employee_id) = update.employee_id {
                order.employee_id = Some(employee_id);
            }
            if let Some(notes) = &update.notes {
                order.notes = Some(notes.clone());
            }
            Ok(order.clone())
        }

        async fn delete_order(&self, id: i64) -> ClientResult<()> {
            self.orders.lock().unwrap().retain(|o| o.id != id);
            Ok(())
        }

        async fn create_order_item(&self, item: &OrderItemCreate) -> ClientResult<OrderItem> {
            let created = OrderItem {
                id: Some(self.next_id()),
                product_id: item.product_id,
                name: item.name.clone(),
                quantity: item.quantity,
                price: item.price,
                subtotal: item.subtotal,
            };
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == item.order_id)
                .ok_or_else(|| ClientError::NotFound(format!("order {}", item.order_id)))?;
            order.order_items.push(created.clone());
            Ok(created)
        }

        async fn list_tables(&self) -> ClientResult<Vec<Table>> {
            self.list_table_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tables.lock().unwrap().clone())
        }

        async fn get_table(&self, id: i64) -> ClientResult<Table> {
            self.tables
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("table {}", id)))
        }

        async fn create_table(&self, create: &TableCreate) -> ClientResult<Table> {
            let table = Table {
                id: self.next_id(),
                number: create.number.clone(),
                capacity: create.capacity,
                status: TableStatus::Free,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.tables.lock().unwrap().push(table.clone());
            Ok(table)
        }

        async fn update_table(&self, id: i64, update: &TableUpdate) -> ClientResult<Table> {
            self.update_table_calls.fetch_add(1, Ordering::SeqCst);
            let mut tables = self.tables.lock().unwrap();
            let table = tables
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ClientError::NotFound(format!("table {}", id)))?;
            if let Some(number) = &update.number {
                table.number = number.clone();
            }
            if let Some(capacity) = update.capacity {
                table.capacity = capacity;
            }
            if let Some(status) = update.status {
                table.status = status;
            }
            table.updated_at = Utc::now();
            Ok(table.clone())
        }

        async fn delete_table(&self, id: i64) -> ClientResult<()> {
            self.tables.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }

        async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
            Ok(self.bills.lock().unwrap().clone())
        }

        async fn create_bill(&self, create: &BillCreate) -> ClientResult<Bill> {
            if self.fail_bills.load(Ordering::SeqCst) {
                return Err(ClientError::Backend("billing backend down".into()));
            }
            let bill = Bill {
                id: self.next_id(),
                order_id: create.order_id,
                total_amount: create.total_amount,
                payment_method: create.payment_method.clone(),
                created_at: Utc::now(),
            };
            self.bills.lock().unwrap().push(bill.clone());
            Ok(bill)
        }
    }
}
