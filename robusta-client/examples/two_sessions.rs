//! Two dashboard sessions sharing one backend and one sync hub.
//!
//! Session A walks an order through its whole lifecycle; session B only
//! listens, and its dispatcher keeps B's stores current. Run with
//! `cargo run --example two_sessions`.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use robusta_client::sync::MemoryHub;
use robusta_client::{
    BackofficeApi, BackofficeSession, ChannelConfig, ClientError, ClientResult, Dispatcher,
    LogNotifier, SyncChannel,
};
use shared::models::{
    Bill, BillCreate, Order, OrderDraft, OrderItem, OrderItemCreate, OrderStatus, OrderUpdate,
    Table, TableCreate, TableStatus, TableUpdate,
};

/// Just enough backend for the demo: one order, one table.
struct DemoBackend {
    order: Mutex<Order>,
    table: Mutex<Table>,
}

impl DemoBackend {
    fn new() -> Self {
        Self {
            order: Mutex::new(Order {
                id: 1,
                table_id: Some(5),
                table_number: Some("T5".into()),
                employee_id: Some(1),
                promotion_id: None,
                total_amount: 8.5,
                status: OrderStatus::Pending,
                notes: Some("oat milk".into()),
                created_at: Utc::now(),
                order_items: vec![],
            }),
            table: Mutex::new(Table {
                id: 5,
                number: "T5".into(),
                capacity: 4,
                status: TableStatus::Occupied,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
        }
    }
}

#[async_trait]
impl BackofficeApi for DemoBackend {
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        Ok(vec![self.order.lock().unwrap().clone()])
    }

    async fn get_order(&self, id: i64) -> ClientResult<Order> {
        let order = self.order.lock().unwrap();
        if order.id == id {
            Ok(order.clone())
        } else {
            Err(ClientError::NotFound(format!("order {}", id)))
        }
    }

    async fn create_order(&self, _draft: &OrderDraft) -> ClientResult<Order> {
        Err(ClientError::Backend("demo backend is read-mostly".into()))
    }

    async fn update_order(&self, id: i64, update: &OrderUpdate) -> ClientResult<Order> {
        let mut order = self.order.lock().unwrap();
        if order.id != id {
            return Err(ClientError::NotFound(format!("order {}", id)));
        }
        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(total) = update.total_amount {
            order.total_amount = total;
        }
        Ok(order.clone())
    }

    async fn delete_order(&self, _id: i64) -> ClientResult<()> {
        Err(ClientError::Backend("demo backend is read-mostly".into()))
    }

    async fn create_order_item(&self, _item: &OrderItemCreate) -> ClientResult<OrderItem> {
        Err(ClientError::Backend("demo backend is read-mostly".into()))
    }

    async fn list_tables(&self) -> ClientResult<Vec<Table>> {
        Ok(vec![self.table.lock().unwrap().clone()])
    }

    async fn get_table(&self, id: i64) -> ClientResult<Table> {
        let table = self.table.lock().unwrap();
        if table.id == id {
            Ok(table.clone())
        } else {
            Err(ClientError::NotFound(format!("table {}", id)))
        }
    }

    async fn create_table(&self, _create: &TableCreate) -> ClientResult<Table> {
        Err(ClientError::Backend("demo backend is read-mostly".into()))
    }

    async fn update_table(&self, id: i64, update: &TableUpdate) -> ClientResult<Table> {
        let mut table = self.table.lock().unwrap();
        if table.id != id {
            return Err(ClientError::NotFound(format!("table {}", id)));
        }
        if let Some(status) = update.status {
            table.status = status;
        }
        table.updated_at = Utc::now();
        Ok(table.clone())
    }

    async fn delete_table(&self, _id: i64) -> ClientResult<()> {
        Err(ClientError::Backend("demo backend is read-mostly".into()))
    }

    async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        Ok(vec![])
    }

    async fn create_bill(&self, create: &BillCreate) -> ClientResult<Bill> {
        Ok(Bill {
            id: 1,
            order_id: create.order_id,
            total_amount: create.total_amount,
            payment_method: create.payment_method.clone(),
            created_at: Utc::now(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let backend = Arc::new(DemoBackend::new());
    let hub = MemoryHub::new(64);

    let a = BackofficeSession::new(
        backend.clone(),
        SyncChannel::memory(&hub, ChannelConfig::default()),
        Arc::new(LogNotifier),
    );
    let b = BackofficeSession::new(
        backend,
        SyncChannel::memory(&hub, ChannelConfig::default()),
        Arc::new(LogNotifier),
    );
    let _dispatcher = Dispatcher::spawn(b.clone());
    a.resync().await;

    for target in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Served,
        OrderStatus::Paid,
    ] {
        let update = a.update_status(1, target).await?;
        tracing::info!(
            order_id = update.order_id,
            status = %update.new_status,
            effect = ?update.applied_effect,
            "session A committed"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        let seen = b.orders().get(1).map(|o| o.status);
        tracing::info!(status = ?seen, "session B sees");
    }

    let bill = a.create_bill(1, "CARD").await?;
    tracing::info!(bill_id = bill.id, amount = bill.total_amount, "billed");

    assert_eq!(b.tables().get(5).map(|t| t.status), Some(TableStatus::Free));
    tracing::info!("table 5 freed on both sessions");
    Ok(())
}
