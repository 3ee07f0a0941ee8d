//! Typed REST surface of the backoffice backend
//!
//! One method per endpoint the dashboard core touches. The trait is the seam
//! the stores are tested against.

use async_trait::async_trait;

use shared::models::{
    Bill, BillCreate, Order, OrderDraft, OrderItem, OrderItemCreate, OrderUpdate, Table,
    TableCreate, TableUpdate,
};

use crate::error::ClientResult;
use crate::http::NetworkHttpClient;

/// Backend API consumed by the stores.
#[async_trait]
pub trait BackofficeApi: Send + Sync {
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    async fn get_order(&self, id: i64) -> ClientResult<Order>;
    async fn create_order(&self, draft: &OrderDraft) -> ClientResult<Order>;
    async fn update_order(&self, id: i64, update: &OrderUpdate) -> ClientResult<Order>;
    async fn delete_order(&self, id: i64) -> ClientResult<()>;

    async fn create_order_item(&self, item: &OrderItemCreate) -> ClientResult<OrderItem>;

    async fn list_tables(&self) -> ClientResult<Vec<Table>>;
    async fn get_table(&self, id: i64) -> ClientResult<Table>;
    async fn create_table(&self, create: &TableCreate) -> ClientResult<Table>;
    async fn update_table(&self, id: i64, update: &TableUpdate) -> ClientResult<Table>;
    async fn delete_table(&self, id: i64) -> ClientResult<()>;

    async fn list_bills(&self) -> ClientResult<Vec<Bill>>;
    async fn create_bill(&self, create: &BillCreate) -> ClientResult<Bill>;
}

/// REST implementation over `NetworkHttpClient`.
#[derive(Debug, Clone)]
pub struct RestApi {
    http: NetworkHttpClient,
}

impl RestApi {
    pub fn new(http: NetworkHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BackofficeApi for RestApi {
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.http.get("/orders").await
    }

    async fn get_order(&self, id: i64) -> ClientResult<Order> {
        self.http.get(&format!("/orders/{}", id)).await
    }

    async fn create_order(&self, draft: &OrderDraft) -> ClientResult<Order> {
        self.http.post("/orders", draft).await
    }

    async fn update_order(&self, id: i64, update: &OrderUpdate) -> ClientResult<Order> {
        self.http.put(&format!("/orders/{}", id), update).await
    }

    async fn delete_order(&self, id: i64) -> ClientResult<()> {
        self.http.delete(&format!("/orders/{}", id)).await
    }

    async fn create_order_item(&self, item: &OrderItemCreate) -> ClientResult<OrderItem> {
        self.http.post("/order-items", item).await
    }

    async fn list_tables(&self) -> ClientResult<Vec<Table>> {
        self.http.get("/tables").await
    }

    async fn get_table(&self, id: i64) -> ClientResult<Table> {
        self.http.get(&format!("/tables/{}", id)).await
    }

    async fn create_table(&self, create: &TableCreate) -> ClientResult<Table> {
        self.http.post("/tables", create).await
    }

    async fn update_table(&self, id: i64, update: &TableUpdate) -> ClientResult<Table> {
        self.http.put(&format!("/tables/{}", id), update).await
    }

    async fn delete_table(&self, id: i64) -> ClientResult<()> {
        self.http.delete(&format!("/tables/{}", id)).await
    }

    async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        self.http.get("/bills").await
    }

    async fn create_bill(&self, create: &BillCreate) -> ClientResult<Bill> {
        self.http.post("/bills", create).await
    }
}
