//! Table store

use std::sync::Arc;

use parking_lot::RwLock;

use shared::models::{Table, TableCreate, TableStatus, TableUpdate};

use crate::api::BackofficeApi;
use crate::engine::TableEffect;
use crate::error::{ClientError, ClientResult};

/// Cache of backend tables, newest id first.
pub struct TableStore {
    api: Arc<dyn BackofficeApi>,
    snapshot: RwLock<Vec<Table>>,
}

impl TableStore {
    pub fn new(api: Arc<dyn BackofficeApi>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Last good snapshot, sorted by id descending.
    pub fn list(&self) -> Vec<Table> {
        self.snapshot.read().clone()
    }

    /// Look up a cached table by id.
    pub fn get(&self, table_id: i64) -> Option<Table> {
        self.snapshot.read().iter().find(|t| t.id == table_id).cloned()
    }

    /// Re-fetch from the backend and swap the snapshot. On failure the
    /// previous snapshot is retained.
    pub async fn refresh(&self) -> ClientResult<Vec<Table>> {
        match self.api.list_tables().await {
            Ok(mut tables) => {
                tables.sort_by(|a, b| b.id.cmp(&a.id));
                *self.snapshot.write() = tables.clone();
                Ok(tables)
            }
            Err(e) => {
                tracing::warn!(error = %e, "table refresh failed, keeping stale snapshot");
                Err(e)
            }
        }
    }

    /// Create a table administratively.
    pub async fn create(&self, create: &TableCreate) -> ClientResult<Table> {
        if create.capacity < 1 {
            return Err(ClientError::Validation(format!(
                "capacity must be positive, got {}",
                create.capacity
            )));
        }
        if create.number.trim().is_empty() {
            return Err(ClientError::Validation("table number required".into()));
        }
        let table = self.api.create_table(create).await?;
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "refresh after create failed");
        }
        Ok(table)
    }

    /// Persist a direct staff-driven status change.
    pub async fn set_status(&self, table_id: i64, status: TableStatus) -> ClientResult<Table> {
        let table = self
            .api
            .update_table(table_id, &TableUpdate::status(status))
            .await?;
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "refresh after set_status failed");
        }
        Ok(table)
    }

    /// Apply a computed side effect from the transition engine.
    ///
    /// Resolves the table first so a dangling reference surfaces as
    /// `MissingTable` rather than an opaque backend error.
    pub async fn apply_effect(&self, effect: &TableEffect) -> ClientResult<Table> {
        match self.api.get_table(effect.table_id).await {
            Ok(_) => {}
            Err(ClientError::NotFound(_)) => {
                return Err(ClientError::MissingTable(effect.table_id));
            }
            Err(e) => return Err(e),
        }
        self.set_status(effect.table_id, effect.new_status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::MockApi;

    #[tokio::test]
    async fn list_is_sorted_newest_id_first() {
        let api = Arc::new(MockApi::new());
        api.seed_table(2, TableStatus::Free);
        api.seed_table(9, TableStatus::Occupied);
        api.seed_table(4, TableStatus::Reserved);

        let store = TableStore::new(api);
        store.refresh().await.unwrap();

        let ids: Vec<i64> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 4, 2]);
    }

    #[tokio::test]
    async fn apply_effect_updates_the_table() {
        let api = Arc::new(MockApi::new());
        api.seed_table(5, TableStatus::Occupied);

        let store = TableStore::new(api);
        let effect = TableEffect {
            table_id: 5,
            new_status: TableStatus::Free,
        };
        let table = store.apply_effect(&effect).await.unwrap();
        assert_eq!(table.status, TableStatus::Free);
        assert_eq!(store.get(5).unwrap().status, TableStatus::Free);
    }

    #[tokio::test]
    async fn apply_effect_reports_missing_table() {
        let api = Arc::new(MockApi::new());
        let store = TableStore::new(api);

        let effect = TableEffect {
            table_id: 42,
            new_status: TableStatus::Free,
        };
        assert!(matches!(
            store.apply_effect(&effect).await,
            Err(ClientError::MissingTable(42))
        ));
    }

    #[tokio::test]
    async fn create_validates_capacity_and_number() {
        let api = Arc::new(MockApi::new());
        let store = TableStore::new(api);

        let bad_capacity = TableCreate {
            number: "T1".into(),
            capacity: 0,
        };
        assert!(matches!(
            store.create(&bad_capacity).await,
            Err(ClientError::Validation(_))
        ));

        let bad_number = TableCreate {
            number: "  ".into(),
            capacity: 4,
        };
        assert!(matches!(
            store.create(&bad_number).await,
            Err(ClientError::Validation(_))
        ));
    }
}
