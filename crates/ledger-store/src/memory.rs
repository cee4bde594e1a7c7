use std::collections::HashMap;

use async_trait::async_trait;
use ledger_domain::{Transaction, TransactionStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{TransactionStats, TransactionStore};

/// In-memory test double for [`TransactionStore`]. Mirrors Postgres ordering
/// and not-found semantics so handler tests exercise real behavior.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn create(&self, tx: &Transaction) -> Result<Transaction, StoreError> {
        let mut rows = self.rows.write().await;
        rows.push(tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Transaction, StoreError> {
        let rows = self.rows.read().await;
        rows.iter().find(|t| t.id == id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, StoreError> {
        let rows = self.rows.read().await;
        let mut sorted: Vec<Transaction> = rows.clone();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let offset = offset.max(0) as usize;
        let limit = limit.max(0) as usize;
        Ok(sorted.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_status(&self, id: Uuid, new_status: TransactionStatus) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let tx = rows.iter_mut().find(|t| t.id == id).ok_or(StoreError::NotFound)?;
        tx.status = new_status;
        Ok(())
    }

    async fn stats(&self) -> Result<TransactionStats, StoreError> {
        let rows = self.rows.read().await;
        let mut by_status: HashMap<String, i64> = HashMap::new();
        let mut by_region: HashMap<String, i64> = HashMap::new();
        for tx in rows.iter() {
            *by_status.entry(tx.status.to_string()).or_insert(0) += 1;
            *by_region.entry(tx.region.clone()).or_insert(0) += 1;
        }
        Ok(TransactionStats {
            total_transactions: rows.len() as i64,
            by_status,
            by_region,
        })
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Test double whose every operation fails, for exercising storage-failure
/// paths (spec.md §8.4 scenario 2) without a real unreachable database.
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl TransactionStore for FailingStore {
    async fn create(&self, _tx: &Transaction) -> Result<Transaction, StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Transaction, StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<Transaction>, StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }

    async fn update_status(&self, _id: Uuid, _new_status: TransactionStatus) -> Result<(), StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }

    async fn stats(&self) -> Result<TransactionStats, StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }

    async fn health(&self) -> Result<(), StoreError> {
        Err(StoreError::Storage("simulated connection failure".into()))
    }
}
