use std::collections::HashMap;

use async_trait::async_trait;
use ledger_domain::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Result of the three independent aggregations in [`TransactionStore::stats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionStats {
    pub total_transactions: i64,
    pub by_status: HashMap<String, i64>,
    pub by_region: HashMap<String, i64>,
}

/// Abstract capability the HTTP handlers depend on. Tests substitute
/// [`crate::memory::InMemoryStore`] without touching handler code.
#[async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    /// Insert `tx` and return the row read back. Not retried at this layer.
    async fn create(&self, tx: &Transaction) -> Result<Transaction, StoreError>;

    /// Returns [`StoreError::NotFound`] if no row matches `id`.
    async fn get_by_id(&self, id: Uuid) -> Result<Transaction, StoreError>;

    /// Ordered by `timestamp` descending. Per-row scan failures are skipped
    /// (warn-logged) rather than failing the whole call.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, StoreError>;

    /// Returns [`StoreError::NotFound`] if zero rows were affected. Does not
    /// itself validate the forward-only transition — that is a caller
    /// responsibility (see `ledger_domain::TransactionStatus::can_transition_to`).
    async fn update_status(&self, id: Uuid, new_status: TransactionStatus) -> Result<(), StoreError>;

    async fn stats(&self) -> Result<TransactionStats, StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}
