use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledger_domain::{Transaction, TransactionStatus};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{TransactionStats, TransactionStore};

// Idempotent — safe to run on every startup. See spec.md §6.2.
const MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id            UUID PRIMARY KEY,
    region        TEXT NOT NULL,
    amount        DECIMAL(19,2) NOT NULL,
    from_account  TEXT NOT NULL,
    to_account    TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'pending',
    timestamp     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Connection to the consensus SQL store, pooled per spec.md §4.2.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct Row {
    id: Uuid,
    region: String,
    amount: Decimal,
    from_account: String,
    to_account: String,
    status: String,
    timestamp: DateTime<Utc>,
}

impl Row {
    fn into_transaction(self) -> Result<Transaction, StoreError> {
        let status = TransactionStatus::from_str(&self.status)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Transaction {
            id: self.id,
            region: self.region,
            amount: self.amount,
            from_account: self.from_account,
            to_account: self.to_account,
            status,
            timestamp: self.timestamp,
        })
    }
}

const SELECT_COLUMNS: &str = "id, region, amount, from_account, to_account, status, timestamp";

impl PostgresStore {
    /// Open a pooled connection (max open 25, max idle 5, max lifetime 5m),
    /// ping it, and run the idempotent schema migration. Refuses to return
    /// if the ping fails — see spec.md §4.2.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(25)
            .min_connections(5)
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(300)))
            .connect(url)
            .await
            .map_err(|e| StoreError::Storage(format!("connect: {e}")))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Storage(format!("ping: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(MIGRATION)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("migration: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn create(&self, tx: &Transaction) -> Result<Transaction, StoreError> {
        let query = format!(
            "INSERT INTO transactions (id, region, amount, from_account, to_account, status, timestamp)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SELECT_COLUMNS}"
        );
        let row: Row = sqlx::query_as(&query)
            .bind(tx.id)
            .bind(&tx.region)
            .bind(tx.amount)
            .bind(&tx.from_account)
            .bind(&tx.to_account)
            .bind(tx.status.to_string())
            .bind(tx.timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        row.into_transaction()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Transaction, StoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM transactions WHERE id = $1");
        let row: Option<Row> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match row {
            Some(r) => r.into_transaction(),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, StoreError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY timestamp DESC LIMIT $1 OFFSET $2"
        );
        let rows: Vec<Row> = sqlx::query_as(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_transaction() {
                Ok(tx) => out.push(tx),
                Err(e) => warn!(error = %e, "skipping unscannable transaction row"),
            }
        }
        Ok(out)
    }

    async fn update_status(&self, id: Uuid, new_status: TransactionStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE transactions SET status = $1 WHERE id = $2")
            .bind(new_status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn stats(&self) -> Result<TransactionStats, StoreError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let by_status_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM transactions GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut by_status = std::collections::HashMap::new();
        for (status, count) in by_status_rows {
            match status {
                Some(s) => {
                    by_status.insert(s, count);
                }
                None => warn!("skipping unscannable by-status aggregation row"),
            }
        }

        let by_region_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT region, COUNT(*) FROM transactions GROUP BY region",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut by_region = std::collections::HashMap::new();
        for (region, count) in by_region_rows {
            match region {
                Some(r) => {
                    by_region.insert(r, count);
                }
                None => warn!("skipping unscannable by-region aggregation row"),
            }
        }

        Ok(TransactionStats { total_transactions: total.0, by_status, by_region })
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }
}
