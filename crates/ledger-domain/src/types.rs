use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Forward-only lifecycle of a [`Transaction`].
///
/// Transitions: `Pending -> Completed`, `Pending -> Failed`. No transition
/// leaves `Completed` or `Failed`, and no status transitions to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(DomainError::validation(format!("unknown status '{other}'"))),
        }
    }
}

/// The primary persistent entity. See spec.md §3.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub region: String,
    pub amount: Decimal,
    pub from_account: String,
    pub to_account: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Caller-supplied fields for a new transaction, already validated.
pub struct NewTransaction {
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
}

impl Transaction {
    /// Construct a freshly-created transaction: server-assigned id, region,
    /// `pending` status, and current timestamp. See spec.md §4.6 step 2.
    pub fn new(new: NewTransaction, region: &str, now: DateTime<Utc>) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            region: region.to_string(),
            amount: new.amount,
            from_account: new.from_account,
            to_account: new.to_account,
            status: TransactionStatus::Pending,
            timestamp: now,
        }
    }
}

/// Validate the three required ingest fields. Returns the parsed, positive
/// amount on success. No side effects on failure — spec.md §8.1 invariant 6.
pub fn validate_new_transaction(
    from_account: &str,
    to_account: &str,
    amount: &str,
) -> Result<NewTransaction, DomainError> {
    if from_account.trim().is_empty() {
        return Err(DomainError::validation("from_account must not be empty"));
    }
    if to_account.trim().is_empty() {
        return Err(DomainError::validation("to_account must not be empty"));
    }
    let parsed = parse_positive_amount(amount)?;
    Ok(NewTransaction {
        from_account: from_account.to_string(),
        to_account: to_account.to_string(),
        amount: parsed,
    })
}

/// Parse a decimal amount string, rejecting anything empty, malformed, zero,
/// or negative. Never represents the value as a binary float at any point.
pub fn parse_positive_amount(raw: &str) -> Result<Decimal, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::validation("amount must not be empty"));
    }
    let value = Decimal::from_str(raw)
        .map_err(|_| DomainError::validation(format!("amount '{raw}' is not a valid decimal")))?;
    if value <= Decimal::ZERO {
        return Err(DomainError::validation("amount must be strictly positive"));
    }
    Ok(value.round_dp(2))
}

/// Append-only blob written to the object store. See spec.md §3.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub transaction_id: Uuid,
    pub region: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl AuditRecord {
    /// Object-store key: `transactions/<region>/<id>.json`, per spec.md §3.1.
    pub fn key(&self) -> String {
        format!("transactions/{}/{}.json", self.region, self.transaction_id)
    }
}

/// Queue message envelope. See spec.md §3.1 / §6.4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub transaction_id: Uuid,
    pub region: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}
