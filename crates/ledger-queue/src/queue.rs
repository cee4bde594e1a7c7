use async_trait::async_trait;
use ledger_domain::QueueMessage;

use crate::error::QueueError;

/// A received message paired with its revocable receipt handle. Ownership
/// transfers back to the queue on visibility-timeout expiry, or explicitly
/// on [`Queue::delete`]. See spec.md §3.2 / GLOSSARY.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub message: QueueMessage,
    pub receipt_handle: String,
}

/// Abstract capability the ingest pipeline and consumer loop depend on.
/// See spec.md §4.4 / §9.
#[async_trait]
pub trait Queue: Send + Sync + 'static {
    /// JSON-encode `message` and publish it with `Region`/`Action` header
    /// attributes for coarse filtering.
    async fn publish(&self, message: &QueueMessage) -> Result<(), QueueError>;

    /// Receive up to `max` messages (capped at 10), waiting up to `wait_secs`.
    /// Messages whose body fails to decode are dropped (warn-logged) and
    /// excluded from the returned batch — neither returned nor deleted.
    async fn receive(&self, max: i32, wait_secs: i32) -> Result<Vec<Envelope>, QueueError>;

    /// Delete by receipt handle. The caller must tolerate failure: a
    /// not-yet-deleted message will be redelivered.
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError>;

    async fn health(&self) -> Result<(), QueueError>;
}
