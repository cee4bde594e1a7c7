use async_trait::async_trait;

use crate::error::ObjectStoreError;

/// Abstract capability the ingest pipeline depends on for the immutable
/// audit channel. See spec.md §4.3 / §9.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// PUT `body` at `key` with content-type `application/json`. No retry at
    /// this layer; idempotent by the caller's choice of key.
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError>;

    /// Convenience wrapper: key is
    /// `<prefix>/<UTC YYYY-MM-DDThh-mm-ss>-<monotonic-nanos>.json`.
    /// Returns the key written.
    async fn write_timestamped(&self, prefix: &str, body: Vec<u8>) -> Result<String, ObjectStoreError> {
        let key = timestamped_key(prefix);
        self.write(&key, body).await?;
        Ok(key)
    }

    async fn health(&self) -> Result<(), ObjectStoreError>;
}

/// `<prefix>/<YYYY-MM-DDThh-mm-ss>-<nanos>.json`, unique within the same
/// second via a monotonic nanosecond suffix. See spec.md §4.3 / §6.3.
pub(crate) fn timestamped_key(prefix: &str) -> String {
    let now = chrono::Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!(
        "{prefix}/{}-{nanos}.json",
        now.format("%Y-%m-%dT%H-%M-%S"),
    )
}
