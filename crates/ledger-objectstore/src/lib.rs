pub mod error;
pub mod memory;
pub mod s3;
pub mod store;

pub use error::ObjectStoreError;
pub use memory::{FailingObjectStore, InMemoryObjectStore};
pub use s3::S3ObjectStore;
pub use store::ObjectStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_health_on_memory_store() {
        let store = InMemoryObjectStore::new();
        store.write("transactions/us-east-1/abc.json", b"{}".to_vec()).await.unwrap();
        assert_eq!(store.get("transactions/us-east-1/abc.json").await, Some(b"{}".to_vec()));
        store.health().await.unwrap();
    }

    #[tokio::test]
    async fn write_timestamped_uses_prefix_and_json_suffix() {
        let store = InMemoryObjectStore::new();
        let key = store.write_timestamped("transactions/us-east-1", b"{}".to_vec()).await.unwrap();
        assert!(key.starts_with("transactions/us-east-1/"));
        assert!(key.ends_with(".json"));
    }
}
