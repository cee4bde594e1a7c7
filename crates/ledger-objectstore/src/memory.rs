use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ObjectStoreError;
use crate::store::ObjectStore;

/// In-memory test double for [`ObjectStore`].
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<std::collections::HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn health(&self) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}

/// Test double that always fails, for exercising best-effort audit-write
/// failure paths (spec.md §8.4 scenario 3).
#[derive(Default)]
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn write(&self, _key: &str, _body: Vec<u8>) -> Result<(), ObjectStoreError> {
        Err(ObjectStoreError::Infra("simulated object store outage".into()))
    }

    async fn health(&self) -> Result<(), ObjectStoreError> {
        Err(ObjectStoreError::Infra("simulated object store outage".into()))
    }
}
