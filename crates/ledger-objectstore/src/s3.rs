use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{info, warn};

use crate::error::ObjectStoreError;
use crate::store::ObjectStore;

/// Audit-blob channel backed by an S3-compatible object store.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Connect, then ensure `bucket` exists per spec.md §4.3:
    /// HEAD → if present, done; else CREATE; if CREATE errors, HEAD again —
    /// if the bucket now exists (race under concurrent bootstraps), treat as
    /// success, otherwise propagate the CREATE error.
    pub async fn connect(
        endpoint: Option<&str>,
        region: &str,
        bucket: &str,
    ) -> Result<Self, ObjectStoreError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if endpoint.is_some() {
            // S3-compatible stores (e.g. MinIO) need path-style addressing.
            s3_config_builder = s3_config_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_config_builder.build());

        let store = Self { client, bucket: bucket.to_string() };
        store.ensure_bucket().await?;
        Ok(store)
    }

    async fn ensure_bucket(&self) -> Result<(), ObjectStoreError> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        if let Err(create_err) = self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
                info!(bucket = %self.bucket, "bucket now exists (concurrent bootstrap race)");
                return Ok(());
            }
            return Err(ObjectStoreError::Bootstrap(create_err.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, key, "object store write failed");
                ObjectStoreError::Infra(e.to_string())
            })?;
        Ok(())
    }

    async fn health(&self) -> Result<(), ObjectStoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Infra(e.to_string()))?;
        Ok(())
    }
}
