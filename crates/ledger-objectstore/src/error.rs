use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object store bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("object store infra failure: {0}")]
    Infra(String),
}
