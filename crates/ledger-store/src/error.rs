use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(String),
}
