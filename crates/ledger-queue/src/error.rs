use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("queue infra failure: {0}")]
    Infra(String),
}
