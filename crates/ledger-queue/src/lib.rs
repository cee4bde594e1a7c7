pub mod error;
pub mod memory;
pub mod queue;
pub mod sqs;

pub use error::QueueError;
pub use memory::{FailingQueue, InMemoryQueue};
pub use queue::{Envelope, Queue};
pub use sqs::SqsQueue;
