use async_trait::async_trait;
use ledger_domain::QueueMessage;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::QueueError;
use crate::queue::{Envelope, Queue};

/// In-memory test double for [`Queue`]. Messages are FIFO; `receive` removes
/// them from the visible queue and `delete` is a no-op (there is nothing
/// left to acknowledge) unless the caller never called `receive`.
#[derive(Default)]
pub struct InMemoryQueue {
    inner: Mutex<InMemoryQueueState>,
}

#[derive(Default)]
struct InMemoryQueueState {
    pending: Vec<QueueMessage>,
    in_flight: std::collections::HashMap<String, QueueMessage>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn publish(&self, message: &QueueMessage) -> Result<(), QueueError> {
        self.inner.lock().await.pending.push(message.clone());
        Ok(())
    }

    async fn receive(&self, max: i32, _wait_secs: i32) -> Result<Vec<Envelope>, QueueError> {
        let mut state = self.inner.lock().await;
        let max = max.clamp(1, 10) as usize;
        let take = max.min(state.pending.len());
        let drained: Vec<QueueMessage> = state.pending.drain(0..take).collect();

        let mut envelopes = Vec::with_capacity(drained.len());
        for message in drained {
            let receipt_handle = Uuid::new_v4().to_string();
            state.in_flight.insert(receipt_handle.clone(), message.clone());
            envelopes.push(Envelope { message, receipt_handle });
        }
        Ok(envelopes)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.inner.lock().await.in_flight.remove(receipt_handle);
        Ok(())
    }

    async fn health(&self) -> Result<(), QueueError> {
        Ok(())
    }
}

/// Test double that always fails, for exercising best-effort queue-publish
/// failure paths (spec.md §8.4 scenario 4).
#[derive(Default)]
pub struct FailingQueue;

#[async_trait]
impl Queue for FailingQueue {
    async fn publish(&self, _message: &QueueMessage) -> Result<(), QueueError> {
        Err(QueueError::Infra("simulated queue outage".into()))
    }

    async fn receive(&self, _max: i32, _wait_secs: i32) -> Result<Vec<Envelope>, QueueError> {
        Err(QueueError::Infra("simulated queue outage".into()))
    }

    async fn delete(&self, _receipt_handle: &str) -> Result<(), QueueError> {
        Err(QueueError::Infra("simulated queue outage".into()))
    }

    async fn health(&self) -> Result<(), QueueError> {
        Err(QueueError::Infra("simulated queue outage".into()))
    }
}
