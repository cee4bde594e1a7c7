use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;
use ledger_domain::QueueMessage;
use tracing::warn;

use crate::error::QueueError;
use crate::queue::{Envelope, Queue};

const VISIBILITY_TIMEOUT_SECS: &str = "30";
const RETENTION_SECS: &str = "1209600"; // 14 days
const RECEIVE_WAIT_SECS: &str = "0"; // short polling

/// Work queue backed by an SQS-compatible API.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Look up `name`'s URL; if not found, create it with the attributes
    /// from spec.md §4.4. Any create failure is fatal.
    pub async fn connect(endpoint: Option<&str>, region: &str, name: &str) -> Result<Self, QueueError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;
        let client = Client::new(&shared_config);

        let queue_url = match client.get_queue_url().queue_name(name).send().await {
            Ok(resp) => resp.queue_url().unwrap_or_default().to_string(),
            Err(_) => {
                let attributes = HashMap::from([
                    (
                        aws_sdk_sqs::types::QueueAttributeName::VisibilityTimeout,
                        VISIBILITY_TIMEOUT_SECS.to_string(),
                    ),
                    (
                        aws_sdk_sqs::types::QueueAttributeName::MessageRetentionPeriod,
                        RETENTION_SECS.to_string(),
                    ),
                    (
                        aws_sdk_sqs::types::QueueAttributeName::ReceiveMessageWaitTimeSeconds,
                        RECEIVE_WAIT_SECS.to_string(),
                    ),
                ]);
                client
                    .create_queue()
                    .queue_name(name)
                    .set_attributes(Some(attributes))
                    .send()
                    .await
                    .map_err(|e| QueueError::Bootstrap(e.to_string()))?
                    .queue_url()
                    .unwrap_or_default()
                    .to_string()
            }
        };

        Ok(Self { client, queue_url })
    }
}

#[async_trait]
impl Queue for SqsQueue {
    async fn publish(&self, message: &QueueMessage) -> Result<(), QueueError> {
        let body = serde_json::to_string(message)
            .map_err(|e| QueueError::Infra(format!("encode message: {e}")))?;

        let attributes = HashMap::from([
            (
                "Region".to_string(),
                MessageAttributeValue::builder()
                    .data_type("String")
                    .string_value(message.region.clone())
                    .build()
                    .map_err(|e| QueueError::Infra(e.to_string()))?,
            ),
            (
                "Action".to_string(),
                MessageAttributeValue::builder()
                    .data_type("String")
                    .string_value(message.action.clone())
                    .build()
                    .map_err(|e| QueueError::Infra(e.to_string()))?,
            ),
        ]);

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| QueueError::Infra(e.to_string()))?;
        Ok(())
    }

    async fn receive(&self, max: i32, wait_secs: i32) -> Result<Vec<Envelope>, QueueError> {
        let max = max.clamp(1, 10);
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max)
            .wait_time_seconds(wait_secs)
            .send()
            .await
            .map_err(|e| QueueError::Infra(e.to_string()))?;

        let mut envelopes = Vec::new();
        for raw in response.messages.unwrap_or_default() {
            let (Some(body), Some(receipt_handle)) = (raw.body(), raw.receipt_handle()) else {
                warn!("skipping queue message missing body or receipt handle");
                continue;
            };
            match serde_json::from_str::<QueueMessage>(body) {
                Ok(message) => envelopes.push(Envelope {
                    message,
                    receipt_handle: receipt_handle.to_string(),
                }),
                Err(e) => {
                    warn!(error = %e, "dropping queue message with undecodable body");
                }
            }
        }
        Ok(envelopes)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Infra(e.to_string()))?;
        Ok(())
    }

    async fn health(&self) -> Result<(), QueueError> {
        self.client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .send()
            .await
            .map_err(|e| QueueError::Infra(e.to_string()))?;
        Ok(())
    }
}
