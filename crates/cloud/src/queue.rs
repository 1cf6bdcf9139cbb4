//! SQS-backed message queue.
//!
//! Standard queues give at-least-once delivery: an unacknowledged
//! message reappears after its visibility timeout, and the broker's
//! redrive policy handles persistent poison messages.

use async_trait::async_trait;

use skylark_core::error::CoreError;
use skylark_core::store::{MessageQueue, QueueMessage};

/// SQS long-poll wait. Keeps idle consumers cheap without adding
/// meaningful dispatch latency.
const WAIT_TIME_SECONDS: i32 = 10;

/// SQS caps a single receive at 10 messages.
const MAX_RECEIVE_BATCH: usize = 10;

/// Message queue backed by one SQS queue URL.
#[derive(Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        SqsQueue {
            client,
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn send(&self, body: &str) -> Result<(), CoreError> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|err| CoreError::Queue(err.to_string()))?;
        Ok(())
    }

    async fn receive(&self, max: usize) -> Result<Vec<QueueMessage>, CoreError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max.clamp(1, MAX_RECEIVE_BATCH) as i32)
            .wait_time_seconds(WAIT_TIME_SECONDS)
            .send()
            .await
            .map_err(|err| CoreError::Queue(err.to_string()))?;

        let messages = output
            .messages()
            .iter()
            .filter_map(|msg| {
                let body = msg.body()?.to_string();
                let receipt = msg.receipt_handle()?.to_string();
                Some(QueueMessage { body, receipt })
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, receipt: &str) -> Result<(), CoreError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt)
            .send()
            .await
            .map_err(|err| CoreError::Queue(err.to_string()))?;
        Ok(())
    }
}
