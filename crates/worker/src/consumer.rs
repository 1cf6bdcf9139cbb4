//! Generic queue poll loop.
//!
//! Drives a [`MessageConsumer`] against one queue until cancelled.
//! Acknowledgement policy:
//!
//! - success -- delete the message.
//! - [`CoreError::Malformed`] -- log and delete; a body that cannot be
//!   parsed will never parse on redelivery.
//! - any other error -- log and leave unacknowledged; the queue's
//!   visibility timeout redelivers it and its redrive policy
//!   eventually dead-letters persistent failures.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use skylark_core::error::CoreError;
use skylark_core::store::MessageQueue;
use skylark_pipeline::MessageConsumer;

/// Max messages pulled per poll.
const RECEIVE_BATCH: usize = 10;

/// Poll `queue` until `cancel` fires, handing each message to `consumer`.
pub async fn run_consumer(
    name: &'static str,
    queue: Arc<dyn MessageQueue>,
    consumer: Arc<dyn MessageConsumer>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(consumer = name, "Consumer loop started");

    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(consumer = name, "Consumer loop stopping");
                break;
            }
            batch = queue.receive(RECEIVE_BATCH) => batch,
        };

        let messages = match batch {
            Ok(messages) => messages,
            Err(err) => {
                tracing::error!(consumer = name, error = %err, "Receive failed");
                tokio::time::sleep(poll_interval).await;
                continue;
            }
        };

        if messages.is_empty() {
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        for message in messages {
            match consumer.process(&message.body).await {
                Ok(()) => {
                    if let Err(err) = queue.delete(&message.receipt).await {
                        tracing::error!(consumer = name, error = %err, "Acknowledge failed");
                    }
                }
                Err(CoreError::Malformed(reason)) => {
                    tracing::warn!(
                        consumer = name,
                        reason = %reason,
                        "Dropping malformed message"
                    );
                    if let Err(err) = queue.delete(&message.receipt).await {
                        tracing::error!(consumer = name, error = %err, "Acknowledge failed");
                    }
                }
                Err(err) => {
                    tracing::error!(
                        consumer = name,
                        error = %err,
                        "Processing failed, leaving message for redelivery"
                    );
                }
            }
        }
    }
}
