//! SQS consumption for running the worker outside Lambda
//!
//! In Lambda the runtime owns polling and deletion. Poll mode does both itself: a message
//! is deleted only after it was processed, failed messages reappear after the visibility
//! timeout.

mod error;
mod poller;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use tracing::warn;

pub use error::{QueueError, QueueResult};
pub use poller::QueuePoller;

/// A received message with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Raw message body
    pub body: String,
    /// Receipt handle for acknowledging the message
    pub receipt_handle: String,
    /// Message ID
    pub message_id: String,
}

/// Configuration for queue operations
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// Maximum number of messages to retrieve per poll
    pub max_messages: i32,
    /// Visibility timeout for received messages (in seconds)
    pub visibility_timeout: i32,
    /// Wait time for long polling (in seconds)
    pub wait_time_seconds: i32,
}

impl QueueConfig {
    /// Poll settings matching the Lambda trigger: one message per batch
    #[must_use]
    pub const fn new(queue_url: String) -> Self {
        Self {
            queue_url,
            max_messages: 1,
            visibility_timeout: 60,
            wait_time_seconds: 20,
        }
    }
}

/// Source of notification messages
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receives the next batch, possibly empty
    async fn receive(&self) -> QueueResult<Vec<ReceivedMessage>>;

    /// Deletes a processed message
    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()>;
}

/// SQS queue carrying S3 notifications
pub struct SqsNotificationQueue {
    sqs_client: Arc<SqsClient>,
    config: QueueConfig,
}

impl SqsNotificationQueue {
    /// Creates a new notification queue
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    /// * `config` - Queue configuration including URL and poll parameters
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: QueueConfig) -> Self {
        Self { sqs_client, config }
    }
}

#[async_trait]
impl MessageQueue for SqsNotificationQueue {
    async fn receive(&self) -> QueueResult<Vec<ReceivedMessage>> {
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.max_messages)
            .visibility_timeout(self.config.visibility_timeout)
            .wait_time_seconds(self.config.wait_time_seconds)
            .send()
            .await?;

        let messages = result
            .messages()
            .iter()
            .filter_map(|msg| {
                let message_id = msg.message_id()?.to_string();
                let receipt_handle = msg.receipt_handle()?.to_string();
                let Some(body) = msg.body() else {
                    warn!(message_id = %message_id, "Skipping message without a body");
                    return None;
                };
                Some(ReceivedMessage {
                    body: body.to_string(),
                    receipt_handle,
                    message_id,
                })
            })
            .collect();

        Ok(messages)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;

        Ok(())
    }
}
