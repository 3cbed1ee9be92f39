use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{MessageQueue, QueueResult, ReceivedMessage};
use crate::processor::LabelProcessor;
use crate::types::WorkerResult;

/// Long-polls a queue and feeds each message to the label processor
pub struct QueuePoller {
    queue: Arc<dyn MessageQueue>,
    processor: Arc<LabelProcessor>,
}

impl QueuePoller {
    /// Creates a new poller
    #[must_use]
    pub fn new(queue: Arc<dyn MessageQueue>, processor: Arc<LabelProcessor>) -> Self {
        Self { queue, processor }
    }

    /// Polls until `shutdown` is cancelled
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Queue` if receiving or acknowledging fails
    pub async fn run(&self, shutdown: CancellationToken) -> WorkerResult<()> {
        info!("Starting queue poller");

        loop {
            let messages = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                result = self.queue.receive() => result.inspect_err(|e| {
                    error!(error = %e, upstream = e.is_upstream_error(), "Failed to receive messages");
                })?,
            };

            for message in messages {
                self.handle(message).await?;
            }
        }

        info!("Queue poller stopped");
        Ok(())
    }

    /// Processes one message, acknowledging it only on success
    ///
    /// A failed message stays on the queue and is redelivered after its visibility timeout.
    /// Returns whether the message was acknowledged.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the acknowledgment fails
    pub async fn handle(&self, message: ReceivedMessage) -> QueueResult<bool> {
        match self.processor.process_body(&message.body).await {
            Ok(records) => {
                self.queue.acknowledge(&message.receipt_handle).await?;
                info!(
                    message_id = %message.message_id,
                    record_count = records.len(),
                    "Processed message"
                );
                Ok(true)
            }
            Err(e) => {
                error!(
                    message_id = %message.message_id,
                    error = %e,
                    "Failed to process message, leaving it for redelivery"
                );
                Ok(false)
            }
        }
    }
}
