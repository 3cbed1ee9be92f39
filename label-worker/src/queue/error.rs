use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use aws_sdk_sqs::operation::delete_message::DeleteMessageError;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageError;
use thiserror::Error;

/// Result type for notification queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Failures talking to the notification queue
#[derive(Error, Debug)]
pub enum QueueError {
    /// Long poll for notifications failed
    #[error("Failed to poll notification queue: {}", DisplayErrorContext(.0))]
    Receive(#[from] SdkError<ReceiveMessageError>),

    /// Deleting a processed notification failed
    #[error("Failed to acknowledge notification: {}", DisplayErrorContext(.0))]
    Acknowledge(#[from] SdkError<DeleteMessageError>),

    /// Queue unusable for a reason outside the SDK
    #[error("Notification queue unavailable: {0}")]
    Unavailable(String),
}

impl QueueError {
    /// Whether SQS answered with a server error (5xx)
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        let status = match self {
            Self::Receive(e) => e.raw_response().map(|raw| raw.status().as_u16()),
            Self::Acknowledge(e) => e.raw_response().map(|raw| raw.status().as_u16()),
            Self::Unavailable(_) => None,
        };
        status.is_some_and(|status| status >= 500)
    }
}
