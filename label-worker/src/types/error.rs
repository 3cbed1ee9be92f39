use image_storage::{KeyError, LabelTableError};
use thiserror::Error;

use crate::detection::DetectionError;
use crate::queue::QueueError;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that fail a worker invocation
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Message body is not an S3 notification
    #[error("Invalid notification message: {0}")]
    InvalidMessage(String),

    /// SQS message arrived without a body
    #[error("SQS message {0} has no body")]
    MissingBody(String),

    /// Object key does not fit the image layout
    #[error("Unexpected object key: {0}")]
    UnexpectedKey(#[from] KeyError),

    /// Label detection failed for a reason other than the image format
    #[error("Label detection failed: {0}")]
    Detection(#[from] DetectionError),

    /// Label results could not be stored
    #[error("Label table error: {0}")]
    LabelTable(#[from] LabelTableError),

    /// Queue polling failed
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}
