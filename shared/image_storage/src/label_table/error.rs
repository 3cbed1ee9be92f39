//! Error types for label table operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError};
use thiserror::Error;

/// Result type for label table operations
pub type LabelTableResult<T> = Result<T, LabelTableError>;

/// Errors that can occur during label table operations
#[derive(Error, Debug)]
pub enum LabelTableError {
    /// Failed to put a label record into Dynamo DB
    #[error("Failed to put label record into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get a label record from Dynamo DB
    #[error("Failed to get label record from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Stored item does not have the expected shape
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
