//! Error types for bucket operations

use aws_sdk_s3::{
    error::SdkError,
    operation::{
        get_object::GetObjectError, head_object::HeadObjectError,
        list_objects_v2::ListObjectsV2Error, put_object::PutObjectError,
    },
};
use thiserror::Error;

use crate::key_layout::KeyError;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors of image bucket operations
///
/// `NotFound`, `UploadRejected` and `UnexpectedStatus` are expected outcomes callers
/// report to users. The rest are failures.
#[derive(Error, Debug)]
pub enum BucketError {
    /// Object does not exist in the bucket
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The bucket refused the upload (e.g. a policy restricting file types)
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    /// Listing returned a non-success status
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// AWS SDK error
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Identifier or key does not fit the layout
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Local file error
    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Splits an SDK failure into server side (5xx), other service and transport errors
fn classify<E: std::fmt::Debug>(error: SdkError<E>) -> BucketError {
    match error {
        SdkError::ServiceError(err) if err.raw().status().as_u16() >= 500 => {
            BucketError::UpstreamError(format!("{:?}", err.err()))
        }
        SdkError::ServiceError(err) => BucketError::S3Error(format!("{:?}", err.err())),
        other => BucketError::AwsError(other.to_string()),
    }
}

impl From<SdkError<HeadObjectError>> for BucketError {
    fn from(error: SdkError<HeadObjectError>) -> Self {
        classify(error)
    }
}

impl From<SdkError<GetObjectError>> for BucketError {
    fn from(error: SdkError<GetObjectError>) -> Self {
        classify(error)
    }
}

impl From<SdkError<PutObjectError>> for BucketError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        classify(error)
    }
}

/// Any non-success listing answer is reported by its status code
impl From<SdkError<ListObjectsV2Error>> for BucketError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::UnexpectedStatus(err.raw().status().as_u16()),
            other => classify(other),
        }
    }
}
