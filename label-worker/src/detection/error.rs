use thiserror::Error;

/// Result type for label detection
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Failure kinds of a label detection call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// The object is not an image format the service accepts
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    /// Upstream service error (5xx)
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Any other service or transport failure
    #[error("Detection service error: {0}")]
    Service(String),

    /// Response could not be converted into labels
    #[error("Malformed detection response: {0}")]
    MalformedResponse(String),
}
