use image_storage::{BucketError, LabelTableError};
use thiserror::Error;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// Failures a command does not turn into a message
#[derive(Error, Debug)]
pub enum CliError {
    /// Bucket operation failed
    #[error(transparent)]
    Bucket(#[from] BucketError),

    /// Label table lookup failed
    #[error(transparent)]
    LabelTable(#[from] LabelTableError),

    /// Terminal could not be read or written
    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),
}
