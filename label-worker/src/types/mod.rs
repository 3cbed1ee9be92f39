/// Worker error types
pub mod error;

pub use error::{WorkerError, WorkerResult};
