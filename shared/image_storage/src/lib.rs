//! Storage collaborators for the image labeler
//!
//! This crate provides the pieces shared between the label worker and the image CLI:
//! the S3 image bucket, the `DynamoDB` label results table, the key layout that maps
//! user-facing identifiers to storage keys, and environment driven configuration.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// S3 image bucket operations
pub mod bucket;
/// Environment and storage configuration
pub mod environment;
/// Mapping between image identifiers and storage keys
pub mod key_layout;
/// Label results table operations
pub mod label_table;

/// In-memory collaborators for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use bucket::{pages, BucketError, BucketResult, ImagePage, ImageStore, ListPage, S3ImageStore};
pub use environment::{Environment, StorageConfig};
pub use key_layout::{base_name, KeyError, KeyLayout};
pub use label_table::{
    BoundingBox, DetectedLabel, DynamoDbLabelTable, LabelInstance, LabelRecord, LabelTable,
    LabelTableError, LabelTableResult,
};
