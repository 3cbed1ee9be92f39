//! Image label worker
//!
//! Consumes S3 "object created" notifications delivered through SQS, detects labels on
//! each referenced image and records them in the label results table. Runs either as an
//! AWS Lambda function or, for local development, as a long-polling queue consumer.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Command line and environment configuration
pub mod config;
/// Label detection on stored images
pub mod detection;
/// Lambda entrypoint
pub mod handler;
/// S3 event notifications carried in SQS messages
pub mod notification;
/// Per-notification processing
pub mod processor;
/// Queue polling for local runs
pub mod queue;
/// Shared worker types
pub mod types;

/// Scripted collaborators for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
