//! Command line tool for managing images in the bucket
//!
//! Lists, uploads and downloads images under the managed prefix. Uploads check both the
//! bucket and the label table for an existing image before overwriting it.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Command line arguments
pub mod args;
/// List, upload and download
pub mod commands;
/// Terminal prompts and output
pub mod console;
/// Error types
pub mod error;

/// Scripted console for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
