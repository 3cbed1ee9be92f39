//! The three operations of the tool
//!
//! Expected conditions (missing files, conflicts the user declines, rejected uploads,
//! unknown images) end with a printed message and `Ok(())`. Anything else is returned
//! as a `CliError`.

mod download;
mod list;
mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use image_storage::{base_name, ImageStore, LabelTable};

use crate::args::Operation;
use crate::console::Console;
use crate::error::CliResult;

pub use list::PAGE_SIZE;

/// Runs operations against the bucket and the label table
pub struct ImageManager {
    store: Arc<dyn ImageStore>,
    table: Arc<dyn LabelTable>,
    console: Arc<dyn Console>,
    download_dir: PathBuf,
}

impl ImageManager {
    /// Creates a manager downloading into `download_dir`
    #[must_use]
    pub fn new(
        store: Arc<dyn ImageStore>,
        table: Arc<dyn LabelTable>,
        console: Arc<dyn Console>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            table,
            console,
            download_dir,
        }
    }

    /// Runs one operation
    ///
    /// # Errors
    ///
    /// Returns `CliError` on unexpected bucket, table or console failures
    pub async fn run(&self, operation: Operation) -> CliResult<()> {
        match operation {
            Operation::List => self.list().await,
            Operation::Upload { path, name } => self.upload(&path, name.as_deref()).await,
            Operation::Download { key, name } => self.download(&key, name.as_deref()).await,
        }
    }

    /// Base name of `input`, or `None` after telling the user it is unusable
    fn image_name<'a>(&self, input: &'a str) -> Option<&'a str> {
        let name = base_name(input);
        if self.store.key_layout().storage_key(name).is_ok() {
            Some(name)
        } else {
            self.console.print(&format!("Invalid image name '{input}'"));
            None
        }
    }
}

/// ` as '<name>'` suffix for success messages
fn renamed_suffix(name: Option<&str>) -> String {
    name.map(|name| format!(" as '{name}'")).unwrap_or_default()
}
