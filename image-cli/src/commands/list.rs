use std::pin::pin;

use futures::StreamExt;
use image_storage::{pages, BucketError};
use tracing::debug;

use super::ImageManager;
use crate::error::CliResult;

/// Identifiers shown per page
pub const PAGE_SIZE: i32 = 10;

impl ImageManager {
    /// Prints the images page by page, asking before each further page
    ///
    /// # Errors
    ///
    /// Returns `CliError` if listing fails with anything but a status code, or the
    /// console fails
    pub async fn list(&self) -> CliResult<()> {
        let mut listing = pin!(pages(self.store.as_ref(), PAGE_SIZE));

        while let Some(page) = listing.next().await {
            let page = match page {
                Ok(page) => page,
                Err(BucketError::UnexpectedStatus(status)) => {
                    self.console
                        .print(&format!("Error, status code: {status}"));
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if page.number == 1 && page.identifiers.is_empty() && !page.has_more {
                self.console.print("No files currently exist in s3");
                return Ok(());
            }

            self.console.print(&format!("Page {}", page.number));
            for identifier in &page.identifiers {
                self.console.print(&format!("   {identifier}"));
            }

            if !page.has_more || !self.console.confirm("View next page? (y/N): ")? {
                break;
            }
            debug!(next_page = page.number + 1, "Fetching next page");
        }

        Ok(())
    }
}
