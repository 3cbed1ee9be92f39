use std::path::Path;

use image_storage::{base_name, BucketError};
use tracing::{info, instrument};

use super::{renamed_suffix, ImageManager};
use crate::error::CliResult;

impl ImageManager {
    /// Uploads a local file as `name`, or under its own base name
    ///
    /// Asks before overwriting an image known to the label table or the bucket.
    ///
    /// # Errors
    ///
    /// Returns `CliError` on any failure other than a rejected upload
    #[instrument(skip(self))]
    pub async fn upload(&self, path: &Path, name: Option<&str>) -> CliResult<()> {
        let path_text = path.to_string_lossy();
        let file_name = base_name(&path_text);
        let Some(identifier) = self.image_name(name.unwrap_or(&path_text)) else {
            return Ok(());
        };

        if !path.is_file() {
            self.console.print(&format!(
                "Image '{identifier}' doesn't exist in specified path"
            ));
            return Ok(());
        }

        let exists = self.table.exists(identifier).await? || self.store.exists(identifier).await?;
        if exists
            && !self.console.confirm(&format!(
                "'{identifier}' already exists on s3, override? (y/N): "
            ))?
        {
            self.console
                .print(&format!("Cancelled upload of file '{identifier}' to s3"));
            return Ok(());
        }

        match self.store.upload(identifier, path).await {
            Ok(()) => {
                info!(identifier, overwrite = exists, "Uploaded image");
                self.console.print(&format!(
                    "Image '{file_name}' successfully uploaded{}",
                    renamed_suffix(name.map(|_| identifier))
                ));
                Ok(())
            }
            Err(BucketError::UploadRejected(reason)) => {
                info!(identifier, %reason, "Upload rejected");
                self.console
                    .print("Error uploading, unauthorized file type");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
