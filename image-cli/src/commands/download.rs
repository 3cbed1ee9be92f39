use image_storage::BucketError;
use tracing::{info, instrument};

use super::{renamed_suffix, ImageManager};
use crate::error::CliResult;

impl ImageManager {
    /// Downloads an image into the download directory
    ///
    /// Leading path components of `key` are ignored. The local file is named `name`
    /// when given, otherwise after the image.
    ///
    /// # Errors
    ///
    /// Returns `CliError` on any failure other than a missing image
    #[instrument(skip(self))]
    pub async fn download(&self, key: &str, name: Option<&str>) -> CliResult<()> {
        let Some(identifier) = self.image_name(key) else {
            return Ok(());
        };
        let Some(file_name) = self.image_name(name.unwrap_or(identifier)) else {
            return Ok(());
        };
        let destination = self.download_dir.join(file_name);

        if destination.is_file()
            && !self.console.confirm(&format!(
                "'{file_name}' already exists in cwd, override? (y/N): "
            ))?
        {
            self.console
                .print(&format!("Cancelled download of file '{file_name}'"));
            return Ok(());
        }

        match self.store.download(identifier, &destination).await {
            Ok(()) => {
                info!(identifier, destination = %destination.display(), "Downloaded image");
                self.console.print(&format!(
                    "Image '{identifier}' successfully downloaded{}",
                    renamed_suffix(name.map(|_| file_name))
                ));
                Ok(())
            }
            Err(BucketError::NotFound(_)) => {
                self.console
                    .print(&format!("Image '{identifier}' doesn't exist in s3"));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
