//! S3 image store implementation

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::{get_object::GetObjectError, head_object::HeadObjectError},
    primitives::ByteStream,
    types::RequestPayer,
    Client as S3Client,
};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, error, info};

use super::{BucketError, BucketResult, ImageStore, ListPage};
use crate::key_layout::KeyLayout;

/// S3 backed image store
pub struct S3ImageStore {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    key_layout: KeyLayout,
}

impl S3ImageStore {
    /// Creates a new image store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket holding the images
    /// * `key_layout` - Prefix layout of managed keys
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, key_layout: KeyLayout) -> Self {
        Self {
            s3_client,
            bucket_name,
            key_layout,
        }
    }

    /// Content type sent with uploads, derived from the file extension
    #[must_use]
    pub fn content_type_for(path: &Path) -> mime::Mime {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
            Some("png") => mime::IMAGE_PNG,
            Some("gif") => mime::IMAGE_GIF,
            Some("bmp") => mime::IMAGE_BMP,
            Some("svg") => mime::IMAGE_SVG,
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    fn key_layout(&self) -> &KeyLayout {
        &self.key_layout
    }

    async fn list_page(
        &self,
        page_size: i32,
        continuation_token: Option<String>,
    ) -> BucketResult<ListPage> {
        debug!(
            "Listing bucket {} page_size={} continued={}",
            self.bucket_name,
            page_size,
            continuation_token.is_some()
        );

        let response = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(self.key_layout.prefix())
            .max_keys(page_size)
            .set_continuation_token(continuation_token)
            .request_payer(RequestPayer::Requester)
            .send()
            .await?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(ToString::to_string))
            .collect();

        Ok(ListPage {
            keys,
            next_continuation_token: response.next_continuation_token().map(ToString::to_string),
        })
    }

    async fn exists(&self, identifier: &str) -> BucketResult<bool> {
        let s3_key = self.key_layout.storage_key(identifier)?;

        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(&s3_key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_))
                    || head_status_means_absent(service_err.raw().status().as_u16()) =>
            {
                debug!(
                    "Object {} treated as absent, status {}",
                    s3_key,
                    service_err.raw().status().as_u16()
                );
                Ok(false)
            }
            Err(e) => Err(BucketError::from(e)),
        }
    }

    async fn upload(&self, identifier: &str, source: &Path) -> BucketResult<()> {
        let s3_key = self.key_layout.storage_key(identifier)?;
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| BucketError::Io(std::io::Error::other(e)))?;

        let result = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&s3_key)
            .content_type(Self::content_type_for(source).as_ref())
            .body(body)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!("Uploaded {} to s3://{}/{}", source.display(), self.bucket_name, s3_key);
                Ok(())
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() >= 500 =>
            {
                error!("Upstream error uploading {}: {:?}", s3_key, service_err.err());
                Err(BucketError::UpstreamError(format!("{service_err:?}")))
            }
            Err(SdkError::ServiceError(service_err)) => {
                let reason = service_err
                    .err()
                    .message()
                    .or_else(|| service_err.err().code())
                    .unwrap_or("rejected by bucket")
                    .to_string();
                error!("Upload of {} rejected: {}", s3_key, reason);
                Err(BucketError::UploadRejected(reason))
            }
            Err(e) => Err(BucketError::from(e)),
        }
    }

    async fn download(&self, identifier: &str, destination: &Path) -> BucketResult<()> {
        let s3_key = self.key_layout.storage_key(identifier)?;

        let result = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&s3_key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), GetObjectError::NoSuchKey(_))
                    || service_err.err().code() == Some("404")
                    || service_err.raw().status().as_u16() == 404 =>
            {
                debug!("Object does not exist: {}", s3_key);
                return Err(BucketError::NotFound(identifier.to_string()));
            }
            Err(e) => return Err(BucketError::from(e)),
        };

        let mut reader = std::pin::pin!(output.body.into_async_read());
        write_atomically(&mut reader, destination).await?;

        info!(
            "Downloaded s3://{}/{} to {}",
            self.bucket_name,
            s3_key,
            destination.display()
        );
        Ok(())
    }
}

/// Whether a failed HeadObject status means the object is absent
///
/// S3 answers a missing key with 403 instead of 404 when the caller may not list the
/// bucket.
const fn head_status_means_absent(status: u16) -> bool {
    matches!(status, 403 | 404)
}

/// Writes `reader` to `destination` through a temporary file in the same directory
///
/// The destination is only replaced once every byte is written. The temporary file is
/// removed on any failure.
async fn write_atomically<R>(reader: &mut R, destination: &Path) -> std::io::Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let partial = tempfile::Builder::new()
        .prefix(".download-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let mut file = tokio::fs::File::from_std(partial.as_file().try_clone()?);
    tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    drop(file);

    partial.persist(destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_head_status_means_absent() {
        assert!(head_status_means_absent(404));
        assert!(head_status_means_absent(403));

        assert!(!head_status_means_absent(400));
        assert!(!head_status_means_absent(500));
        assert!(!head_status_means_absent(503));
    }

    #[tokio::test]
    async fn test_write_atomically_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("cat.png");
        std::fs::write(&destination, b"old").unwrap();

        let mut reader: &[u8] = b"new contents";
        write_atomically(&mut reader, &destination).await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"new contents");
        assert_eq!(dir_entries(dir.path()), vec!["cat.png".to_string()]);
    }

    #[tokio::test]
    async fn test_write_atomically_cleans_up_when_destination_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("taken");
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("keep.png"), b"keep").unwrap();

        let mut reader: &[u8] = b"bytes";
        assert!(write_atomically(&mut reader, &destination).await.is_err());

        assert_eq!(dir_entries(dir.path()), vec!["taken".to_string()]);
        assert_eq!(dir_entries(&destination), vec!["keep.png".to_string()]);
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(
            S3ImageStore::content_type_for(Path::new("cat.JPG")),
            mime::IMAGE_JPEG
        );
        assert_eq!(
            S3ImageStore::content_type_for(Path::new("dir/cat.png")),
            mime::IMAGE_PNG
        );
    }

    #[test]
    fn test_content_type_for_unknown_extension() {
        assert_eq!(
            S3ImageStore::content_type_for(Path::new("notes.txt")),
            mime::APPLICATION_OCTET_STREAM
        );
        assert_eq!(
            S3ImageStore::content_type_for(Path::new("README")),
            mime::APPLICATION_OCTET_STREAM
        );
    }
}
