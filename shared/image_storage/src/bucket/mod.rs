//! S3 bucket operations for image storage

mod client;
mod error;

use std::path::Path;

use async_trait::async_trait;
use futures::Stream;
use tracing::warn;

use crate::key_layout::{KeyError, KeyLayout};

pub use client::S3ImageStore;
pub use error::{BucketError, BucketResult};

/// One raw page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Storage keys on this page, prefix included
    pub keys: Vec<String>,
    /// Cursor for the next page, absent on the last page
    pub next_continuation_token: Option<String>,
}

/// One page of image identifiers as shown to users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePage {
    /// Page number, starting at 1
    pub number: usize,
    /// Identifiers on this page, prefix stripped
    pub identifiers: Vec<String>,
    /// Whether the listing has another page
    pub has_more: bool,
}

/// Image bucket collaborator
///
/// All methods take identifiers; the store applies its key layout.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Key layout used by this store
    fn key_layout(&self) -> &KeyLayout;

    /// Lists one page of keys under the managed prefix
    async fn list_page(
        &self,
        page_size: i32,
        continuation_token: Option<String>,
    ) -> BucketResult<ListPage>;

    /// Checks whether an image exists
    async fn exists(&self, identifier: &str) -> BucketResult<bool>;

    /// Uploads a local file as `identifier`, overwriting any existing object
    async fn upload(&self, identifier: &str, source: &Path) -> BucketResult<()>;

    /// Downloads `identifier` into `destination`
    ///
    /// Nothing is written locally when the object does not exist.
    async fn download(&self, identifier: &str, destination: &Path) -> BucketResult<()>;
}

/// Lazily pages through the images in a store
///
/// Each item is fetched only when polled, so callers stop the listing simply by not
/// polling again. Restarting requires a new stream.
pub fn pages(
    store: &dyn ImageStore,
    page_size: i32,
) -> impl Stream<Item = BucketResult<ImagePage>> + Send + '_ {
    futures::stream::try_unfold(
        Some((None::<String>, 1_usize)),
        move |state| async move {
            let Some((continuation_token, number)) = state else {
                return Ok::<_, BucketError>(None);
            };

            let page = store.list_page(page_size, continuation_token).await?;
            let identifiers = page
                .keys
                .iter()
                .filter_map(|key| match store.key_layout().identifier(key) {
                    // Directory placeholders hold no image
                    Ok(identifier) if identifier.ends_with('/') => None,
                    Ok(identifier) => Some(identifier.to_string()),
                    Err(KeyError::InvalidIdentifier(_)) => None,
                    Err(e) => {
                        warn!(error = %e, "Skipping key outside the image layout");
                        None
                    }
                })
                .collect();

            let next = page
                .next_continuation_token
                .map(|token| (Some(token), number + 1));

            Ok(Some((
                ImagePage {
                    number,
                    identifiers,
                    has_more: next.is_some(),
                },
                next,
            )))
        },
    )
}
