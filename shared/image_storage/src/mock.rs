use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::bucket::{BucketError, BucketResult, ImageStore, ListPage};
use crate::key_layout::KeyLayout;
use crate::label_table::{LabelRecord, LabelTable, LabelTableResult};

/// Image store keeping objects in memory, keyed by storage key
///
/// Continuation tokens are the offset of the next key.
pub struct InMemoryImageStore {
    key_layout: KeyLayout,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    reject_uploads: bool,
    list_status: Option<u16>,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl InMemoryImageStore {
    /// Creates an empty store using the `images/` prefix
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(KeyLayout::new("images/".to_string()))
    }

    /// Creates an empty store with a custom layout
    #[must_use]
    pub fn with_layout(key_layout: KeyLayout) -> Self {
        Self {
            key_layout,
            objects: Mutex::new(BTreeMap::new()),
            reject_uploads: false,
            list_status: None,
            list_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Makes every upload fail with `BucketError::UploadRejected`
    #[must_use]
    pub fn rejecting_uploads(mut self) -> Self {
        self.reject_uploads = true;
        self
    }

    /// Makes every listing fail with the given status
    #[must_use]
    pub fn failing_list_with(mut self, status: u16) -> Self {
        self.list_status = Some(status);
        self
    }

    /// Inserts an object under a raw storage key
    pub fn insert_key(&self, key: &str, contents: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), contents.to_vec());
    }

    /// Inserts an image under the managed prefix
    pub fn insert(&self, identifier: &str, contents: &[u8]) {
        let key = format!("{}{identifier}", self.key_layout.prefix());
        self.insert_key(&key, contents);
    }

    /// Contents of an image, if present
    #[must_use]
    pub fn contents(&self, identifier: &str) -> Option<Vec<u8>> {
        let key = format!("{}{identifier}", self.key_layout.prefix());
        self.objects.lock().unwrap().get(&key).cloned()
    }

    /// Number of `list_page` calls
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `upload` calls
    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of `download` calls
    #[must_use]
    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    fn key_layout(&self) -> &KeyLayout {
        &self.key_layout
    }

    async fn list_page(
        &self,
        page_size: i32,
        continuation_token: Option<String>,
    ) -> BucketResult<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.list_status {
            return Err(BucketError::UnexpectedStatus(status));
        }

        let offset = continuation_token
            .map(|token| token.parse::<usize>())
            .transpose()
            .map_err(|e| BucketError::S3Error(format!("invalid continuation token: {e}")))?
            .unwrap_or(0);
        let page_size = usize::try_from(page_size).unwrap_or(0);

        let objects = self.objects.lock().unwrap();
        let matching: Vec<&String> = objects
            .keys()
            .filter(|key| key.starts_with(self.key_layout.prefix()))
            .collect();

        let keys = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|key| (*key).clone())
            .collect();
        let next = offset + page_size;

        Ok(ListPage {
            keys,
            next_continuation_token: (next < matching.len()).then(|| next.to_string()),
        })
    }

    async fn exists(&self, identifier: &str) -> BucketResult<bool> {
        let key = self.key_layout.storage_key(identifier)?;
        Ok(self.objects.lock().unwrap().contains_key(&key))
    }

    async fn upload(&self, identifier: &str, source: &Path) -> BucketResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let key = self.key_layout.storage_key(identifier)?;
        if self.reject_uploads {
            return Err(BucketError::UploadRejected("AccessDenied".to_string()));
        }

        let contents = tokio::fs::read(source).await?;
        self.objects.lock().unwrap().insert(key, contents);
        Ok(())
    }

    async fn download(&self, identifier: &str, destination: &Path) -> BucketResult<()> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let key = self.key_layout.storage_key(identifier)?;
        let contents = self
            .objects
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| BucketError::NotFound(identifier.to_string()))?;

        tokio::fs::write(destination, contents).await?;
        Ok(())
    }
}

/// Label table keeping rows in memory
#[derive(Default)]
pub struct InMemoryLabelTable {
    records: Mutex<BTreeMap<String, LabelRecord>>,
    put_calls: AtomicUsize,
}

impl InMemoryLabelTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row directly
    pub fn insert(&self, record: LabelRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.image.clone(), record);
    }

    /// All rows, ordered by identifier
    #[must_use]
    pub fn records(&self) -> Vec<LabelRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    /// Number of `put` calls, including overwrites
    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabelTable for InMemoryLabelTable {
    async fn put(&self, record: &LabelRecord) -> LabelTableResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.insert(record.clone());
        Ok(())
    }

    async fn get(&self, image: &str) -> LabelTableResult<Option<LabelRecord>> {
        Ok(self.records.lock().unwrap().get(image).cloned())
    }

    async fn exists(&self, image: &str) -> LabelTableResult<bool> {
        Ok(self.records.lock().unwrap().contains_key(image))
    }
}
