//! Turns notification records into label result rows

use std::sync::Arc;

use image_storage::{KeyLayout, LabelRecord, LabelTable};
use tracing::{info, instrument, warn};

use crate::detection::{DetectionError, LabelDetector};
use crate::notification::{NotificationMessage, NotificationRecord};
use crate::types::WorkerResult;

/// Label limit requested from the detection service
pub const DEFAULT_MAX_LABELS: i32 = 5;

/// Detects labels for notified images and stores them
pub struct LabelProcessor {
    detector: Arc<dyn LabelDetector>,
    table: Arc<dyn LabelTable>,
    key_layout: KeyLayout,
    max_labels: i32,
}

impl LabelProcessor {
    /// Creates a processor requesting `DEFAULT_MAX_LABELS` labels per image
    #[must_use]
    pub fn new(
        detector: Arc<dyn LabelDetector>,
        table: Arc<dyn LabelTable>,
        key_layout: KeyLayout,
    ) -> Self {
        Self {
            detector,
            table,
            key_layout,
            max_labels: DEFAULT_MAX_LABELS,
        }
    }

    /// Overrides the label limit
    #[must_use]
    pub fn with_max_labels(mut self, max_labels: i32) -> Self {
        self.max_labels = max_labels;
        self
    }

    /// Processes every record of one SQS message body, in order
    ///
    /// Stops at the first failing record; records before it stay written.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError` if the body is not a notification or any record fails
    pub async fn process_body(&self, body: &str) -> WorkerResult<Vec<LabelRecord>> {
        let message = NotificationMessage::from_body(body)?;
        if message.is_test_event() {
            info!("Ignoring S3 test event");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(message.records().len());
        for record in message.records() {
            written.push(self.process_record(record).await?);
        }
        Ok(written)
    }

    /// Detects labels for one record and writes its row
    ///
    /// An image the detection service rejects as an invalid format is recorded with no
    /// labels. Any other detection failure is returned without writing.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::UnexpectedKey` if the key is outside the image layout,
    /// `WorkerError::Detection` or `WorkerError::LabelTable` if a remote call fails
    #[instrument(skip_all, fields(bucket = %record.bucket(), key = %record.s3.object.key))]
    pub async fn process_record(&self, record: &NotificationRecord) -> WorkerResult<LabelRecord> {
        let key = record.object_key()?;
        let image = self.key_layout.identifier(&key)?.to_string();

        let labels = match self
            .detector
            .detect_labels(record.bucket(), &key, self.max_labels)
            .await
        {
            Ok(labels) => labels,
            Err(DetectionError::InvalidImageFormat(reason)) => {
                warn!(%reason, "Invalid image format, recording empty labels");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let label_record = LabelRecord {
            image,
            e_tag: record.e_tag().to_string(),
            labels,
        };
        self.table.put(&label_record).await?;

        info!(
            image = %label_record.image,
            label_count = label_record.labels.len(),
            "Stored labels"
        );
        Ok(label_record)
    }
}
