//! S3 event notifications as delivered in SQS message bodies

use std::borrow::Cow;

use serde::Deserialize;

use crate::types::{WorkerError, WorkerResult};

const TEST_EVENT: &str = "s3:TestEvent";

/// Body of an SQS message published by an S3 bucket notification
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NotificationMessage {
    #[serde(rename = "Records")]
    records: Option<Vec<NotificationRecord>>,
    /// Set on the configuration test message S3 sends when notifications are enabled
    #[serde(rename = "Event")]
    event: Option<String>,
}

/// One "object created" event
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Bucket and object the event refers to
    pub s3: S3Entity,
}

/// S3 part of an event record
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Entity {
    /// Bucket holding the object
    pub bucket: S3Bucket,
    /// The created object
    pub object: S3Object,
}

/// Bucket of an event record
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Bucket {
    /// Bucket name
    pub name: String,
}

/// Object of an event record
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Object {
    /// Object key, URL-encoded
    pub key: String,
    /// Content checksum
    #[serde(rename = "eTag")]
    pub e_tag: String,
}

impl NotificationMessage {
    /// Parses an SQS message body
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::InvalidMessage` if the body is not JSON, or has no `Records`
    /// and is not an S3 test event
    pub fn from_body(body: &str) -> WorkerResult<Self> {
        let message: Self =
            serde_json::from_str(body).map_err(|e| WorkerError::InvalidMessage(e.to_string()))?;

        if message.records.is_none() && !message.is_test_event() {
            return Err(WorkerError::InvalidMessage(
                "missing Records in notification".to_string(),
            ));
        }
        Ok(message)
    }

    /// Whether this is the test message S3 sends when a notification is configured
    #[must_use]
    pub fn is_test_event(&self) -> bool {
        self.event.as_deref() == Some(TEST_EVENT)
    }

    /// Event records in delivery order
    #[must_use]
    pub fn records(&self) -> &[NotificationRecord] {
        self.records.as_deref().unwrap_or_default()
    }
}

impl NotificationRecord {
    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    /// Content checksum
    #[must_use]
    pub fn e_tag(&self) -> &str {
        &self.s3.object.e_tag
    }

    /// Object key with S3's form encoding undone (`+` for spaces, percent escapes)
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::InvalidMessage` if the decoded key is not UTF-8
    pub fn object_key(&self) -> WorkerResult<String> {
        let key = self.s3.object.key.replace('+', " ");
        urlencoding::decode(&key)
            .map(Cow::into_owned)
            .map_err(|e| WorkerError::InvalidMessage(format!("undecodable object key: {e}")))
    }
}
