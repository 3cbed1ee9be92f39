use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use image_storage::DetectedLabel;

use crate::detection::{DetectionError, DetectionResult, LabelDetector};
use crate::queue::{MessageQueue, QueueError, QueueResult, ReceivedMessage};

/// Outcome a `ScriptedDetector` returns for a key
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Detection succeeds with these labels
    Labels(Vec<DetectedLabel>),
    /// The image format is rejected
    InvalidImageFormat,
    /// Detection fails with a service error
    Failure(String),
}

/// A detection call as seen by the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionCall {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Requested label limit
    pub max_labels: i32,
}

/// Label detector answering from a script keyed by object key
///
/// Unscripted keys fail with a service error.
#[derive(Default)]
pub struct ScriptedDetector {
    outcomes: HashMap<String, ScriptedOutcome>,
    calls: Mutex<Vec<DetectionCall>>,
}

impl ScriptedDetector {
    /// Creates a detector with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the outcome for an object key
    #[must_use]
    pub fn with(mut self, key: &str, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(key.to_string(), outcome);
        self
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<DetectionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LabelDetector for ScriptedDetector {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
    ) -> DetectionResult<Vec<DetectedLabel>> {
        self.calls.lock().unwrap().push(DetectionCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            max_labels,
        });

        match self.outcomes.get(key) {
            Some(ScriptedOutcome::Labels(labels)) => Ok(labels.clone()),
            Some(ScriptedOutcome::InvalidImageFormat) => Err(DetectionError::InvalidImageFormat(
                "Request has invalid image format".to_string(),
            )),
            Some(ScriptedOutcome::Failure(reason)) => Err(DetectionError::Service(reason.clone())),
            None => Err(DetectionError::Service(format!("unscripted key {key}"))),
        }
    }
}

/// Queue handing out scripted batches, then empty batches
#[derive(Default)]
pub struct ScriptedQueue {
    batches: Mutex<VecDeque<Vec<ReceivedMessage>>>,
    acknowledged: Mutex<Vec<String>>,
    fail_receive: bool,
}

impl ScriptedQueue {
    /// Creates a queue delivering `batches` in order
    #[must_use]
    pub fn new(batches: Vec<Vec<ReceivedMessage>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Self::default()
        }
    }

    /// Creates a queue whose receive always fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_receive: true,
            ..Self::default()
        }
    }

    /// Whether every scripted batch was handed out
    #[must_use]
    pub fn drained(&self) -> bool {
        self.batches.lock().unwrap().is_empty()
    }

    /// Receipt handles acknowledged so far
    #[must_use]
    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for ScriptedQueue {
    async fn receive(&self) -> QueueResult<Vec<ReceivedMessage>> {
        if self.fail_receive {
            return Err(QueueError::Unavailable("scripted receive failure".to_string()));
        }
        let batch = self.batches.lock().unwrap().pop_front();
        if batch.is_none() {
            // Behave like an idle long poll
            tokio::task::yield_now().await;
        }
        Ok(batch.unwrap_or_default())
    }

    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(receipt_handle.to_string());
        Ok(())
    }
}
