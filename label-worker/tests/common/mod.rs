#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use image_storage::mock::InMemoryLabelTable;
use image_storage::{DetectedLabel, KeyLayout};
use label_worker::mock::ScriptedDetector;
use label_worker::processor::LabelProcessor;
use rust_decimal::Decimal;
use serde_json::json;

pub const BUCKET: &str = "cloud-platform-bucket";

/// Processor wired to scripted collaborators
pub struct TestContext {
    pub detector: Arc<ScriptedDetector>,
    pub table: Arc<InMemoryLabelTable>,
    pub processor: Arc<LabelProcessor>,
}

impl TestContext {
    pub fn new(detector: ScriptedDetector) -> Self {
        let detector = Arc::new(detector);
        let table = Arc::new(InMemoryLabelTable::new());
        let processor = Arc::new(LabelProcessor::new(
            detector.clone(),
            table.clone(),
            KeyLayout::new("images/".to_string()),
        ));

        Self {
            detector,
            table,
            processor,
        }
    }
}

/// SQS message body carrying one notification record per `(key, eTag)` pair
pub fn notification_body(objects: &[(&str, &str)]) -> String {
    let records: Vec<_> = objects
        .iter()
        .map(|(key, e_tag)| {
            json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": BUCKET},
                    "object": {"key": key, "size": 2048, "eTag": e_tag}
                }
            })
        })
        .collect();

    json!({ "Records": records }).to_string()
}

pub fn test_event_body() -> String {
    json!({
        "Service": "Amazon S3",
        "Event": "s3:TestEvent",
        "Time": "2024-05-01T12:00:00.000Z",
        "Bucket": BUCKET
    })
    .to_string()
}

pub fn label(name: &str, confidence: &str) -> DetectedLabel {
    DetectedLabel {
        name: name.to_string(),
        confidence: Some(Decimal::from_str(confidence).unwrap()),
        ..DetectedLabel::default()
    }
}
