//! Label results storage using Dynamo DB
//!
//! One row per image identifier, written by the label worker and checked by the CLI
//! before uploads. Writes are unconditional, the last write for an identifier wins.

mod error;
mod record;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoDbClient};
use tracing::debug;

pub use error::{LabelTableError, LabelTableResult};
pub use record::{BoundingBox, DetectedLabel, LabelInstance, LabelRecord, LabelRecordAttribute};

/// Label results table collaborator
#[async_trait]
pub trait LabelTable: Send + Sync {
    /// Writes a record, replacing any record with the same identifier
    async fn put(&self, record: &LabelRecord) -> LabelTableResult<()>;

    /// Gets the record of an image
    async fn get(&self, image: &str) -> LabelTableResult<Option<LabelRecord>>;

    /// Checks whether an image has a record
    async fn exists(&self, image: &str) -> LabelTableResult<bool>;
}

/// Label table client for Dynamo DB operations
pub struct DynamoDbLabelTable {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoDbLabelTable {
    /// Creates a new label table client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for label results
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }
}

#[async_trait]
impl LabelTable for DynamoDbLabelTable {
    async fn put(&self, record: &LabelRecord) -> LabelTableResult<()> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record.to_item()))
            .send()
            .await?;

        debug!(
            "Stored {} labels for image {}",
            record.labels.len(),
            record.image
        );
        Ok(())
    }

    async fn get(&self, image: &str) -> LabelTableResult<Option<LabelRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                LabelRecordAttribute::Image.to_string(),
                AttributeValue::S(image.to_string()),
            )
            .send()
            .await?;

        response.item().map(LabelRecord::from_item).transpose()
    }

    async fn exists(&self, image: &str) -> LabelTableResult<bool> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                LabelRecordAttribute::Image.to_string(),
                AttributeValue::S(image.to_string()),
            )
            .projection_expression("#image")
            .expression_attribute_names("#image", LabelRecordAttribute::Image.to_string())
            .send()
            .await?;

        Ok(response.item().is_some())
    }
}
