//! Integration tests against `LocalStack`
//!
//! Run with `docker compose up localstack` and `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use futures::StreamExt;
use image_storage::{
    pages, BucketError, DetectedLabel, DynamoDbLabelTable, ImageStore, KeyLayout,
    LabelRecord, LabelTable, S3ImageStore,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

async fn localstack_config() -> aws_config::SdkConfig {
    let credentials = Credentials::from_keys(
        "test", // AWS_ACCESS_KEY_ID
        "test", // AWS_SECRET_ACCESS_KEY
        None,   // no session token
    );
    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await
}

/// Creates a uniquely named label table
async fn setup_label_table() -> (DynamoDbLabelTable, Arc<DynamoDbClient>, String) {
    let config = localstack_config().await;
    let dynamodb_client = Arc::new(DynamoDbClient::new(&config));
    let table_name = format!("test-image-labels-{}", Uuid::new_v4());

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("image")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .unwrap(),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("image")
                .key_type(KeyType::Hash)
                .build()
                .unwrap(),
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .expect("Failed to create test table");

    // Wait a bit for table to be ready
    tokio::time::sleep(Duration::from_millis(100)).await;

    let table = DynamoDbLabelTable::new(dynamodb_client.clone(), table_name.clone());
    (table, dynamodb_client, table_name)
}

fn s3_client(config: &aws_config::SdkConfig) -> Arc<S3Client> {
    let s3_config = aws_sdk_s3::config::Builder::from(config)
        .force_path_style(true)
        .build();
    Arc::new(S3Client::from_conf(s3_config))
}

fn image_store(s3_client: Arc<S3Client>, bucket_name: String) -> S3ImageStore {
    S3ImageStore::new(s3_client, bucket_name, KeyLayout::new("images/".to_string()))
}

/// Store pointing at a bucket nobody created
async fn store_without_bucket() -> S3ImageStore {
    let config = localstack_config().await;
    image_store(
        s3_client(&config),
        format!("test-missing-{}", Uuid::new_v4()),
    )
}

/// Creates a uniquely named bucket
async fn setup_bucket() -> (S3ImageStore, Arc<S3Client>, String) {
    let config = localstack_config().await;
    let s3_client = s3_client(&config);
    let bucket_name = format!("test-images-{}", Uuid::new_v4());

    s3_client
        .create_bucket()
        .bucket(&bucket_name)
        .send()
        .await
        .expect("Failed to create test bucket");

    let store = image_store(s3_client.clone(), bucket_name.clone());
    (store, s3_client, bucket_name)
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_label_record_round_trip_and_overwrite() {
    let (table, client, table_name) = setup_label_table().await;

    let first = LabelRecord {
        image: "cat.png".to_string(),
        e_tag: "etag-1".to_string(),
        labels: vec![DetectedLabel {
            name: "Cat".to_string(),
            confidence: Some("99.87654".parse().unwrap()),
            ..DetectedLabel::default()
        }],
    };
    table.put(&first).await.unwrap();
    assert!(table.exists("cat.png").await.unwrap());
    assert_eq!(table.get("cat.png").await.unwrap(), Some(first));

    let second = LabelRecord {
        image: "cat.png".to_string(),
        e_tag: "etag-2".to_string(),
        labels: vec![],
    };
    table.put(&second).await.unwrap();
    assert_eq!(table.get("cat.png").await.unwrap(), Some(second));
    assert!(!table.exists("dog.png").await.unwrap());

    let _ = client.delete_table().table_name(&table_name).send().await;
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_upload_exists_download() {
    let (store, _client, _bucket) = setup_bucket().await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.png");
    tokio::fs::write(&source, b"not really a png").await.unwrap();

    assert!(!store.exists("cat.png").await.unwrap());
    store.upload("cat.png", &source).await.unwrap();
    assert!(store.exists("cat.png").await.unwrap());

    let destination = dir.path().join("downloaded.png");
    store.download("cat.png", &destination).await.unwrap();
    assert_eq!(
        tokio::fs::read(&destination).await.unwrap(),
        b"not really a png"
    );

    let missing = dir.path().join("missing.png");
    let err = store.download("missing.png", &missing).await.unwrap_err();
    assert!(matches!(err, BucketError::NotFound(_)));
    assert!(!missing.exists());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_listing_a_missing_bucket_reports_its_status() {
    let store = store_without_bucket().await;

    let err = store.list_page(10, None).await.unwrap_err();
    assert!(matches!(err, BucketError::UnexpectedStatus(404)), "{err:?}");

    let mut listing = std::pin::pin!(pages(&store, 10));
    let first = listing.next().await.unwrap();
    assert!(matches!(first, Err(BucketError::UnexpectedStatus(404))));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_key_and_missing_bucket_are_absent() {
    let (store, _client, _bucket) = setup_bucket().await;
    assert!(!store.exists("ghost.png").await.unwrap());

    let store = store_without_bucket().await;
    assert!(!store.exists("ghost.png").await.unwrap());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_upload_refused_by_the_service_is_rejected() {
    let store = store_without_bucket().await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("cat.png");
    tokio::fs::write(&source, b"png").await.unwrap();

    let err = store.upload("cat.png", &source).await.unwrap_err();
    assert!(matches!(err, BucketError::UploadRejected(_)), "{err:?}");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_unreachable_endpoint_is_not_a_rejection() {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url("http://127.0.0.1:1")
        .region(Region::new(TEST_REGION))
        .credentials_provider(Credentials::from_keys("test", "test", None))
        .load()
        .await;
    let store = image_store(s3_client(&config), "unreachable".to_string());
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("cat.png");
    tokio::fs::write(&source, b"png").await.unwrap();

    let err = store.upload("cat.png", &source).await.unwrap_err();
    assert!(matches!(err, BucketError::AwsError(_)), "{err:?}");

    let err = store.exists("cat.png").await.unwrap_err();
    assert!(matches!(err, BucketError::AwsError(_)), "{err:?}");
}
