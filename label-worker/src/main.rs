use std::sync::Arc;

use anyhow::Context;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_sqs::Client as SqsClient;
use clap::Parser;
use lambda_runtime::{run, service_fn};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use image_storage::{DynamoDbLabelTable, Environment, StorageConfig};
use label_worker::config::{WorkerArgs, WorkerMode};
use label_worker::detection::RekognitionDetector;
use label_worker::handler::handler;
use label_worker::processor::LabelProcessor;
use label_worker::queue::{QueueConfig, QueuePoller, SqsNotificationQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = WorkerArgs::parse();
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON for staging/production log ingestion, plain text for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .without_time()
            .init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    if !Environment::is_explicit() {
        warn!("APP_ENV is not set, defaulting to development against LocalStack");
    }

    let storage = StorageConfig::from_env();
    info!(
        "Starting label worker in {:?} environment, mode {:?}, table {}",
        environment, args.mode, storage.table_name
    );

    let aws_config = environment.aws_config().await;
    let detector = Arc::new(RekognitionDetector::new(Arc::new(RekognitionClient::new(
        &aws_config,
    ))));
    let table = Arc::new(DynamoDbLabelTable::new(
        Arc::new(DynamoDbClient::new(&aws_config)),
        storage.table_name.clone(),
    ));
    let processor = LabelProcessor::new(detector, table, storage.key_layout())
        .with_max_labels(args.max_labels);

    match args.mode {
        WorkerMode::Lambda => {
            run(service_fn(|event| handler(&processor, event)))
                .await
                .map_err(|e| anyhow::anyhow!("Lambda runtime error: {e}"))?;
        }
        WorkerMode::Poll => {
            let queue_url = args
                .queue_url
                .context("QUEUE_URL is required in poll mode")?;
            let queue = Arc::new(SqsNotificationQueue::new(
                Arc::new(SqsClient::new(&aws_config)),
                QueueConfig::new(queue_url),
            ));
            let poller = QueuePoller::new(queue, Arc::new(processor));

            let shutdown = CancellationToken::new();
            let signal_shutdown = shutdown.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C, initiating graceful shutdown...");
                        signal_shutdown.cancel();
                    }
                    Err(e) => {
                        error!("Failed to listen for Ctrl+C: {}", e);
                    }
                }
            });

            poller.run(shutdown).await?;
        }
    }

    info!("Label worker stopped");
    Ok(())
}
