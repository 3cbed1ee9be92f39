use std::sync::Arc;

use anyhow::Context;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use image_cli::args::Cli;
use image_cli::commands::ImageManager;
use image_cli::console::StdConsole;
use image_storage::{DynamoDbLabelTable, Environment, S3ImageStore, StorageConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Exits with usage and status 2 when no operation is given
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries user-facing output
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let operation = cli.operation().context("no operation selected")?;

    if !Environment::is_explicit() {
        warn!("APP_ENV is not set, defaulting to development against LocalStack");
    }
    let environment = Environment::from_env();
    let storage = StorageConfig::from_env();
    let aws_config = environment.aws_config().await;

    let store = Arc::new(S3ImageStore::new(
        Arc::new(S3Client::from_conf(environment.s3_client_config(&aws_config))),
        storage.bucket_name.clone(),
        storage.key_layout(),
    ));
    let table = Arc::new(DynamoDbLabelTable::new(
        Arc::new(DynamoDbClient::new(&aws_config)),
        storage.table_name.clone(),
    ));
    let download_dir =
        std::env::current_dir().context("Failed to resolve the working directory")?;

    ImageManager::new(store, table, Arc::new(StdConsole), download_dir)
        .run(operation)
        .await?;

    Ok(())
}
