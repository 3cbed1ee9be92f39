use clap::{Parser, ValueEnum};

use crate::processor::DEFAULT_MAX_LABELS;

/// How the worker receives notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkerMode {
    /// Run as an AWS Lambda function triggered by SQS
    Lambda,
    /// Long-poll the queue directly (local development)
    Poll,
}

/// Command line and environment configuration of the worker
#[derive(Debug, Clone, Parser)]
#[command(name = "label-worker", about = "Detects labels for images uploaded to S3")]
pub struct WorkerArgs {
    /// Delivery mode
    #[arg(long, env = "WORKER_MODE", value_enum, default_value_t = WorkerMode::Lambda)]
    pub mode: WorkerMode,

    /// Notification queue URL, required in poll mode
    #[arg(long, env = "QUEUE_URL", required_if_eq("mode", "poll"))]
    pub queue_url: Option<String>,

    /// Maximum number of labels requested per image
    #[arg(
        long,
        env = "MAX_LABELS",
        default_value_t = DEFAULT_MAX_LABELS,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub max_labels: i32,
}
