//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

use crate::key_layout::KeyLayout;

const DEFAULT_BUCKET_NAME: &str = "cloud-platform-bucket";
const DEFAULT_TABLE_NAME: &str = "image-labels";
const DEFAULT_IMAGE_PREFIX: &str = "images/";

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether `APP_ENV` was set explicitly
    ///
    /// When it is not, `from_env` falls back to development and every AWS call goes to
    /// the `LocalStack` endpoint.
    #[must_use]
    pub fn is_explicit() -> bool {
        env::var_os("APP_ENV").is_some()
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// AWS configuration with timeout settings
    ///
    /// Every remote call is attempted exactly once, SDK level retries are disabled.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard().with_max_attempts(1);

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    #[must_use]
    pub fn s3_client_config(&self, aws_config: &aws_config::SdkConfig) -> aws_sdk_s3::Config {
        let s3_config: aws_sdk_s3::Config = aws_config.into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Default tracing level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

/// Names of the bucket, table and key prefix shared by the worker and the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// S3 bucket holding the images
    pub bucket_name: String,
    /// `DynamoDB` table holding the label results
    pub table_name: String,
    /// Prefix every managed object key starts with
    pub image_prefix: String,
}

impl StorageConfig {
    /// Reads `S3_BUCKET_NAME`, `LABELS_TABLE_NAME` and `IMAGE_PREFIX`, falling back to defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bucket_name: env::var("S3_BUCKET_NAME")
                .unwrap_or_else(|_| DEFAULT_BUCKET_NAME.to_string()),
            table_name: env::var("LABELS_TABLE_NAME")
                .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
            image_prefix: env::var("IMAGE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_IMAGE_PREFIX.to_string()),
        }
    }

    /// Key layout for the configured prefix
    #[must_use]
    pub fn key_layout(&self) -> KeyLayout {
        KeyLayout::new(self.image_prefix.clone())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}
