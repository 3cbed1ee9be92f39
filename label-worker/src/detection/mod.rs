//! Label detection through Amazon Rekognition

mod error;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_rekognition::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::detect_labels::DetectLabelsError,
    types::{BoundingBox as RekognitionBoundingBox, Image, Instance, Label, S3Object},
    Client as RekognitionClient,
};
use image_storage::{BoundingBox, DetectedLabel, LabelInstance};
use rust_decimal::Decimal;
use tracing::{debug, error};

pub use error::{DetectionError, DetectionResult};

/// Label detection collaborator
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detects at most `max_labels` labels on an object in a bucket
    ///
    /// Every numeric value of the result is an exact decimal.
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
    ) -> DetectionResult<Vec<DetectedLabel>>;
}

/// Rekognition backed label detector
pub struct RekognitionDetector {
    rekognition_client: Arc<RekognitionClient>,
}

impl RekognitionDetector {
    /// Creates a new detector
    #[must_use]
    pub const fn new(rekognition_client: Arc<RekognitionClient>) -> Self {
        Self { rekognition_client }
    }
}

#[async_trait]
impl LabelDetector for RekognitionDetector {
    async fn detect_labels(
        &self,
        bucket: &str,
        key: &str,
        max_labels: i32,
    ) -> DetectionResult<Vec<DetectedLabel>> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let result = self
            .rekognition_client
            .detect_labels()
            .image(image)
            .max_labels(max_labels)
            .send()
            .await;

        match result {
            Ok(output) => {
                debug!("Detected {} labels for {}", output.labels().len(), key);
                output.labels().iter().map(to_detected_label).collect()
            }
            Err(SdkError::ServiceError(service_err))
                if matches!(
                    service_err.err(),
                    DetectLabelsError::InvalidImageFormatException(_)
                ) =>
            {
                let reason = service_err
                    .err()
                    .message()
                    .unwrap_or("invalid image format")
                    .to_string();
                Err(DetectionError::InvalidImageFormat(reason))
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() >= 500 =>
            {
                error!("Upstream error detecting labels for {}", key);
                Err(DetectionError::Upstream(format!("{:?}", service_err.err())))
            }
            Err(e) => Err(DetectionError::Service(
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }
}

/// Converts a float to the decimal with the same shortest round-trip digits
///
/// `99.87654_f32` becomes exactly `99.87654`, not the binary expansion of the float.
/// `Decimal` keeps at most 28 fractional digits, so magnitudes below `1e-28` (and
/// above `Decimal::MAX`) cannot be stored and are refused instead of rounded.
///
/// # Errors
///
/// Returns `DetectionError::MalformedResponse` for NaN, infinities and values the
/// decimal cannot hold without changing them
pub fn exact_decimal(value: f32) -> DetectionResult<Decimal> {
    let decimal = Decimal::from_str(&value.to_string()).map_err(|e| {
        DetectionError::MalformedResponse(format!("{value} is not a decimal number: {e}"))
    })?;

    if decimal.to_string().parse::<f32>() != Ok(value) {
        return Err(DetectionError::MalformedResponse(format!(
            "{value:e} does not fit a decimal without losing precision"
        )));
    }
    Ok(decimal)
}

fn optional_decimal(value: Option<f32>) -> DetectionResult<Option<Decimal>> {
    value.map(exact_decimal).transpose()
}

/// Converts a Rekognition label, deep-converting every float
///
/// # Errors
///
/// Returns `DetectionError::MalformedResponse` if the label has no name or a number is not finite
pub fn to_detected_label(label: &Label) -> DetectionResult<DetectedLabel> {
    let name = label
        .name()
        .ok_or_else(|| DetectionError::MalformedResponse("label without a name".to_string()))?;

    Ok(DetectedLabel {
        name: name.to_string(),
        confidence: optional_decimal(label.confidence())?,
        instances: label
            .instances()
            .iter()
            .map(to_label_instance)
            .collect::<DetectionResult<_>>()?,
        parents: label
            .parents()
            .iter()
            .filter_map(|parent| parent.name().map(ToString::to_string))
            .collect(),
        aliases: label
            .aliases()
            .iter()
            .filter_map(|alias| alias.name().map(ToString::to_string))
            .collect(),
        categories: label
            .categories()
            .iter()
            .filter_map(|category| category.name().map(ToString::to_string))
            .collect(),
    })
}

fn to_label_instance(instance: &Instance) -> DetectionResult<LabelInstance> {
    Ok(LabelInstance {
        bounding_box: instance.bounding_box().map(to_bounding_box).transpose()?,
        confidence: optional_decimal(instance.confidence())?,
    })
}

fn to_bounding_box(bounding_box: &RekognitionBoundingBox) -> DetectionResult<BoundingBox> {
    Ok(BoundingBox {
        width: optional_decimal(bounding_box.width())?,
        height: optional_decimal(bounding_box.height())?,
        left: optional_decimal(bounding_box.left())?,
        top: optional_decimal(bounding_box.top())?,
    })
}
