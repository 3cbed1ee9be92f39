use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{Error, LambdaEvent};
use tracing::{error, info};

use crate::processor::LabelProcessor;
use crate::types::WorkerError;

/// Processes the SQS event
///
/// The trigger is configured with a batch size of one, but every delivered message is
/// processed. Returning an error fails the invocation and hands the message back to the
/// queue's redelivery policy.
///
/// # Errors
///
/// Returns an error if a message has no body or its processing fails
#[tracing::instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn handler(processor: &LabelProcessor, event: LambdaEvent<SqsEvent>) -> Result<(), Error> {
    info!(
        "processing sqs records record_count={}",
        event.payload.records.len()
    );

    for message in event.payload.records {
        let message_id = message.message_id.unwrap_or_default();
        let body = message
            .body
            .ok_or_else(|| WorkerError::MissingBody(message_id.clone()))?;

        let records = processor.process_body(&body).await.map_err(|e| {
            error!(error = %e, message_id = %message_id, "error processing message");
            e
        })?;

        info!(
            message_id = %message_id,
            record_count = records.len(),
            "processed message"
        );
    }

    Ok(())
}
