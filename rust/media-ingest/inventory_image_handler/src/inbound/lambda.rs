use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{
    Error, LambdaEvent,
    tracing::{self},
};

use crate::domain::{models::IngestResponse, ports::IngestService};

/// Handles the SQS event.
/// The queue is configured to deliver one s3 notification per invocation.
#[tracing::instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn handler<T: IngestService>(
    service: &T,
    event: LambdaEvent<SqsEvent>,
) -> Result<IngestResponse, Error> {
    tracing::trace!(
        record_count = event.payload.records.len(),
        "processing sqs event"
    );

    let response = service.ingest(&event.payload).await.map_err(|err| {
        tracing::error!(error=%err, kind=err.kind(), "invocation aborted before the database was reached");
        err
    })?;

    tracing::debug!(status_code = response.status_code, "invocation complete");

    Ok(response)
}
