use anyhow::Context;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from a head object request
#[derive(Debug, Error)]
pub enum HeadObjectErr {
    #[error("object {key} does not exist in bucket {bucket}")]
    NotFound { bucket: String, key: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Gets the user metadata of a given item in the bucket
#[tracing::instrument(skip(client))]
pub(crate) async fn get_metadata(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<HashMap<String, String>, HeadObjectErr> {
    let resp = client.head_object().bucket(bucket).key(key).send().await;

    let output = match resp {
        Ok(output) => output,
        Err(e) => {
            if e.as_service_error().map(|e| e.is_not_found()) == Some(true) {
                return Err(HeadObjectErr::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }

            return Err(e)
                .context("failed to perform head object operation")
                .map_err(HeadObjectErr::Other);
        }
    };

    let metadata = output.metadata().cloned().unwrap_or_default();
    tracing::trace!(metadata_keys=?metadata.keys().collect::<Vec<_>>(), "retrieved metadata");

    Ok(metadata)
}
