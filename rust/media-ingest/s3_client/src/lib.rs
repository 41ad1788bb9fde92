use std::collections::HashMap;

mod metadata;

pub use metadata::HeadObjectErr;

#[derive(Clone, Debug)]
pub struct S3 {
    inner: aws_sdk_s3::Client,
}

impl S3 {
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Retrieves the user metadata attached to the provided key without downloading the body.
    /// Objects uploaded without metadata produce an empty map.
    #[tracing::instrument(skip(self))]
    pub async fn get_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, HeadObjectErr> {
        metadata::get_metadata(&self.inner, bucket, key).await
    }
}
