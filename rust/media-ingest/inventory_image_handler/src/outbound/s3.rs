use s3_client::{HeadObjectErr, S3};

use crate::domain::{
    models::{IngestErr, ObjectMetadata},
    ports::MetadataFetcher,
};

/// [MetadataFetcher] which reads s3 user metadata with a head request
#[derive(Clone, Debug)]
pub struct S3MetadataFetcher {
    client: S3,
}

impl S3MetadataFetcher {
    pub fn new(client: S3) -> Self {
        Self { client }
    }
}

impl MetadataFetcher for S3MetadataFetcher {
    async fn fetch_metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, IngestErr> {
        match self.client.get_metadata(bucket, key).await {
            Ok(metadata) => Ok(metadata.into()),
            Err(HeadObjectErr::NotFound { bucket, key }) => {
                Err(IngestErr::ObjectNotFound { bucket, key })
            }
            Err(HeadObjectErr::Other(e)) => Err(IngestErr::MetadataFetch(e)),
        }
    }
}
