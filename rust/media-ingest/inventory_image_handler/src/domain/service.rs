use aws_lambda_events::sqs::SqsEvent;

use crate::domain::{
    models::{IngestErr, IngestEvent, IngestResponse, InventoryImageRow, MEDIA_BUCKET},
    ports::{
        DatabaseConnector, IngestService, InventoryImageStore, MetadataFetcher, SecretResolver,
    },
};

#[cfg(test)]
mod tests;

/// Records uploaded inventory images.
/// Holds the long lived clients, a database connection only ever lives for one invocation.
pub struct InventoryImageIngestor<S, C, M> {
    secrets: S,
    connector: C,
    metadata: M,
    secret_name: String,
    bucket: String,
}

impl<S, C, M> InventoryImageIngestor<S, C, M>
where
    S: SecretResolver,
    C: DatabaseConnector,
    M: MetadataFetcher,
{
    pub fn new(secrets: S, connector: C, metadata: M, secret_name: impl Into<String>) -> Self {
        Self {
            secrets,
            connector,
            metadata,
            secret_name: secret_name.into(),
            bucket: MEDIA_BUCKET.to_string(),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn insert_from_event(
        &self,
        connection: &mut C::Connection,
        event: &SqsEvent,
    ) -> Result<InventoryImageRow, IngestErr> {
        let IngestEvent { object_key } = IngestEvent::from_sqs_event(event)?;
        tracing::debug!(bucket=%self.bucket, key=%object_key, "fetching object metadata");

        let metadata = self
            .metadata
            .fetch_metadata(&self.bucket, &object_key)
            .await?;

        let row = InventoryImageRow::from_metadata(object_key, &metadata)?;
        connection.insert_inventory_image(&row).await?;

        Ok(row)
    }
}

impl<S, C, M> IngestService for InventoryImageIngestor<S, C, M>
where
    S: SecretResolver,
    C: DatabaseConnector,
    M: MetadataFetcher,
{
    #[tracing::instrument(skip_all)]
    async fn ingest(&self, event: &SqsEvent) -> Result<IngestResponse, IngestErr> {
        let credentials = self
            .secrets
            .resolve_database_credentials(&self.secret_name)
            .await?;

        let mut connection = self.connector.connect(credentials).await?;
        tracing::trace!("acquired database connection");

        let outcome = self.insert_from_event(&mut connection, event).await;

        // the connection is released exactly once no matter how the insert went
        if let Err(e) = connection.close().await {
            tracing::error!(error=?e, "could not close database connection");
        }

        Ok(match outcome {
            Ok(row) => {
                tracing::info!(
                    inventory_id=%row.inventory_id,
                    path=%row.path,
                    "inserted inventory image"
                );
                IngestResponse::success()
            }
            Err(err) => {
                tracing::error!(error=%err, kind=err.kind(), "could not ingest inventory image");
                IngestResponse::failure(&err)
            }
        })
    }
}
