//! This module defines all of the ports that the ingest domain requires

use aws_lambda_events::sqs::SqsEvent;

use crate::domain::models::{
    DatabaseCredentials, IngestErr, IngestResponse, InventoryImageRow, ObjectMetadata,
};

/// Resolves the database login from the secret store
#[cfg_attr(test, mockall::automock)]
pub trait SecretResolver: Send + Sync + 'static {
    /// fetch and decode the credentials held under `secret_name`.
    /// Fails with [IngestErr::SecretAccess]
    fn resolve_database_credentials(
        &self,
        secret_name: &str,
    ) -> impl Future<Output = Result<DatabaseCredentials, IngestErr>> + Send;
}

/// Opens a connection to the database holding `InventoryImages`
#[cfg_attr(test, mockall::automock(type Connection = MockInventoryImageStore;))]
pub trait DatabaseConnector: Send + Sync + 'static {
    /// the connection handed out per invocation
    type Connection: InventoryImageStore;

    /// Fails with [IngestErr::Connection]
    fn connect(
        &self,
        credentials: DatabaseCredentials,
    ) -> impl Future<Output = Result<Self::Connection, IngestErr>> + Send;
}

/// A single open database connection
#[cfg_attr(test, mockall::automock)]
pub trait InventoryImageStore: Send + 'static {
    /// insert and commit one row. Fails with [IngestErr::QueryExecution]
    fn insert_inventory_image(
        &mut self,
        row: &InventoryImageRow,
    ) -> impl Future<Output = Result<(), IngestErr>> + Send;

    /// release the connection
    fn close(self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Reads object metadata from the blob store
#[cfg_attr(test, mockall::automock)]
pub trait MetadataFetcher: Send + Sync + 'static {
    /// Fails with [IngestErr::ObjectNotFound] when the key does not exist,
    /// otherwise with [IngestErr::MetadataFetch]
    fn fetch_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<ObjectMetadata, IngestErr>> + Send;
}

/// The service level interface invoked once per lambda invocation
#[cfg_attr(test, mockall::automock)]
pub trait IngestService: Send + Sync + 'static {
    /// Records the upload referenced by `event`.
    ///
    /// Failures before a database connection exists are returned as [Err].
    /// Once a connection is held every outcome is reported through the [IngestResponse].
    fn ingest(
        &self,
        event: &SqsEvent,
    ) -> impl Future<Output = Result<IngestResponse, IngestErr>> + Send;
}
