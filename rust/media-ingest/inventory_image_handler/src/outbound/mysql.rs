use anyhow::Context;
use sqlx::{
    Connection, MySqlConnection,
    mysql::{MySqlConnectOptions, MySqlSslMode},
};

use crate::domain::{
    models::{DatabaseCredentials, IngestErr, InventoryImageRow},
    ports::{DatabaseConnector, InventoryImageStore},
};


const INSERT_INVENTORY_IMAGE: &str = r#"
    INSERT INTO InventoryImages (inventoryId, path, type, description)
    VALUES (?, ?, ?, ?)
"#;

/// Opens a single, unpooled mysql connection per invocation
#[derive(Clone, Debug)]
pub struct MySqlConnector {
    options: MySqlConnectOptions,
}

impl MySqlConnector {
    pub fn new(host: &str, port: u16, database: &str) -> Self {
        Self {
            options: MySqlConnectOptions::new()
                .host(host)
                .port(port)
                .database(database)
                .ssl_mode(MySqlSslMode::Preferred),
        }
    }
}

impl DatabaseConnector for MySqlConnector {
    type Connection = MySqlStore;

    #[tracing::instrument(skip(self))]
    async fn connect(&self, credentials: DatabaseCredentials) -> Result<MySqlStore, IngestErr> {
        let options = self
            .options
            .clone()
            .username(&credentials.username)
            .password(&credentials.password);

        let conn = MySqlConnection::connect_with(&options)
            .await
            .context("could not connect to db")
            .map_err(IngestErr::Connection)?;

        Ok(MySqlStore::new(conn))
    }
}

/// An open connection to the inventory database
#[derive(Debug)]
pub struct MySqlStore {
    conn: MySqlConnection,
}

impl MySqlStore {
    pub(crate) fn new(conn: MySqlConnection) -> Self {
        Self { conn }
    }
}

impl InventoryImageStore for MySqlStore {
    #[tracing::instrument(skip(self))]
    async fn insert_inventory_image(&mut self, row: &InventoryImageRow) -> Result<(), IngestErr> {
        insert_inventory_image(&mut self.conn, row)
            .await
            .map_err(IngestErr::QueryExecution)
    }

    #[tracing::instrument(skip(self))]
    async fn close(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .await
            .context("could not close db connection")
    }
}

async fn insert_inventory_image(
    conn: &mut MySqlConnection,
    row: &InventoryImageRow,
) -> anyhow::Result<()> {
    let mut tx = conn.begin().await.context("could not begin transaction")?;

    let result = sqlx::query(INSERT_INVENTORY_IMAGE)
        .bind(&row.inventory_id)
        .bind(&row.path)
        .bind(&row.document_type)
        .bind(&row.description)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.context("could not commit transaction")?;

    tracing::trace!(rows_affected=?result.rows_affected(), "inserted inventory image");

    Ok(())
}
