use aws_lambda_events::sqs::SqsEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;


/// The bucket inventory media is uploaded into
pub const MEDIA_BUCKET: &str = "carshubmediabucket";

/// Body returned to the caller once the row has been committed
pub const SUCCESS_MESSAGE: &str = "Record inserted successfully";

/// Metadata key holding the inventory the image belongs to
pub const INVENTORY_ID_KEY: &str = "inventoryid";
/// Metadata key holding the document classification
pub const DOCUMENT_TYPE_KEY: &str = "typeofdocument";
/// Metadata key holding the free text description
pub const DESCRIPTION_KEY: &str = "descriptionofdocument";

/// Everything that can go wrong while ingesting an upload.
/// Each variant is logged with its [IngestErr::kind]; callers only ever see the display string.
#[derive(Debug, Error)]
pub enum IngestErr {
    #[error("could not access database credentials: {0:#}")]
    SecretAccess(anyhow::Error),
    #[error("could not connect to the database: {0:#}")]
    Connection(anyhow::Error),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("object {key} was not found in bucket {bucket}")]
    ObjectNotFound { bucket: String, key: String },
    #[error("could not fetch object metadata: {0:#}")]
    MetadataFetch(anyhow::Error),
    #[error("missing metadata key: {0}")]
    KeyLookup(&'static str),
    #[error("could not insert inventory image: {0:#}")]
    QueryExecution(anyhow::Error),
}

impl IngestErr {
    /// stable name of the variant, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            IngestErr::SecretAccess(_) => "secret_access",
            IngestErr::Connection(_) => "connection",
            IngestErr::MalformedEvent(_) => "malformed_event",
            IngestErr::ObjectNotFound { .. } => "object_not_found",
            IngestErr::MetadataFetch(_) => "metadata_fetch",
            IngestErr::KeyLookup(_) => "key_lookup",
            IngestErr::QueryExecution(_) => "query_execution",
        }
    }
}

/// The s3 event notification carried in the body of each sqs message.
/// Only the fields we read are modelled.
#[derive(Deserialize, Debug)]
struct S3Notification {
    #[serde(rename = "Records")]
    records: Vec<S3NotificationRecord>,
}

#[derive(Deserialize, Debug)]
struct S3NotificationRecord {
    s3: S3Entity,
}

#[derive(Deserialize, Debug)]
struct S3Entity {
    object: S3Object,
}

#[derive(Deserialize, Debug)]
struct S3Object {
    key: String,
}

/// A single upload notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestEvent {
    /// decoded key of the uploaded object
    pub object_key: String,
}

impl IngestEvent {
    /// Extracts the uploaded object key from the first record of the sqs event
    pub fn from_sqs_event(event: &SqsEvent) -> Result<Self, IngestErr> {
        let record = event
            .records
            .first()
            .ok_or_else(|| IngestErr::MalformedEvent("event contains no records".to_string()))?;

        if event.records.len() > 1 {
            tracing::warn!(
                record_count = event.records.len(),
                "only the first record of the batch is processed, the queue batch size should be 1"
            );
        }

        let body = record
            .body
            .as_deref()
            .ok_or_else(|| IngestErr::MalformedEvent("record has no body".to_string()))?;

        Self::from_notification_body(body)
    }

    /// Parses the json s3 notification found in an sqs message body
    pub fn from_notification_body(body: &str) -> Result<Self, IngestErr> {
        let notification: S3Notification = serde_json::from_str(body)
            .map_err(|e| IngestErr::MalformedEvent(format!("invalid notification body: {e}")))?;

        let record = notification.records.into_iter().next().ok_or_else(|| {
            IngestErr::MalformedEvent("notification contains no records".to_string())
        })?;

        let object_key = decode_object_key(&record.s3.object.key)?;

        Ok(Self { object_key })
    }
}

/// s3 form-encodes keys in notifications, spaces arrive as `+`
fn decode_object_key(raw: &str) -> Result<String, IngestErr> {
    let spaced = raw.replace('+', " ");
    let key = urlencoding::decode(&spaced)
        .map_err(|e| IngestErr::MalformedEvent(format!("object key {raw} is not utf-8: {e}")))?;

    if key.is_empty() {
        return Err(IngestErr::MalformedEvent("object key is empty".to_string()));
    }

    Ok(key.into_owned())
}

/// User metadata attached to an object at upload time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata(HashMap<String, String>);

impl From<HashMap<String, String>> for ObjectMetadata {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

impl ObjectMetadata {
    /// Looks up a key which must be present
    pub fn require(&self, key: &'static str) -> Result<&str, IngestErr> {
        self.0
            .get(key)
            .map(String::as_str)
            .ok_or(IngestErr::KeyLookup(key))
    }
}

/// A row of the `InventoryImages` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryImageRow {
    pub inventory_id: String,
    pub path: String,
    pub document_type: String,
    pub description: String,
}

impl InventoryImageRow {
    /// Builds the row for `path` from the metadata of the uploaded object
    pub fn from_metadata(path: String, metadata: &ObjectMetadata) -> Result<Self, IngestErr> {
        Ok(Self {
            inventory_id: metadata.require(INVENTORY_ID_KEY)?.to_string(),
            path,
            document_type: metadata.require(DOCUMENT_TYPE_KEY)?.to_string(),
            description: metadata.require(DESCRIPTION_KEY)?.to_string(),
        })
    }
}

/// Database login stored as a json secret
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The value returned from the lambda
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub status_code: u16,
    pub body: String,
}

impl IngestResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// every failure kind shares the same status, the detail lives in the body
    pub fn failure(err: &IngestErr) -> Self {
        Self {
            status_code: 500,
            body: err.to_string(),
        }
    }
}
