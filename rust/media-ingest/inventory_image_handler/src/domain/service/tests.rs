use std::collections::HashMap;

use anyhow::anyhow;
use aws_lambda_events::sqs::SqsMessage;
use cool_asserts::assert_matches;

use crate::domain::{
    models::{DatabaseCredentials, ObjectMetadata, SUCCESS_MESSAGE},
    ports::{
        MockDatabaseConnector, MockInventoryImageStore, MockMetadataFetcher, MockSecretResolver,
    },
};

use super::*;

const SECRET_NAME: &str = "carshub/mysql";

fn event_with_body(body: &str) -> SqsEvent {
    SqsEvent {
        records: vec![SqsMessage {
            body: Some(body.to_string()),
            ..Default::default()
        }],
    }
}

fn event_for_key(key: &str) -> SqsEvent {
    event_with_body(
        &serde_json::json!({ "Records": [{ "s3": { "object": { "key": key } } }] }).to_string(),
    )
}

fn credentials() -> DatabaseCredentials {
    DatabaseCredentials {
        username: "admin".to_string(),
        password: "hunter2".to_string(),
    }
}

fn complete_metadata() -> ObjectMetadata {
    HashMap::from([
        ("inventoryid".to_string(), "42".to_string()),
        ("typeofdocument".to_string(), "title".to_string()),
        ("descriptionofdocument".to_string(), "front view".to_string()),
    ])
    .into()
}

fn working_secrets() -> MockSecretResolver {
    let mut secrets = MockSecretResolver::new();
    secrets
        .expect_resolve_database_credentials()
        .withf(|name| name == SECRET_NAME)
        .times(1)
        .returning(|_| Box::pin(async { Ok(credentials()) }));
    secrets
}

/// a connector which hands out `store` once
fn connector_for(store: MockInventoryImageStore) -> MockDatabaseConnector {
    let mut connector = MockDatabaseConnector::new();
    connector
        .expect_connect()
        .withf(|creds| *creds == credentials())
        .times(1)
        .return_once(move |_| Box::pin(async move { Ok(store) }));
    connector
}

/// a store which expects exactly one close and `inserts` inserts
fn store_expecting(inserts: usize) -> MockInventoryImageStore {
    let mut store = MockInventoryImageStore::new();
    store
        .expect_insert_inventory_image()
        .times(inserts)
        .returning(|_| Box::pin(async { Ok(()) }));
    store
        .expect_close()
        .times(1)
        .returning(|| Box::pin(async { Ok(()) }));
    store
}

fn metadata_returning(
    key: &'static str,
    result: fn() -> Result<ObjectMetadata, IngestErr>,
) -> MockMetadataFetcher {
    let mut fetcher = MockMetadataFetcher::new();
    fetcher
        .expect_fetch_metadata()
        .withf(move |bucket, k| bucket == MEDIA_BUCKET && k == key)
        .times(1)
        .returning(move |_, _| Box::pin(async move { result() }));
    fetcher
}

fn unused_metadata() -> MockMetadataFetcher {
    let mut fetcher = MockMetadataFetcher::new();
    fetcher.expect_fetch_metadata().times(0);
    fetcher
}

#[tokio::test]
async fn it_inserts_one_row_for_a_complete_upload() {
    let mut store = MockInventoryImageStore::new();
    store
        .expect_insert_inventory_image()
        .withf(|row| {
            *row == InventoryImageRow {
                inventory_id: "42".to_string(),
                path: "uploads/img1.jpg".to_string(),
                document_type: "title".to_string(),
                description: "front view".to_string(),
            }
        })
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));
    store
        .expect_close()
        .times(1)
        .returning(|| Box::pin(async { Ok(()) }));

    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store),
        metadata_returning("uploads/img1.jpg", || Ok(complete_metadata())),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_with_body(
            r#"{"Records":[{"s3":{"object":{"key":"uploads/img1.jpg"}}}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(res.status_code, 200);
    assert_eq!(res.body, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn it_reports_a_missing_object_without_inserting() {
    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store_expecting(0)),
        metadata_returning("uploads/gone.jpg", || {
            Err(IngestErr::ObjectNotFound {
                bucket: MEDIA_BUCKET.to_string(),
                key: "uploads/gone.jpg".to_string(),
            })
        }),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_for_key("uploads/gone.jpg"))
        .await
        .unwrap();

    assert_eq!(
        res,
        IngestResponse {
            status_code: 500,
            body: "object uploads/gone.jpg was not found in bucket carshubmediabucket"
                .to_string(),
        }
    );
}

#[tokio::test]
async fn it_reports_incomplete_metadata_without_inserting() {
    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store_expecting(0)),
        metadata_returning("uploads/img1.jpg", || {
            Ok(HashMap::from([
                ("inventoryid".to_string(), "42".to_string()),
                ("descriptionofdocument".to_string(), "front view".to_string()),
            ])
            .into())
        }),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_for_key("uploads/img1.jpg"))
        .await
        .unwrap();

    assert_eq!(res.status_code, 500);
    assert_eq!(res.body, "missing metadata key: typeofdocument");
}

#[tokio::test]
async fn it_reports_a_malformed_body_without_touching_s3() {
    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store_expecting(0)),
        unused_metadata(),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_with_body("this is not json"))
        .await
        .unwrap();

    assert_eq!(res.status_code, 500);
    assert!(res.body.starts_with("malformed event: "), "{}", res.body);
}

#[tokio::test]
async fn it_reports_an_empty_batch_without_touching_s3() {
    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store_expecting(0)),
        unused_metadata(),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&SqsEvent { records: vec![] })
        .await
        .unwrap();

    assert_eq!(res.status_code, 500);
    assert_eq!(res.body, "malformed event: event contains no records");
}

#[tokio::test]
async fn it_reports_an_insert_failure_and_still_closes() {
    let mut store = MockInventoryImageStore::new();
    store
        .expect_insert_inventory_image()
        .times(1)
        .returning(|_| {
            Box::pin(async {
                Err(IngestErr::QueryExecution(anyhow!(
                    "Table 'carshub.InventoryImages' doesn't exist"
                )))
            })
        });
    store
        .expect_close()
        .times(1)
        .returning(|| Box::pin(async { Ok(()) }));

    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store),
        metadata_returning("uploads/img1.jpg", || Ok(complete_metadata())),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_for_key("uploads/img1.jpg"))
        .await
        .unwrap();

    assert_eq!(res.status_code, 500);
    assert_eq!(
        res.body,
        "could not insert inventory image: Table 'carshub.InventoryImages' doesn't exist"
    );
}

#[tokio::test]
async fn a_failed_close_does_not_change_the_response() {
    let mut store = MockInventoryImageStore::new();
    store
        .expect_insert_inventory_image()
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));
    store
        .expect_close()
        .times(1)
        .returning(|| Box::pin(async { Err(anyhow!("broken pipe")) }));

    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store),
        metadata_returning("uploads/img1.jpg", || Ok(complete_metadata())),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_for_key("uploads/img1.jpg"))
        .await
        .unwrap();

    assert_eq!(res, IngestResponse::success());
}

#[tokio::test]
async fn it_passes_the_decoded_key_to_s3_and_the_row() {
    let mut store = MockInventoryImageStore::new();
    store
        .expect_insert_inventory_image()
        .withf(|row| row.path == "uploads/front view.jpg")
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));
    store
        .expect_close()
        .times(1)
        .returning(|| Box::pin(async { Ok(()) }));

    let ingestor = InventoryImageIngestor::new(
        working_secrets(),
        connector_for(store),
        metadata_returning("uploads/front view.jpg", || Ok(complete_metadata())),
        SECRET_NAME,
    );

    let res = ingestor
        .ingest(&event_for_key("uploads/front+view.jpg"))
        .await
        .unwrap();

    assert_eq!(res.status_code, 200);
}

#[tokio::test]
async fn secret_failures_abort_before_connecting() {
    let mut secrets = MockSecretResolver::new();
    secrets
        .expect_resolve_database_credentials()
        .times(1)
        .returning(|_| {
            Box::pin(async { Err(IngestErr::SecretAccess(anyhow!("ResourceNotFoundException"))) })
        });
    let mut connector = MockDatabaseConnector::new();
    connector.expect_connect().times(0);

    let ingestor =
        InventoryImageIngestor::new(secrets, connector, unused_metadata(), SECRET_NAME);

    let res = ingestor.ingest(&event_for_key("uploads/img1.jpg")).await;

    assert_matches!(res, Err(IngestErr::SecretAccess(_)));
}

#[tokio::test]
async fn connection_failures_abort_before_reading_the_event() {
    let mut connector = MockDatabaseConnector::new();
    connector.expect_connect().times(1).returning(|_| {
        Box::pin(async { Err(IngestErr::Connection(anyhow!("Access denied for user"))) })
    });

    let ingestor =
        InventoryImageIngestor::new(working_secrets(), connector, unused_metadata(), SECRET_NAME);

    let res = ingestor.ingest(&event_for_key("uploads/img1.jpg")).await;

    assert_matches!(res, Err(err) => {
        assert_eq!(err.kind(), "connection");
    });
}

#[tokio::test]
async fn reprocessing_an_event_inserts_again() {
    // no idempotence: the same delivery twice yields two inserts over two connections
    let mut connector = MockDatabaseConnector::new();
    connector
        .expect_connect()
        .times(2)
        .returning(|_| Box::pin(async { Ok(store_expecting(1)) }));
    let mut secrets = MockSecretResolver::new();
    secrets
        .expect_resolve_database_credentials()
        .times(2)
        .returning(|_| Box::pin(async { Ok(credentials()) }));
    let mut fetcher = MockMetadataFetcher::new();
    fetcher
        .expect_fetch_metadata()
        .times(2)
        .returning(|_, _| Box::pin(async { Ok(complete_metadata()) }));

    let ingestor = InventoryImageIngestor::new(secrets, connector, fetcher, SECRET_NAME);
    let event = event_for_key("uploads/img1.jpg");

    assert_eq!(ingestor.ingest(&event).await.unwrap().status_code, 200);
    assert_eq!(ingestor.ingest(&event).await.unwrap().status_code, 200);
}
