#![recursion_limit = "256"]

use std::sync::Arc;

use anyhow::Context;
use aws_lambda_events::sqs::SqsEvent;
use aws_sdk_secretsmanager::config::Region;
use ingest_entrypoint::IngestEntrypoint;
use inventory_image_handler::{
    config::Config,
    domain::service::InventoryImageIngestor,
    inbound,
    outbound::{
        mysql::MySqlConnector, s3::S3MetadataFetcher, secretsmanager::SecretsManagerResolver,
    },
};
use lambda_runtime::{Error, LambdaEvent, run, service_fn, tracing};
use secretsmanager_client::SecretsManagerClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    IngestEntrypoint::default().init();

    tracing::trace!("initiating lambda");

    let config = Config::from_env().context("all necessary env vars should be available")?;

    tracing::trace!("initialized config");

    // the media bucket lives in us-east-1 regardless of where the secret is
    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region("us-east-1")
        .load()
        .await;
    let s3_client = s3_client::S3::new(aws_sdk_s3::Client::new(&s3_config));
    tracing::trace!("initialized s3 client");

    let secrets_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let secrets_client =
        SecretsManagerClient::new(aws_sdk_secretsmanager::Client::new(&secrets_config));
    tracing::trace!("initialized secrets manager client");

    let ingestor = InventoryImageIngestor::new(
        SecretsManagerResolver::new(secrets_client),
        MySqlConnector::new(&config.db_host, config.db_port, &config.db_name),
        S3MetadataFetcher::new(s3_client),
        config.secret_name.clone(),
    );

    let shared_ingestor = Arc::new(ingestor);

    let func = service_fn(move |event: LambdaEvent<SqsEvent>| {
        let ingestor = shared_ingestor.clone();
        async move { inbound::lambda::handler(ingestor.as_ref(), event).await }
    });

    run(func).await
}
