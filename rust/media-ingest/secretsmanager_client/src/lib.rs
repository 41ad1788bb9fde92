#![deny(missing_docs)]
//! Thin wrapper around the aws secrets manager sdk used to pull credential material at runtime.

use aws_sdk_secretsmanager as secretsmanager;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// a trait to abstract away the expected interface for fetching a secret from a remote server
pub trait SecretManager: Send + Sync {
    /// The error that can be returned from the server
    type Err: std::error::Error;

    /// fetch the raw secret string from the server
    fn get_secret_value<T: AsRef<str> + Send>(
        &self,
        secret_name: T,
    ) -> impl Future<Output = Result<Arc<str>, Self::Err>> + Send;
}

/// Client for aws secrets manager
#[derive(Clone, Debug)]
pub struct SecretsManagerClient {
    inner: secretsmanager::Client,
}

/// The errors which can occur while fetching a secret
#[derive(Debug, Error)]
pub enum SecretErr {
    /// The sdk call failed, e.g. the secret id is unknown or access was denied
    #[error("{0:?}")]
    AwsErr(#[from] aws_sdk_secretsmanager::Error),
    /// The secret exists but holds no string value
    #[error("The secret did not exist in aws")]
    NotPresent,
    /// The secret string could not be decoded into the requested shape
    #[error("The secret value could not be decoded: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl SecretsManagerClient {
    /// wrap an already configured sdk client
    pub fn new(inner: secretsmanager::Client) -> Self {
        Self { inner }
    }

    /// fetch the secret and decode its string value as json into `T`
    #[tracing::instrument(err, skip(self))]
    pub async fn get_secret_json<T: DeserializeOwned>(&self, secret_name: &str) -> Result<T, SecretErr> {
        let value = self.get_secret_value(secret_name).await?;
        decode_secret(&value)
    }
}

impl SecretManager for SecretsManagerClient {
    type Err = SecretErr;

    #[tracing::instrument(err, skip(self, var), fields(secret_name = %var.as_ref()))]
    async fn get_secret_value<T: AsRef<str> + Send>(&self, var: T) -> Result<Arc<str>, SecretErr> {
        let result = self
            .inner
            .get_secret_value()
            .secret_id(var.as_ref())
            .send()
            .await
            .map_err(aws_sdk_secretsmanager::Error::from)?;

        if let Some(secret_string) = result.secret_string() {
            return Ok(Arc::from(secret_string));
        }

        Err(SecretErr::NotPresent)
    }
}

/// decode a json secret string into `T`
pub fn decode_secret<T: DeserializeOwned>(value: &str) -> Result<T, SecretErr> {
    Ok(serde_json::from_str(value)?)
}
