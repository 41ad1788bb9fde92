use secretsmanager_client::SecretsManagerClient;

use crate::domain::{
    models::{DatabaseCredentials, IngestErr},
    ports::SecretResolver,
};

/// [SecretResolver] backed by aws secrets manager.
/// The secret is expected to be the json document rds writes, i.e. it contains at least
/// `username` and `password`
#[derive(Clone, Debug)]
pub struct SecretsManagerResolver {
    client: SecretsManagerClient,
}

impl SecretsManagerResolver {
    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }
}

impl SecretResolver for SecretsManagerResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve_database_credentials(
        &self,
        secret_name: &str,
    ) -> Result<DatabaseCredentials, IngestErr> {
        self.client
            .get_secret_json::<DatabaseCredentials>(secret_name)
            .await
            .map_err(|e| IngestErr::SecretAccess(e.into()))
    }
}
