use anyhow::Context;

/// Port used when `DB_PORT` is not set
pub const DEFAULT_DB_PORT: u16 = 3306;

/// The configuration parameters for the lambda, pulled from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the secrets manager secret holding the database login
    pub secret_name: String,

    /// Region the secret lives in
    pub region: String,

    /// Hostname of the mysql server
    pub db_host: String,

    /// Name of the database holding `InventoryImages`
    pub db_name: String,

    pub db_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret_name = lookup("SECRET_NAME").context("SECRET_NAME must be provided")?;
        let region = lookup("REGION").context("REGION must be provided")?;
        let db_host = lookup("DB_HOST").context("DB_HOST must be provided")?;
        let db_name = lookup("DB_NAME").context("DB_NAME must be provided")?;
        let db_port = match lookup("DB_PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("DB_PORT must be a valid port, got {port}"))?,
            None => DEFAULT_DB_PORT,
        };

        Ok(Config {
            secret_name,
            region,
            db_host,
            db_name,
            db_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name: &str| vars.get(name).map(|v| v.to_string())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("SECRET_NAME", "carshub/mysql"),
        ("REGION", "us-east-1"),
        ("DB_HOST", "carshub.cluster.example.com"),
        ("DB_NAME", "carshub"),
    ];

    #[test]
    fn it_reads_the_required_vars() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(
            config,
            Config {
                secret_name: "carshub/mysql".to_string(),
                region: "us-east-1".to_string(),
                db_host: "carshub.cluster.example.com".to_string(),
                db_name: "carshub".to_string(),
                db_port: DEFAULT_DB_PORT,
            }
        );
    }

    #[test]
    fn it_names_the_missing_var() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(name, _)| *name != "DB_HOST")
            .collect();

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();

        assert_eq!(err.to_string(), "DB_HOST must be provided");
    }

    #[test]
    fn it_reads_an_explicit_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DB_PORT", "3307"));

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.db_port, 3307);
    }

    #[test]
    fn it_rejects_a_bad_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DB_PORT", "mysql"));

        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
