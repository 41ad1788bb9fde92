#![deny(missing_docs)]
//! This crate provides the standardized initialization process for the media ingest lambdas.
//! This is used to provide consistent behaviour with e.g. tracing configurations

pub use environment::{Environment, EnvironmentErr, UnknownValue};
use tracing_subscriber::EnvFilter;

mod environment;

/// unit struct which defines the behaviour for instantiation
#[derive(Debug)]
pub struct IngestEntrypoint {
    env: Environment,
}

impl Default for IngestEntrypoint {
    fn default() -> Self {
        IngestEntrypoint {
            env: Environment::new_or_prod(),
        }
    }
}

/// sentinel struct which guarantees that we called [IngestEntrypoint::init]
#[derive(Debug)]
pub struct InitializedEntrypoint(());

impl IngestEntrypoint {
    /// create a new instance of [Self] from an input [Environment]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// the [Environment] this entrypoint will initialize for
    pub fn environment(&self) -> Environment {
        self.env
    }

    /// consume self, initialize this binary, and return a proof that it was initialized [InitializedEntrypoint]
    pub fn init(self) -> InitializedEntrypoint {
        dotenv::dotenv().ok();
        std::panic::set_hook(Box::new(tracing_panic::panic_hook));

        match self.env {
            Environment::Local => {
                tracing_subscriber::fmt()
                    .with_ansi(true)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .init();
            }
            Environment::Production | Environment::Develop => {
                // cloudwatch does not render ansi escapes
                tracing_subscriber::fmt()
                    .with_ansi(false)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .init();
            }
        }

        tracing::trace!(environment=%self.env, "initialized entrypoint");

        InitializedEntrypoint(())
    }
}
