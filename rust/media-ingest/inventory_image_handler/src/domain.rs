//! The ingest domain: models, the ports the flow depends on, and the flow itself

pub mod models;
pub mod ports;
pub mod service;
