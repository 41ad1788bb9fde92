//! Inbound adapters which drive the domain

pub mod lambda;
