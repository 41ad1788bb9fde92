//! Lambda which records uploaded inventory images.
//!
//! An upload into the media bucket produces an s3 notification which is delivered through sqs.
//! For each delivery we read the metadata attached to the uploaded object and write one row into
//! the `InventoryImages` table.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
