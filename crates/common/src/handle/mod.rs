//! # Bucket handle
//!
//! A [`BucketHandle`] presents one bucket (viewed from a prefix) to a host as
//! a single file. It owns the bucket identity, runs every remote operation on
//! the background context and implements the deleted-bucket recovery
//! protocol.

#[allow(clippy::module_inception)]
mod handle;
mod recovery;

pub use handle::{folder_key, BucketHandle, DELIMITER};
pub use recovery::RecoveryOutcome;
