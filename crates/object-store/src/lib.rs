//! Object store clients for bucket views
//!
//! This crate defines the narrow set of object store operations a bucket view
//! needs, and the backends that provide them.
//!
//! # Features
//!
//! - Delimiter-aware, paginated listings of current objects and of version history
//! - Object lifecycle: put, batch delete, server-side copy, streamed upload/download
//! - URL generation without network I/O
//! - Backends: versioned in-memory store, S3-compatible stores
//!
//! # Example
//!
//! ```rust,no_run
//! use bucketfs_object_store::{ListObjectsRequest, StoreConfig};
//!
//! # async fn example() -> Result<(), bucketfs_object_store::StoreError> {
//! let config = StoreConfig::Memory { buckets: vec!["photos".to_string()] };
//! let client = config.build()?;
//!
//! let page = client
//!     .list_objects(ListObjectsRequest {
//!         bucket: "photos".to_string(),
//!         delimiter: "/".to_string(),
//!         max_keys: 300,
//!         ..Default::default()
//!     })
//!     .await?;
//! for key in page.keys() {
//!     println!("{}", key);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod memory;
mod s3;
mod types;

pub use client::{DownloadSink, ObjectStoreClient, UploadSource};
pub use config::StoreConfig;
pub use error::{DeleteFailure, Result, StoreError};
pub use memory::MemoryClient;
pub use s3::{S3Client, DEFAULT_REGION};
pub use types::{
    ListObjectsRequest, ListVersionsRequest, ListingEntry, ListingPage, ObjectSummary,
    ObjectVersion, VersionListingPage,
};
