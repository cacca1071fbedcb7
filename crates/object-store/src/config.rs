//! Backend configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::ObjectStoreClient;
use crate::error::{Result, StoreError};
use crate::memory::MemoryClient;
use crate::s3::S3Client;

/// Configuration for the object store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory storage (for testing)
    Memory {
        /// Buckets created when the store is built
        #[serde(default)]
        buckets: Vec<String>,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory {
            buckets: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Build the client this configuration describes.
    pub fn build(&self) -> Result<Arc<dyn ObjectStoreClient>> {
        let client: Arc<dyn ObjectStoreClient> = match self {
            StoreConfig::Memory { buckets } => {
                Arc::new(MemoryClient::with_buckets(buckets.iter().cloned()))
            }

            StoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                region,
            } => {
                Url::parse(endpoint).map_err(|e| {
                    StoreError::InvalidConfig(format!("invalid endpoint '{}': {}", endpoint, e))
                })?;
                if access_key.is_empty() || secret_key.is_empty() {
                    return Err(StoreError::InvalidConfig(
                        "access_key and secret_key must be set".to_string(),
                    ));
                }
                Arc::new(S3Client::new(
                    endpoint,
                    access_key,
                    secret_key,
                    region.as_deref(),
                ))
            }
        };

        Ok(client)
    }
}
