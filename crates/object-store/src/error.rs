//! Error types for object store clients.

/// A single key the store refused to delete as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub key: String,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Errors that can occur when talking to an object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket does not exist (or no longer exists)
    #[error("bucket '{0}' does not exist")]
    BucketNotFound(String),

    /// Object (or object version) not found
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// A continuation token this store did not issue
    #[error("invalid continuation token: {0}")]
    InvalidContinuation(String),

    /// Some keys of a batch delete were rejected by the store
    #[error("failed to delete {} object(s) from '{bucket}'", failed.len())]
    PartialDelete {
        bucket: String,
        failed: Vec<DeleteFailure>,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL signing could not complete without I/O
    #[error("url signing error: {0}")]
    Signing(String),

    /// Any other failure reported by the remote store
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// IO error while streaming an object body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error means the bucket itself is gone.
    pub fn is_bucket_missing(&self) -> bool {
        matches!(self, StoreError::BucketNotFound(_))
    }
}

/// Result type alias for object store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
