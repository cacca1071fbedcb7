use bucketfs_object_store::StoreError;

use crate::host::HostError;

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// Failure reported by the object store; never handled locally
    #[error("object store error: {0}")]
    Store(#[from] StoreError),
    #[error("host error: {0}")]
    Host(#[from] HostError),
    /// The background task running the operation panicked or was cancelled
    #[error("background task for {operation} failed: {source}")]
    Background {
        operation: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("ui executor is not running")]
    UiUnavailable,
    #[error("a version id marker requires a key marker")]
    MismatchedMarkers,
    #[error("bucket '{0}' is already being retired")]
    Retired(String),
}

impl HandleError {
    /// Whether the bucket behind the handle no longer exists.
    pub fn is_bucket_missing(&self) -> bool {
        matches!(self, HandleError::Store(e) if e.is_bucket_missing())
    }
}
