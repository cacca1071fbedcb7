use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use url::Url;

use crate::error::{Result, StoreError};
use crate::types::{ListObjectsRequest, ListVersionsRequest, ListingPage, VersionListingPage};

/// Reader handed to [`ObjectStoreClient::upload`].
pub type UploadSource = Box<dyn AsyncRead + Send + Unpin>;

/// Writer handed to [`ObjectStoreClient::download`].
pub type DownloadSink<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// The object store operations a bucket view is built on.
///
/// Calls are stateless: one client is shared (behind an `Arc`) by every
/// handle and may serve any number of concurrent operations. No ordering is
/// implied between calls.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + Debug + 'static {
    /// List the current objects and common prefixes under `request.prefix`.
    ///
    /// A missing `continuation_token` always starts from the first page.
    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ListingPage>;

    /// List object versions (and delete markers) under `request.prefix`.
    async fn list_object_versions(&self, request: ListVersionsRequest)
        -> Result<VersionListingPage>;

    /// Write `body` to `key` in a single request.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;

    /// Delete a batch of keys in one request.
    ///
    /// # Returns
    /// * `Err(StoreError::PartialDelete)` - the store rejected some of the keys
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;

    /// Server-side copy of the latest version of `source_key`.
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Stream exactly `length` bytes from `source` into `key`.
    async fn upload(&self, bucket: &str, key: &str, source: UploadSource, length: u64)
        -> Result<()>;

    /// Stream an object (a specific version if given, else the latest) into `sink`.
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        sink: DownloadSink<'_>,
    ) -> Result<()>;

    /// Build a URL for the object. Never performs network I/O.
    fn presigned_url(&self, bucket: &str, key: &str, version_id: Option<&str>) -> Result<Url>;
}

/// Read exactly `len` bytes from an upload source.
///
/// A source that ends early is an `UnexpectedEof` I/O error.
pub(crate) async fn read_exact_len(source: &mut UploadSource, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    source.read_exact(&mut buf).await.map_err(StoreError::Io)?;
    Ok(buf)
}
