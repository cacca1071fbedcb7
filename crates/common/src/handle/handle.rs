use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bucketfs_object_store::{
    ListObjectsRequest, ListVersionsRequest, ListingEntry, ListingPage, ObjectStoreClient,
    VersionListingPage,
};
use bytes::Bytes;
use futures::stream::{self, Stream, TryStreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};
use url::Url;

use crate::context::HandleContext;
use crate::error::HandleError;
use crate::events::PropertyChange;
use crate::identity::{BucketIdentity, Identity};

/// Hierarchy delimiter used by every listing.
pub const DELIMITER: &str = "/";

/// Key of the zero-length marker object standing in for folder `name`.
///
/// Trailing slashes are normalized to exactly one, so `docs` and `docs/` map
/// to the same key.
pub fn folder_key(name: &str) -> String {
    format!("{}{}", name.trim_end_matches('/'), DELIMITER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Live,
    Retiring,
}

/// A remote bucket, viewed from a prefix, exposed to the host as a file.
///
/// Equality and hashing follow the current [`BucketIdentity`] only. Remote
/// operations are not ordered against each other; two concurrent mutations of
/// overlapping keys interleave however the store lets them.
pub struct BucketHandle {
    identity: BucketIdentity,
    client: Arc<dyn ObjectStoreClient>,
    pub(crate) context: HandleContext,
    pub(crate) lifecycle: Mutex<Lifecycle>,
}

impl BucketHandle {
    /// A handle on the root of `bucket_name`.
    pub fn new(
        bucket_name: impl Into<String>,
        client: Arc<dyn ObjectStoreClient>,
        context: HandleContext,
    ) -> Self {
        Self::with_prefix(bucket_name, String::new(), client, context)
    }

    pub fn with_prefix(
        bucket_name: impl Into<String>,
        prefix: impl Into<String>,
        client: Arc<dyn ObjectStoreClient>,
        context: HandleContext,
    ) -> Self {
        Self {
            identity: BucketIdentity::new(bucket_name, prefix),
            client,
            context,
            lifecycle: Mutex::new(Lifecycle::Live),
        }
    }

    pub fn identity(&self) -> &BucketIdentity {
        &self.identity
    }

    pub fn bucket_name(&self) -> &str {
        self.identity.bucket_name()
    }

    pub fn prefix(&self) -> &str {
        self.identity.prefix()
    }

    pub fn display_name(&self) -> String {
        self.identity.display_name()
    }

    pub fn client(&self) -> &Arc<dyn ObjectStoreClient> {
        &self.client
    }

    pub fn context(&self) -> &HandleContext {
        &self.context
    }

    /// Move the handle to a new prefix.
    ///
    /// Always emits one `name` property change to the host, even when the
    /// display name does not change, and returns it.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> PropertyChange {
        let old_name = self.display_name();
        self.identity.set_prefix(prefix.into());
        let event =
            PropertyChange::name_changed(self.identity.clone(), old_name, self.display_name());
        debug!(old = %event.old_value, new = %event.new_value, "bucket handle prefix changed");
        self.context.host.property_changed(&event);
        event
    }

    /// List the immediate children of `prefix`, one page at a time.
    ///
    /// Pass `None` for the first page and the returned
    /// `next_continuation_token` for the ones after. Tokens are checked by the
    /// store, not here.
    pub async fn list_objects(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListingPage, HandleError> {
        let client = self.client.clone();
        let request = ListObjectsRequest {
            bucket: self.bucket_name().to_string(),
            prefix: prefix.to_string(),
            delimiter: DELIMITER.to_string(),
            max_keys: self.context.config.page_size,
            continuation_token,
        };
        debug!(bucket = %request.bucket, prefix = %request.prefix, "listing objects");
        self.context
            .background
            .run("list_objects", async move {
                Ok::<_, HandleError>(client.list_objects(request).await?)
            })
            .await
    }

    /// Every entry under `prefix`, walking the pages of [`BucketHandle::list_objects`] in order.
    pub fn list_all_objects(
        &self,
        prefix: &str,
    ) -> impl Stream<Item = Result<ListingEntry, HandleError>> + '_ {
        let prefix = prefix.to_string();
        stream::try_unfold(Some(None), move |cursor: Option<Option<String>>| {
            let prefix = prefix.clone();
            async move {
                let Some(token) = cursor else {
                    return Ok(None);
                };
                let ListingPage {
                    entries,
                    next_continuation_token,
                } = self.list_objects(&prefix, token).await?;
                let entries = stream::iter(entries.into_iter().map(Ok::<_, HandleError>));
                Ok::<_, HandleError>(Some((entries, next_continuation_token.map(Some))))
            }
        })
        .try_flatten()
    }

    /// List the version history of objects under `key`.
    ///
    /// Both markers are absent for a fresh listing and advance together
    /// afterwards. Returns `None` once there is nothing left to list.
    pub async fn list_object_versions(
        &self,
        key: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
    ) -> Result<Option<VersionListingPage>, HandleError> {
        if key_marker.is_none() && version_id_marker.is_some() {
            return Err(HandleError::MismatchedMarkers);
        }
        let client = self.client.clone();
        let request = ListVersionsRequest {
            bucket: self.bucket_name().to_string(),
            prefix: key.to_string(),
            delimiter: DELIMITER.to_string(),
            max_keys: self.context.config.page_size,
            key_marker,
            version_id_marker,
        };
        debug!(bucket = %request.bucket, key, "listing object versions");
        let page = self
            .context
            .background
            .run("list_object_versions", async move {
                Ok::<_, HandleError>(client.list_object_versions(request).await?)
            })
            .await?;
        Ok((!page.is_empty()).then_some(page))
    }

    /// Create an empty "folder" by writing a zero-length marker object.
    pub async fn new_folder(&self, name: &str) -> Result<(), HandleError> {
        let client = self.client.clone();
        let bucket = self.bucket_name().to_string();
        let key = folder_key(name);
        self.context
            .background
            .run("new_folder", async move {
                debug!(bucket, key, "creating folder marker");
                client.put_object(&bucket, &key, Bytes::new()).await?;
                info!(bucket, key, "created folder");
                Ok::<_, HandleError>(())
            })
            .await
    }

    /// Delete `keys` in a single batch call.
    pub async fn delete_objects(&self, keys: &[String]) -> Result<(), HandleError> {
        if keys.is_empty() {
            return Ok(());
        }
        let client = self.client.clone();
        let bucket = self.bucket_name().to_string();
        let keys = keys.to_vec();
        self.context
            .background
            .run("delete_objects", async move {
                debug!(bucket, count = keys.len(), "deleting objects");
                client.delete_objects(&bucket, &keys).await?;
                info!(bucket, count = keys.len(), "deleted objects");
                Ok::<_, HandleError>(())
            })
            .await
    }

    /// Rename by copying `from_key` to `to_key` and then deleting `from_key`.
    ///
    /// Not atomic. If the delete fails after the copy succeeded, both keys
    /// exist and the delete error is returned; the copy is not rolled back.
    pub async fn rename_object(&self, from_key: &str, to_key: &str) -> Result<(), HandleError> {
        let client = self.client.clone();
        let bucket = self.bucket_name().to_string();
        let from_key = from_key.to_string();
        let to_key = to_key.to_string();
        self.context
            .background
            .run("rename_object", async move {
                debug!(bucket, from = %from_key, to = %to_key, "copying object");
                client
                    .copy_object(&bucket, &from_key, &bucket, &to_key)
                    .await?;
                client.delete_object(&bucket, &from_key).await?;
                info!(bucket, from = %from_key, to = %to_key, "renamed object");
                Ok::<_, HandleError>(())
            })
            .await
    }

    /// Stream exactly `length` bytes from `source` into `key`.
    pub async fn upload<R>(&self, source: R, length: u64, key: &str) -> Result<(), HandleError>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let client = self.client.clone();
        let bucket = self.bucket_name().to_string();
        let key = key.to_string();
        self.context
            .background
            .run("upload", async move {
                debug!(bucket, key, length, "uploading object");
                client.upload(&bucket, &key, Box::new(source), length).await?;
                info!(bucket, key, length, "uploaded object");
                Ok::<_, HandleError>(())
            })
            .await
    }

    /// Stream `key` (the given version, or the latest) into `destination`.
    ///
    /// The destination is handed back once the transfer completes.
    pub async fn download<W>(
        &self,
        key: &str,
        version_id: Option<&str>,
        mut destination: W,
    ) -> Result<W, HandleError>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let client = self.client.clone();
        let bucket = self.bucket_name().to_string();
        let key = key.to_string();
        let version_id = version_id.map(str::to_string);
        self.context
            .background
            .run("download", async move {
                debug!(bucket, key, version_id = ?version_id, "downloading object");
                client
                    .download(&bucket, &key, version_id.as_deref(), &mut destination)
                    .await?;
                Ok::<_, HandleError>(destination)
            })
            .await
    }

    /// A URL for `key`, signed by the store client. Performs no I/O.
    pub fn generate_url(&self, key: &str, version_id: Option<&str>) -> Result<Url, HandleError> {
        Ok(self
            .client
            .presigned_url(self.bucket_name(), key, version_id)?)
    }

    /// Whether the deleted-bucket recovery protocol has been triggered.
    pub fn is_retiring(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Retiring
    }
}

impl fmt::Debug for BucketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketHandle")
            .field("identity", &self.identity)
            .field("client", &self.client)
            .field("lifecycle", &*self.lifecycle.lock())
            .finish()
    }
}

impl fmt::Display for BucketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity)
    }
}

impl PartialEq for BucketHandle {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for BucketHandle {}

impl Hash for BucketHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Identity for BucketHandle {
    fn name(&self) -> String {
        self.display_name()
    }

    fn path(&self) -> String {
        self.identity.path()
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn bucket_name(&self) -> Option<&str> {
        Some(self.identity.bucket_name())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn identity_eq(&self, other: &dyn Identity) -> bool {
        other
            .as_any()
            .downcast_ref::<BucketHandle>()
            .is_some_and(|other| other == self)
    }

    fn identity_hash(&self) -> u64 {
        self.identity.identity_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_key_normalizes_trailing_slashes() {
        assert_eq!(folder_key("docs"), "docs/");
        assert_eq!(folder_key("docs/"), "docs/");
        assert_eq!(folder_key("docs///"), "docs/");
        assert_eq!(folder_key("a/b"), "a/b/");
    }
}
