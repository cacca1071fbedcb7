//! Versioned in-memory object store.
//!
//! Behaves like a versioned S3 bucket: every write is a new version, deletes
//! write delete markers, listings page with delimiter grouping. Clones share
//! the same buckets, so tests can keep a handle for mutating the store behind
//! the back of the code under test (e.g. deleting a bucket mid-session).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::client::{read_exact_len, DownloadSink, ObjectStoreClient, UploadSource};
use crate::error::{Result, StoreError};
use crate::types::{
    ListObjectsRequest, ListVersionsRequest, ListingEntry, ListingPage, ObjectSummary,
    ObjectVersion, VersionListingPage,
};

/// Marks continuation tokens issued by this store.
const TOKEN_PREFIX: &str = "mem1:";

#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: String,
    // None for a delete marker
    body: Option<Bytes>,
    last_modified: DateTime<Utc>,
}

impl StoredVersion {
    fn size(&self) -> u64 {
        self.body.as_ref().map(|b| b.len() as u64).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct Bucket {
    // versions are kept oldest first
    objects: BTreeMap<String, Vec<StoredVersion>>,
}

impl Bucket {
    fn current(&self, key: &str) -> Option<(&StoredVersion, &Bytes)> {
        let latest = self.objects.get(key)?.last()?;
        latest.body.as_ref().map(|body| (latest, body))
    }

    fn push(&mut self, key: &str, body: Option<Bytes>) -> String {
        let version_id = Uuid::new_v4().simple().to_string();
        self.objects
            .entry(key.to_string())
            .or_default()
            .push(StoredVersion {
                version_id: version_id.clone(),
                body,
                last_modified: Utc::now(),
            });
        version_id
    }
}

/// An in-process, versioned, multi-bucket object store.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    buckets: Arc<RwLock<BTreeMap<String, Bucket>>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given (empty) buckets.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for name in names {
            client.create_bucket(name);
        }
        client
    }

    /// Returns false if the bucket already existed.
    pub fn create_bucket(&self, name: impl Into<String>) -> bool {
        let mut buckets = self.buckets.write();
        let name = name.into();
        if buckets.contains_key(&name) {
            return false;
        }
        buckets.insert(name, Bucket::default());
        true
    }

    /// Drop a bucket and everything in it. Returns false if it did not exist.
    pub fn delete_bucket(&self, name: &str) -> bool {
        self.buckets.write().remove(name).is_some()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.read().keys().cloned().collect()
    }

    /// Keys whose latest version is not a delete marker, in key order.
    pub fn current_keys(&self, bucket: &str) -> Result<Vec<String>> {
        self.with_bucket(bucket, |b| {
            b.objects
                .keys()
                .filter(|key| b.current(key).is_some())
                .cloned()
                .collect()
        })
    }

    /// Body of the latest version of `key`, if it exists.
    pub fn object_bytes(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        self.with_bucket(bucket, |b| b.current(key).map(|(_, body)| body.clone()))
    }

    fn with_bucket<T>(&self, bucket: &str, f: impl FnOnce(&Bucket) -> T) -> Result<T> {
        let buckets = self.buckets.read();
        let b = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        Ok(f(b))
    }

    fn with_bucket_mut<T>(&self, bucket: &str, f: impl FnOnce(&mut Bucket) -> T) -> Result<T> {
        let mut buckets = self.buckets.write();
        let b = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        Ok(f(b))
    }
}

/// The common prefix `key` rolls up into, if the rest of it crosses a delimiter.
fn common_prefix<'a>(key: &'a str, prefix: &str, delimiter: &str) -> Option<&'a str> {
    if delimiter.is_empty() {
        return None;
    }
    let rest = &key[prefix.len()..];
    rest.find(delimiter)
        .map(|i| &key[..prefix.len() + i + delimiter.len()])
}

fn encode_token(name: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, hex::encode(name))
}

fn decode_token(token: &str) -> Result<String> {
    let invalid = || StoreError::InvalidContinuation(token.to_string());
    let encoded = token.strip_prefix(TOKEN_PREFIX).ok_or_else(invalid)?;
    let raw = hex::decode(encoded).map_err(|_| invalid())?;
    String::from_utf8(raw).map_err(|_| invalid())
}

enum VersionItem {
    Version(ObjectVersion),
    Prefix(String),
}

#[async_trait]
impl ObjectStoreClient for MemoryClient {
    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ListingPage> {
        let start_after = request
            .continuation_token
            .as_deref()
            .map(decode_token)
            .transpose()?;
        let max_keys = request.max_keys.max(1);

        self.with_bucket(&request.bucket, |bucket| {
            let mut page = ListingPage::default();

            for (key, versions) in bucket.objects.range(request.prefix.clone()..) {
                if !key.starts_with(&request.prefix) {
                    break;
                }
                let Some(latest) = versions.last() else {
                    continue;
                };
                if latest.body.is_none() {
                    continue;
                }

                let entry = match common_prefix(key, &request.prefix, &request.delimiter) {
                    Some(p) => ListingEntry::Prefix(p.to_string()),
                    None => ListingEntry::Object(ObjectSummary {
                        key: key.clone(),
                        size: latest.size(),
                        last_modified: Some(latest.last_modified),
                        e_tag: Some(latest.version_id.clone()),
                    }),
                };

                if let Some(after) = &start_after {
                    if entry.name() <= after.as_str() {
                        continue;
                    }
                }
                // keys sharing a prefix are contiguous, so only the last entry can repeat
                if entry.is_prefix() && page.entries.last().map(ListingEntry::name) == Some(entry.name()) {
                    continue;
                }
                if page.entries.len() == max_keys {
                    page.next_continuation_token = page.entries.last().map(|e| encode_token(e.name()));
                    break;
                }
                page.entries.push(entry);
            }

            debug!(
                bucket = %request.bucket,
                prefix = %request.prefix,
                entries = page.entries.len(),
                truncated = page.is_truncated(),
                "listed objects"
            );
            page
        })
    }

    async fn list_object_versions(
        &self,
        request: ListVersionsRequest,
    ) -> Result<VersionListingPage> {
        let max_keys = request.max_keys.max(1);

        let buckets = self.buckets.read();
        let bucket = buckets
            .get(&request.bucket)
            .ok_or_else(|| StoreError::BucketNotFound(request.bucket.clone()))?;

        let mut items: Vec<VersionItem> = Vec::new();
        let mut page = VersionListingPage::default();

        'keys: for (key, versions) in bucket.objects.range(request.prefix.clone()..) {
            if !key.starts_with(&request.prefix) {
                break;
            }

            if let Some(p) = common_prefix(key, &request.prefix, &request.delimiter) {
                let after_marker = request.key_marker.as_deref().map_or(true, |m| p > m);
                let repeated = matches!(items.last(), Some(VersionItem::Prefix(last)) if last == p);
                if !after_marker || repeated {
                    continue;
                }
                if items.len() == max_keys {
                    (page.next_key_marker, page.next_version_id_marker) = last_marker(&items);
                    break;
                }
                items.push(VersionItem::Prefix(p.to_string()));
                continue;
            }

            // Within the marker key, resume after the marker version (newest first);
            // a key marker alone skips the whole key.
            let mut past_marker = match request.key_marker.as_deref() {
                None => true,
                Some(m) if key.as_str() > m => true,
                Some(m) if key.as_str() < m => continue,
                Some(_) => {
                    if request.version_id_marker.is_none() {
                        continue;
                    }
                    false
                }
            };

            let last_index = versions.len() - 1;
            for (index, version) in versions.iter().enumerate().rev() {
                if !past_marker {
                    if request.version_id_marker.as_deref() == Some(version.version_id.as_str()) {
                        past_marker = true;
                    }
                    continue;
                }
                if items.len() == max_keys {
                    (page.next_key_marker, page.next_version_id_marker) = last_marker(&items);
                    break 'keys;
                }
                items.push(VersionItem::Version(ObjectVersion {
                    key: key.clone(),
                    version_id: version.version_id.clone(),
                    is_latest: index == last_index,
                    is_delete_marker: version.body.is_none(),
                    size: version.size(),
                    last_modified: Some(version.last_modified),
                }));
            }

            if !past_marker {
                return Err(StoreError::InvalidContinuation(
                    request.version_id_marker.clone().unwrap_or_default(),
                ));
            }
        }

        for item in items {
            match item {
                VersionItem::Version(v) => page.versions.push(v),
                VersionItem::Prefix(p) => page.common_prefixes.push(p),
            }
        }

        debug!(
            bucket = %request.bucket,
            prefix = %request.prefix,
            versions = page.versions.len(),
            truncated = page.is_truncated(),
            "listed object versions"
        );
        Ok(page)
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let version_id = self.with_bucket_mut(bucket, |b| b.push(key, Some(body)))?;
        debug!(bucket, key, version_id = %version_id, "put object");
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.with_bucket_mut(bucket, |b| {
            for key in keys {
                if b.current(key).is_some() {
                    b.push(key, None);
                }
            }
        })
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()> {
        let body = self
            .object_bytes(source_bucket, source_key)?
            .ok_or_else(|| StoreError::NotFound {
                bucket: source_bucket.to_string(),
                key: source_key.to_string(),
            })?;
        self.with_bucket_mut(dest_bucket, |b| b.push(dest_key, Some(body)))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_objects(bucket, &[key.to_string()]).await
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        source: UploadSource,
        length: u64,
    ) -> Result<()> {
        // fail before draining the source
        self.with_bucket(bucket, |_| ())?;

        let mut source = source;
        let body = read_exact_len(&mut source, length as usize).await?;
        self.put_object(bucket, key, Bytes::from(body)).await
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        sink: DownloadSink<'_>,
    ) -> Result<()> {
        let body = self.with_bucket(bucket, |b| match version_id {
            None => b.current(key).map(|(_, body)| body.clone()),
            Some(id) => b
                .objects
                .get(key)
                .and_then(|versions| versions.iter().find(|v| v.version_id == id))
                .and_then(|v| v.body.clone()),
        })?;
        let body = body.ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        sink.write_all(&body).await?;
        sink.flush().await?;
        Ok(())
    }

    fn presigned_url(&self, bucket: &str, key: &str, version_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("memory://{}/", bucket))
            .map_err(|e| StoreError::Signing(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Signing(format!("cannot build a path for bucket {}", bucket)))?
            .pop_if_empty()
            .extend(key.split('/'));
        if let Some(id) = version_id {
            url.query_pairs_mut().append_pair("versionId", id);
        }
        Ok(url)
    }
}

fn last_marker(items: &[VersionItem]) -> (Option<String>, Option<String>) {
    match items.last() {
        Some(VersionItem::Version(v)) => (Some(v.key.clone()), Some(v.version_id.clone())),
        Some(VersionItem::Prefix(p)) => (Some(p.clone()), None),
        None => (None, None),
    }
}
