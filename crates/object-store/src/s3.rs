//! S3-compatible backend (AWS S3, MinIO, R2, ...).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, IdentityCache, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::client::{read_exact_len, DownloadSink, ObjectStoreClient, UploadSource};
use crate::error::{DeleteFailure, Result, StoreError};
use crate::types::{
    ListObjectsRequest, ListVersionsRequest, ListingEntry, ListingPage, ObjectSummary,
    ObjectVersion, VersionListingPage,
};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Uploads above this size go through a multipart upload with parts of this size.
const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;

const PRESIGN_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Copy sources keep their `/` separators, everything else is escaped.
const COPY_SOURCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Object store client backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: Client,
}

impl S3Client {
    /// Build a client for an S3-compatible endpoint using static credentials.
    ///
    /// # Arguments
    /// * `endpoint` - Endpoint URL (e.g., "http://localhost:9000" for MinIO)
    /// * `access_key` - Access key ID
    /// * `secret_key` - Secret access key
    /// * `region` - Optional region (defaults to "us-east-1")
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str, region: Option<&str>) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "bucketfs-static");
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.unwrap_or(DEFAULT_REGION).to_string()))
            .credentials_provider(credentials)
            .identity_cache(IdentityCache::no_cache())
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();
        Self::from_client(Client::from_conf(config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        source: &mut UploadSource,
        length: u64,
    ) -> Result<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut remaining = length;
        let mut part_number = 1;

        while remaining > 0 {
            let size = remaining.min(MULTIPART_PART_SIZE as u64) as usize;
            let chunk = read_exact_len(source, size).await?;
            let output = self
                .inner
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .map_err(|e| remote_error("UploadPart", bucket, Some(key), e))?;

            debug!(bucket, key, part_number, size, "uploaded part");
            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(output.e_tag().map(str::to_string))
                    .build(),
            );
            remaining -= size as u64;
            part_number += 1;
        }

        Ok(parts)
    }
}

/// Map an SDK failure onto our error taxonomy.
fn remote_error<E, R>(
    operation: &'static str,
    bucket: &str,
    key: Option<&str>,
    err: SdkError<E, R>,
) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some("NoSuchBucket") => StoreError::BucketNotFound(bucket.to_string()),
        Some("NoSuchKey") | Some("NoSuchVersion") => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.unwrap_or_default().to_string(),
        },
        _ => StoreError::Remote {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

fn to_chrono(time: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

fn non_empty(delimiter: &str) -> Option<String> {
    (!delimiter.is_empty()).then(|| delimiter.to_string())
}

#[async_trait]
impl ObjectStoreClient for S3Client {
    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ListingPage> {
        let output = self
            .inner
            .list_objects_v2()
            .bucket(&request.bucket)
            .prefix(&request.prefix)
            .set_delimiter(non_empty(&request.delimiter))
            .max_keys(request.max_keys as i32)
            .set_continuation_token(request.continuation_token.clone())
            .send()
            .await
            .map_err(|e| remote_error("ListObjectsV2", &request.bucket, None, e))?;

        let mut entries: Vec<ListingEntry> = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ListingEntry::Object(ObjectSummary {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_chrono),
                    e_tag: object.e_tag().map(str::to_string),
                }))
            })
            .collect();
        entries.extend(
            output
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix())
                .map(|p| ListingEntry::Prefix(p.to_string())),
        );
        entries.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(ListingPage {
            entries,
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn list_object_versions(
        &self,
        request: ListVersionsRequest,
    ) -> Result<VersionListingPage> {
        let output = self
            .inner
            .list_object_versions()
            .bucket(&request.bucket)
            .prefix(&request.prefix)
            .set_delimiter(non_empty(&request.delimiter))
            .max_keys(request.max_keys as i32)
            .set_key_marker(request.key_marker.clone())
            .set_version_id_marker(request.version_id_marker.clone())
            .send()
            .await
            .map_err(|e| remote_error("ListObjectVersions", &request.bucket, None, e))?;

        let mut versions: Vec<ObjectVersion> = output
            .versions()
            .iter()
            .filter_map(|v| {
                Some(ObjectVersion {
                    key: v.key()?.to_string(),
                    version_id: v.version_id().unwrap_or("null").to_string(),
                    is_latest: v.is_latest().unwrap_or(false),
                    is_delete_marker: false,
                    size: v.size().unwrap_or(0).max(0) as u64,
                    last_modified: v.last_modified().and_then(to_chrono),
                })
            })
            .collect();
        versions.extend(output.delete_markers().iter().filter_map(|m| {
            Some(ObjectVersion {
                key: m.key()?.to_string(),
                version_id: m.version_id().unwrap_or("null").to_string(),
                is_latest: m.is_latest().unwrap_or(false),
                is_delete_marker: true,
                size: 0,
                last_modified: m.last_modified().and_then(to_chrono),
            })
        }));
        // the SDK splits markers from versions; restore key order, newest first
        versions.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| b.last_modified.cmp(&a.last_modified))
        });

        let truncated = output.is_truncated().unwrap_or(false);
        Ok(VersionListingPage {
            versions,
            common_prefixes: output
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix().map(str::to_string))
                .collect(),
            next_key_marker: output
                .next_key_marker()
                .filter(|_| truncated)
                .map(str::to_string),
            next_version_id_marker: output
                .next_version_id_marker()
                .filter(|_| truncated)
                .map(str::to_string),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| remote_error("PutObject", bucket, Some(key), e))?;
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        let invalid = |e: aws_sdk_s3::error::BuildError| StoreError::Remote {
            operation: "DeleteObjects",
            message: e.to_string(),
        };
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid)?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(invalid)?;

        let output = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| remote_error("DeleteObjects", bucket, None, e))?;

        let failed: Vec<DeleteFailure> = output
            .errors()
            .iter()
            .map(|e| DeleteFailure {
                key: e.key().unwrap_or_default().to_string(),
                code: e.code().map(str::to_string),
                message: e.message().map(str::to_string),
            })
            .collect();
        if !failed.is_empty() {
            return Err(StoreError::PartialDelete {
                bucket: bucket.to_string(),
                failed,
            });
        }
        Ok(())
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()> {
        let copy_source = format!(
            "{}/{}",
            source_bucket,
            utf8_percent_encode(source_key, COPY_SOURCE_ENCODE_SET)
        );
        self.inner
            .copy_object()
            .copy_source(copy_source)
            .bucket(dest_bucket)
            .key(dest_key)
            .send()
            .await
            .map_err(|e| remote_error("CopyObject", dest_bucket, Some(source_key), e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| remote_error("DeleteObject", bucket, Some(key), e))?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        source: UploadSource,
        length: u64,
    ) -> Result<()> {
        let mut source = source;
        if length <= MULTIPART_PART_SIZE as u64 {
            let body = read_exact_len(&mut source, length as usize).await?;
            return self.put_object(bucket, key, Bytes::from(body)).await;
        }

        let created = self
            .inner
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| remote_error("CreateMultipartUpload", bucket, Some(key), e))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| StoreError::Remote {
                operation: "CreateMultipartUpload",
                message: "response carried no upload id".to_string(),
            })?
            .to_string();

        let parts = match self
            .upload_parts(bucket, key, &upload_id, &mut source, length)
            .await
        {
            Ok(parts) => parts,
            Err(e) => {
                if let Err(abort) = self
                    .inner
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(bucket, key, upload_id = %upload_id, error = %DisplayErrorContext(&abort), "failed to abort multipart upload");
                }
                return Err(e);
            }
        };

        self.inner
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| remote_error("CompleteMultipartUpload", bucket, Some(key), e))?;
        Ok(())
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        sink: DownloadSink<'_>,
    ) -> Result<()> {
        let output = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .send()
            .await
            .map_err(|e| remote_error("GetObject", bucket, Some(key), e))?;

        let mut body = output.body;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        {
            sink.write_all(&chunk).await?;
        }
        sink.flush().await?;
        Ok(())
    }

    fn presigned_url(&self, bucket: &str, key: &str, version_id: Option<&str>) -> Result<Url> {
        let config = PresigningConfig::expires_in(PRESIGN_EXPIRY)
            .map_err(|e| StoreError::Signing(e.to_string()))?;

        // The SDK arms timers while signing; callers off a runtime get a throwaway one.
        let fallback = match tokio::runtime::Handle::try_current() {
            Ok(_) => None,
            Err(_) => Some(
                tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .map_err(|e| StoreError::Signing(e.to_string()))?,
            ),
        };
        let _entered = fallback.as_ref().map(|runtime| runtime.enter());

        // Static credentials resolve without I/O; anything else would have to wait.
        let request = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .presigned(config)
            .now_or_never()
            .ok_or_else(|| {
                StoreError::Signing("signing could not complete without awaiting I/O".to_string())
            })?
            .map_err(|e| remote_error("PresignGetObject", bucket, Some(key), e))?;

        Url::parse(request.uri()).map_err(|e| StoreError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_keeps_separators() {
        let encoded = utf8_percent_encode("dir one/file+1.txt", COPY_SOURCE_ENCODE_SET).to_string();
        assert_eq!(encoded, "dir%20one/file%2B1.txt");
    }

    fn local_client() -> S3Client {
        S3Client::new("http://localhost:9000", "ak", "sk", None)
    }

    fn assert_signed_version_url(url: &Url) {
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "/docs/a%20b/c.txt");
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("versionId".to_string(), "v1".to_string())));
        assert!(params.iter().any(|(name, _)| name == "X-Amz-Signature"));
    }

    #[test]
    fn test_presigned_url_off_runtime() {
        let url = local_client()
            .presigned_url("docs", "a b/c.txt", Some("v1"))
            .unwrap();
        assert_signed_version_url(&url);
    }

    #[tokio::test]
    async fn test_presigned_url_on_runtime() {
        let url = local_client()
            .presigned_url("docs", "a b/c.txt", Some("v1"))
            .unwrap();
        assert_signed_version_url(&url);
    }

    #[test]
    fn test_empty_delimiter_is_omitted() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("/"), Some("/".to_string()));
    }
}
