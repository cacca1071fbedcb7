//! Shared test utilities for bucket handle integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bucketfs_object_store::{
    DownloadSink, ListObjectsRequest, ListVersionsRequest, ListingPage, MemoryClient,
    ObjectStoreClient, StoreError, UploadSource, VersionListingPage,
};
use bytes::Bytes;
use common::prelude::*;
use parking_lot::Mutex;
use url::Url;

/// A host that records everything a handle asks of it.
#[derive(Default)]
pub struct RecordingHost {
    views: Mutex<Vec<OpenView>>,
    pub closed: Mutex<Vec<ViewId>>,
    pub closed_off_ui: AtomicUsize,
    pub refreshes: Mutex<Vec<ResourceTag>>,
    pub notifications: Mutex<Vec<(String, String)>>,
    pub events: Mutex<Vec<PropertyChange>>,
    /// Reject every close request
    pub fail_closes: AtomicBool,
}

impl RecordingHost {
    pub fn open(&self, file: Arc<dyn Identity>) -> ViewId {
        let view = OpenView::new(file);
        let id = view.id;
        self.views.lock().push(view);
        id
    }

    pub fn open_ids(&self) -> Vec<ViewId> {
        self.views.lock().iter().map(|v| v.id).collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.lock().len()
    }
}

impl ViewHost for RecordingHost {
    fn open_views(&self) -> Vec<OpenView> {
        self.views.lock().clone()
    }

    fn close_view(&self, view: &OpenView) -> Result<(), HostError> {
        if !is_ui_context() {
            self.closed_off_ui.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail_closes.load(Ordering::SeqCst) {
            return Err(HostError::CloseFailed {
                id: view.id,
                reason: "editor has unsaved changes".to_string(),
            });
        }
        let mut views = self.views.lock();
        let index = views
            .iter()
            .position(|v| v.id == view.id)
            .ok_or(HostError::ViewNotOpen(view.id))?;
        views.remove(index);
        self.closed.lock().push(view.id);
        Ok(())
    }

    fn refresh(&self, resource: ResourceTag) -> Result<(), HostError> {
        self.refreshes.lock().push(resource);
        Ok(())
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.notifications
            .lock()
            .push((title.to_string(), message.to_string()));
    }

    fn property_changed(&self, event: &PropertyChange) {
        self.events.lock().push(event.clone());
    }
}

pub struct TestEnv {
    pub store: MemoryClient,
    pub host: Arc<RecordingHost>,
    pub context: HandleContext,
}

impl TestEnv {
    pub fn handle(&self, bucket: &str) -> BucketHandle {
        BucketHandle::new(bucket, Arc::new(self.store.clone()), self.context.clone())
    }

    pub fn handle_with_client(
        &self,
        bucket: &str,
        client: Arc<dyn ObjectStoreClient>,
    ) -> BucketHandle {
        BucketHandle::new(bucket, client, self.context.clone())
    }

    pub async fn put(&self, bucket: &str, key: &str, body: &'static [u8]) {
        self.store
            .put_object(bucket, key, Bytes::from_static(body))
            .await
            .unwrap();
    }
}

/// Set up a memory store with the given buckets, a recording host and a
/// running UI executor. Must be called from within a tokio runtime.
pub fn setup_test_env(buckets: &[&str]) -> TestEnv {
    setup_test_env_with_config(buckets, HandleConfig::default())
}

pub fn setup_test_env_with_config(buckets: &[&str], config: HandleConfig) -> TestEnv {
    let store = MemoryClient::with_buckets(buckets.iter().copied());
    let host = Arc::new(RecordingHost::default());
    let (ui, executor) = ui_channel();
    tokio::spawn(executor.run());
    let context =
        HandleContext::with_config(BackgroundContext::current(), ui, host.clone(), config);
    TestEnv {
        store,
        host,
        context,
    }
}

/// A store whose single and batch deletes always fail.
#[derive(Debug, Clone)]
pub struct FailingDeletes {
    pub inner: MemoryClient,
}

fn injected(operation: &'static str) -> StoreError {
    StoreError::Remote {
        operation,
        message: "injected failure".to_string(),
    }
}

#[async_trait]
impl ObjectStoreClient for FailingDeletes {
    async fn list_objects(
        &self,
        request: ListObjectsRequest,
    ) -> bucketfs_object_store::Result<ListingPage> {
        self.inner.list_objects(request).await
    }

    async fn list_object_versions(
        &self,
        request: ListVersionsRequest,
    ) -> bucketfs_object_store::Result<VersionListingPage> {
        self.inner.list_object_versions(request).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> bucketfs_object_store::Result<()> {
        self.inner.put_object(bucket, key, body).await
    }

    async fn delete_objects(
        &self,
        _bucket: &str,
        _keys: &[String],
    ) -> bucketfs_object_store::Result<()> {
        Err(injected("delete_objects"))
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> bucketfs_object_store::Result<()> {
        self.inner
            .copy_object(source_bucket, source_key, dest_bucket, dest_key)
            .await
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> bucketfs_object_store::Result<()> {
        Err(injected("delete_object"))
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        source: UploadSource,
        length: u64,
    ) -> bucketfs_object_store::Result<()> {
        self.inner.upload(bucket, key, source, length).await
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        sink: DownloadSink<'_>,
    ) -> bucketfs_object_store::Result<()> {
        self.inner.download(bucket, key, version_id, sink).await
    }

    fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> bucketfs_object_store::Result<Url> {
        self.inner.presigned_url(bucket, key, version_id)
    }
}
