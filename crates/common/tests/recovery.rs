//! Integration tests for the deleted-bucket recovery protocol

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ::common::prelude::*;

#[tokio::test]
async fn test_recovery_closes_only_matching_views() {
    let env = common::setup_test_env(&["photos", "videos"]);
    let handle = env.handle("photos");

    let root_view = env.host.open(Arc::new(env.handle("photos")));
    let mut nested = env.handle("photos");
    nested.set_prefix("2024/");
    let nested_view = env.host.open(Arc::new(nested));
    let other_view = env.host.open(Arc::new(env.handle("videos")));

    env.store.delete_bucket("photos");
    let err = handle.list_objects("", None).await.unwrap_err();
    assert!(err.is_bucket_missing());

    let outcome = handle.handle_deleted_bucket().await.unwrap();
    assert_eq!(outcome.bucket, "photos");
    assert_eq!(outcome.closed_views, vec![root_view, nested_view]);

    assert_eq!(env.host.open_ids(), vec![other_view]);
    assert_eq!(*env.host.closed.lock(), vec![root_view, nested_view]);
    assert_eq!(*env.host.refreshes.lock(), vec![ResourceTag::BucketList]);
    assert_eq!(env.host.closed_off_ui.load(Ordering::SeqCst), 0);
    assert!(handle.is_retiring());
}

#[tokio::test]
async fn test_recovery_notifies_before_closing() {
    let env = common::setup_test_env(&[]);
    let handle = env.handle("photos");

    handle.handle_deleted_bucket().await.unwrap();

    let notifications = env.host.notifications.lock().clone();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].1.contains("photos"));
    assert_eq!(env.host.refresh_count(), 1);
}

#[tokio::test]
async fn test_recovery_runs_once() {
    let env = common::setup_test_env(&["photos"]);
    let handle = env.handle("photos");
    assert!(!handle.is_retiring());

    handle.handle_deleted_bucket().await.unwrap();
    let err = handle.handle_deleted_bucket().await.unwrap_err();
    assert!(matches!(err, HandleError::Retired(ref bucket) if bucket == "photos"));
    assert_eq!(env.host.refresh_count(), 1);
    assert_eq!(env.host.notifications.lock().len(), 1);
}

#[tokio::test]
async fn test_recovery_without_ui_executor_fails() {
    let env = common::setup_test_env(&["photos"]);
    let (ui, executor) = ui_channel();
    drop(executor);
    let mut context = env.context.clone();
    context.ui = ui;
    let handle = BucketHandle::new("photos", Arc::new(env.store.clone()), context);

    let view = env.host.open(Arc::new(env.handle("photos")));
    let err = handle.handle_deleted_bucket().await.unwrap_err();
    assert!(matches!(err, HandleError::UiUnavailable));

    // nothing was closed or refreshed
    assert_eq!(env.host.open_ids(), vec![view]);
    assert_eq!(env.host.refresh_count(), 0);
}

#[tokio::test]
async fn test_other_operations_still_run_while_retiring() {
    let env = common::setup_test_env(&["photos"]);
    env.put("photos", "a.jpg", b"jpg").await;
    let handle = env.handle("photos");

    handle.handle_deleted_bucket().await.unwrap();
    let page = handle.list_objects("", None).await.unwrap();
    assert_eq!(page.keys().collect::<Vec<_>>(), vec!["a.jpg"]);
}

#[tokio::test]
async fn test_recovery_stops_at_failed_close() {
    let env = common::setup_test_env(&["photos", "videos"]);
    let handle = env.handle("photos");
    let first = env.host.open(Arc::new(env.handle("photos")));
    let second = env.host.open(Arc::new(env.handle("photos")));
    let other = env.host.open(Arc::new(env.handle("videos")));
    env.host.fail_closes.store(true, Ordering::SeqCst);

    let err = handle.handle_deleted_bucket().await.unwrap_err();
    assert!(matches!(
        err,
        HandleError::Host(HostError::CloseFailed { id, .. }) if id == first
    ));

    assert_eq!(env.host.open_ids(), vec![first, second, other]);
    assert!(env.host.closed.lock().is_empty());
    assert_eq!(env.host.refresh_count(), 0);
    assert_eq!(env.host.notifications.lock().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_recovery_from_blocking_ui_thread() {
    let env = common::setup_test_env(&["photos", "videos"]);
    let (ui, executor) = ui_channel();
    let ui_thread = std::thread::spawn(move || executor.run_blocking());

    let mut context = env.context.clone();
    context.ui = ui.clone();
    let handle = Arc::new(BucketHandle::new(
        "photos",
        Arc::new(env.store.clone()),
        context,
    ));
    let view = env.host.open(Arc::new(env.handle("photos")));
    let other = env.host.open(Arc::new(env.handle("videos")));

    // a UI handler that notices the missing bucket and recovers synchronously
    let runtime = tokio::runtime::Handle::current();
    let on_ui = {
        let handle = handle.clone();
        ui.invoke(move || runtime.block_on(handle.handle_deleted_bucket()))
    };
    let outcome = tokio::time::timeout(Duration::from_secs(5), on_ui)
        .await
        .expect("recovery on the UI thread completed")
        .unwrap()
        .unwrap();

    assert_eq!(outcome.closed_views, vec![view]);
    assert_eq!(env.host.open_ids(), vec![other]);
    assert_eq!(env.host.closed_off_ui.load(Ordering::SeqCst), 0);
    assert_eq!(*env.host.refreshes.lock(), vec![ResourceTag::BucketList]);

    drop(handle);
    drop(ui);
    ui_thread.join().unwrap();
}
