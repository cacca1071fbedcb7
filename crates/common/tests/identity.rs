//! Integration tests for handle identity and prefix changes

mod common;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ::common::prelude::*;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[tokio::test]
async fn test_display_name_follows_prefix() {
    let env = common::setup_test_env(&["photos"]);
    let mut handle = env.handle("photos");
    assert_eq!(handle.display_name(), "photos");
    assert_eq!(handle.name(), "photos");

    handle.set_prefix("2024/june");
    assert_eq!(handle.display_name(), "photos/2024/june");
    assert_eq!(handle.bucket_name(), "photos");

    handle.set_prefix("   ");
    assert_eq!(handle.display_name(), "photos");
    assert_eq!(handle.bucket_name(), "photos");
}

#[tokio::test]
async fn test_equality_and_hash_follow_bucket_and_prefix() {
    let env = common::setup_test_env(&["photos"]);
    let mut a = env.handle("photos");
    let mut b = env.handle("photos");
    assert_eq!(a, b);
    assert!(a.identity_eq(&b) && b.identity_eq(&a));
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.identity_hash(), b.identity_hash());

    a.set_prefix("Raw");
    b.set_prefix("raw");
    assert_ne!(a, b);
    assert!(!a.identity_eq(&b));

    b.set_prefix("Raw");
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let other = env.handle("videos");
    assert_ne!(env.handle("photos"), other);
}

#[tokio::test]
async fn test_handle_never_equals_other_identity_types() {
    let env = common::setup_test_env(&["photos"]);
    let handle = env.handle("photos");
    let identity = BucketIdentity::root("photos");

    assert_eq!(handle.name(), identity.name());
    assert!(!handle.identity_eq(&identity));
    assert!(!identity.identity_eq(&handle));
}

#[tokio::test]
async fn test_fixed_host_facts_survive_state_changes() {
    let env = common::setup_test_env(&["photos"]);
    let mut handle = env.handle("photos");

    let check = |handle: &BucketHandle| {
        assert!(!handle.is_directory());
        assert!(!handle.is_writable());
        assert!(handle.is_valid());
        assert_eq!(handle.path(), "photos");
    };

    check(&handle);
    handle.set_prefix("deep/nested/");
    check(&handle);

    env.store.delete_bucket("photos");
    check(&handle);
}

#[tokio::test]
async fn test_set_prefix_emits_one_event_per_call() {
    let env = common::setup_test_env(&["photos"]);
    let mut handle = env.handle("photos");

    let event = handle.set_prefix("trips");
    assert_eq!(event.property, NAME_PROPERTY);
    assert_eq!(event.old_value, "photos");
    assert_eq!(event.new_value, "photos/trips");
    assert_eq!(event.source, BucketIdentity::new("photos", "trips"));
    assert_eq!(env.host.events.lock().len(), 1);

    // same value again still notifies
    let event = handle.set_prefix("trips");
    assert!(event.is_unchanged());
    assert_eq!(env.host.events.lock().len(), 2);

    // a blank prefix renders the same name as an empty one
    handle.set_prefix("");
    let event = handle.set_prefix(" ");
    assert!(event.is_unchanged());
    assert_eq!(env.host.events.lock().len(), 4);
    assert_eq!(env.host.events.lock()[3], event);
}
