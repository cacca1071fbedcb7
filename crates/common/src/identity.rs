//! # Identity
//!
//! Hosts cache and match open files by identity: a display name, equality and
//! a hash. A bucket view's identity is the pair (bucket name, prefix) and
//! nothing else. The client it talks to and the remote state of the bucket
//! play no part.
//!
//! Identities are derived from *current* field values. A handle whose prefix
//! changes hashes differently afterwards, so it must not sit in a hash-keyed
//! structure across [`BucketHandle::set_prefix`](crate::handle::BucketHandle::set_prefix).

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// What a host's file abstraction needs to know about an entry.
///
/// The directory/writable/valid answers describe how the host should treat the
/// entry, not the state of anything remote.
pub trait Identity: Any + Send + Sync + fmt::Debug {
    /// Display name used for caching and editor matching.
    fn name(&self) -> String;

    fn path(&self) -> String;

    fn is_directory(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn is_valid(&self) -> bool;

    /// The bucket this entry views, if it is a bucket view.
    fn bucket_name(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    /// Equality across identity types. An identity of another concrete type is never equal.
    fn identity_eq(&self, other: &dyn Identity) -> bool;

    /// Hash consistent with [`Identity::identity_eq`].
    fn identity_hash(&self) -> u64;
}

/// The host-agnostic identity of a bucket view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketIdentity {
    bucket_name: String,
    prefix: String,
}

impl BucketIdentity {
    pub fn new(bucket_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            prefix: prefix.into(),
        }
    }

    /// The identity of a bucket viewed from its root.
    pub fn root(bucket_name: impl Into<String>) -> Self {
        Self::new(bucket_name, String::new())
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `bucket` when the prefix is blank, `bucket/prefix` otherwise.
    pub fn display_name(&self) -> String {
        if self.prefix.trim().is_empty() {
            self.bucket_name.clone()
        } else {
            format!("{}/{}", self.bucket_name, self.prefix)
        }
    }

    pub(crate) fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }
}

impl fmt::Display for BucketIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Identity for BucketIdentity {
    fn name(&self) -> String {
        self.display_name()
    }

    fn path(&self) -> String {
        self.bucket_name.clone()
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
        Some(&self.bucket_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn identity_eq(&self, other: &dyn Identity) -> bool {
        other
            .as_any()
            .downcast_ref::<BucketIdentity>()
            .is_some_and(|other| other == self)
    }

    fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct LocalFile(String);

    impl Identity for LocalFile {
        fn name(&self) -> String {
            self.0.clone()
        }
        fn path(&self) -> String {
            self.0.clone()
        }
        fn is_directory(&self) -> bool {
            false
        }
        fn is_writable(&self) -> bool {
            true
        }
        fn is_valid(&self) -> bool {
            true
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn identity_eq(&self, other: &dyn Identity) -> bool {
            other
                .as_any()
                .downcast_ref::<LocalFile>()
                .is_some_and(|other| other.0 == self.0)
        }
        fn identity_hash(&self) -> u64 {
            let mut hasher = DefaultHasher::new();
            self.0.hash(&mut hasher);
            hasher.finish()
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(BucketIdentity::root("photos").display_name(), "photos");
        assert_eq!(BucketIdentity::new("photos", "  ").display_name(), "photos");
        assert_eq!(
            BucketIdentity::new("photos", "2024/june").display_name(),
            "photos/2024/june"
        );
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        let a = BucketIdentity::new("photos", "Trips");
        let b = BucketIdentity::new("photos", "trips");
        assert_ne!(a, b);
        assert!(!a.identity_eq(&b));

        let c = BucketIdentity::new("photos", "Trips");
        assert!(a.identity_eq(&c) && c.identity_eq(&a));
        assert_eq!(a.identity_hash(), c.identity_hash());
    }

    #[test]
    fn test_other_identity_types_never_equal() {
        let bucket = BucketIdentity::root("photos");
        let file = LocalFile("photos".to_string());
        assert_eq!(bucket.name(), file.name());
        assert!(!bucket.identity_eq(&file));
        assert!(!file.identity_eq(&bucket));
    }

    #[test]
    fn test_fixed_host_facts() {
        let id = BucketIdentity::new("photos", "raw/");
        assert!(!id.is_directory());
        assert!(!id.is_writable());
        assert!(id.is_valid());
        assert_eq!(id.path(), "photos");
        assert_eq!(Identity::bucket_name(&id), Some("photos"));
    }
}
