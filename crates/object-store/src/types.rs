//! Request and page types shared by every client.

use chrono::{DateTime, Utc};

/// Parameters of a delimiter-aware listing of current objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: String,
    pub delimiter: String,
    pub max_keys: usize,
    pub continuation_token: Option<String>,
}

/// Parameters of a delimiter-aware listing of object versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListVersionsRequest {
    pub bucket: String,
    pub prefix: String,
    pub delimiter: String,
    pub max_keys: usize,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// Summary of a current object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub e_tag: Option<String>,
}

/// One row of a listing: an object, or a common prefix standing in for a "directory".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    Object(ObjectSummary),
    Prefix(String),
}

impl ListingEntry {
    /// The key or prefix this entry is named by.
    pub fn name(&self) -> &str {
        match self {
            ListingEntry::Object(object) => &object.key,
            ListingEntry::Prefix(prefix) => prefix,
        }
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, ListingEntry::Prefix(_))
    }
}

/// A page of current objects and common prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    /// Absent once the listing is exhausted
    pub next_continuation_token: Option<String>,
}

impl ListingPage {
    pub fn is_truncated(&self) -> bool {
        self.next_continuation_token.is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ListingEntry::name)
    }
}

/// One historical revision of an object (or a delete marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    pub is_delete_marker: bool,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A page of a version listing, paged by a (key, version id) marker pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionListingPage {
    pub versions: Vec<ObjectVersion>,
    pub common_prefixes: Vec<String>,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

impl VersionListingPage {
    pub fn is_truncated(&self) -> bool {
        self.next_key_marker.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.common_prefixes.is_empty()
    }
}
