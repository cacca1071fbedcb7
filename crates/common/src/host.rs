//! # Host boundary
//!
//! The view system a bucket handle lives in: a set of open views (editor
//! tabs, tree panes), a notification surface and a property-change bus. The
//! handle only ever talks to the host through [`ViewHost`].

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::events::PropertyChange;
use crate::identity::Identity;

/// Top-level host resources a refresh can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceTag {
    /// The list of buckets at the root of the navigation tree
    BucketList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A view the host currently has open, and the file it shows.
#[derive(Debug, Clone)]
pub struct OpenView {
    pub id: ViewId,
    pub file: Arc<dyn Identity>,
}

impl OpenView {
    pub fn new(file: Arc<dyn Identity>) -> Self {
        Self {
            id: ViewId::new(),
            file,
        }
    }

    /// Whether this view shows (any prefix of) the named bucket.
    pub fn shows_bucket(&self, bucket_name: &str) -> bool {
        self.file.bucket_name() == Some(bucket_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("view {0} is not open")]
    ViewNotOpen(ViewId),
    #[error("failed to close view {id}: {reason}")]
    CloseFailed { id: ViewId, reason: String },
    #[error("failed to refresh {resource:?}: {reason}")]
    RefreshFailed {
        resource: ResourceTag,
        reason: String,
    },
}

/// The host's view system, as seen from a bucket handle.
///
/// `open_views` and `close_view` are only called from the UI context (see
/// [`UiDispatcher`](crate::context::UiDispatcher)).
pub trait ViewHost: Send + Sync + 'static {
    fn open_views(&self) -> Vec<OpenView>;

    fn close_view(&self, view: &OpenView) -> Result<(), HostError>;

    fn refresh(&self, resource: ResourceTag) -> Result<(), HostError>;

    /// Show a user-visible error.
    fn notify_error(&self, title: &str, message: &str);

    fn property_changed(&self, event: &PropertyChange);
}
