/**
 * Host-agnostic identity of a bucket view, and the
 *  capability hosts use to cache and match open files.
 */
pub mod identity;
/**
 * Property-change notifications pushed to the host.
 */
pub mod events;
/**
 * The boundary to the host's view system:
 *  open views, closing, refresh and notifications.
 */
pub mod host;
/**
 * Background and UI execution contexts, and the
 *  configuration shared by every handle.
 */
pub mod context;
/**
 * The bucket-as-file façade: listing, mutation and
 *  the deleted-bucket recovery protocol.
 */
pub mod handle;

pub mod error;

pub mod prelude {
    pub use crate::context::{
        is_ui_context, ui_channel, BackgroundContext, HandleConfig, HandleContext,
        UiDispatcher, UiExecutor, DEFAULT_PAGE_SIZE,
    };
    pub use crate::error::HandleError;
    pub use crate::events::{PropertyChange, NAME_PROPERTY};
    pub use crate::handle::{folder_key, BucketHandle, RecoveryOutcome};
    pub use crate::host::{HostError, OpenView, ResourceTag, ViewHost, ViewId};
    pub use crate::identity::{BucketIdentity, Identity};
}
