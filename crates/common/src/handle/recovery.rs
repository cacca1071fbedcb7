use tracing::{info, warn};

use crate::error::HandleError;
use crate::host::{HostError, ResourceTag, ViewHost, ViewId};

use super::handle::Lifecycle;
use super::BucketHandle;

/// What the deleted-bucket recovery protocol did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOutcome {
    pub bucket: String,
    /// Views closed on the UI context, in the order the host listed them
    pub closed_views: Vec<ViewId>,
}

impl BucketHandle {
    /// Retire every view of this bucket after the remote bucket was found to be gone.
    ///
    /// Runs once per handle: the handle is marked as retiring on entry and a
    /// second call fails with [`HandleError::Retired`]. The steps are, in order:
    /// notify the user, close every open view of the bucket on the UI context
    /// (awaited, or inline when already called from it), refresh the host's
    /// bucket list. The first failing step ends
    /// the protocol and its error is returned.
    pub async fn handle_deleted_bucket(&self) -> Result<RecoveryOutcome, HandleError> {
        self.begin_retiring()?;
        let bucket = self.bucket_name().to_string();
        let host = self.context.host.clone();
        warn!(bucket, "bucket no longer exists, retiring its views");

        host.notify_error(
            "Bucket not found",
            &format!("The bucket '{}' no longer exists.", bucket),
        );

        let closed_views = {
            let host = host.clone();
            let bucket = bucket.clone();
            self.context
                .ui
                .invoke(move || close_bucket_views(host.as_ref(), &bucket))
                .await??
        };

        self.context
            .ui
            .invoke(move || host.refresh(ResourceTag::BucketList))
            .await??;

        info!(bucket, closed = closed_views.len(), "bucket views retired");
        Ok(RecoveryOutcome {
            bucket,
            closed_views,
        })
    }

    fn begin_retiring(&self) -> Result<(), HandleError> {
        let mut lifecycle = self.lifecycle.lock();
        if *lifecycle == Lifecycle::Retiring {
            return Err(HandleError::Retired(self.bucket_name().to_string()));
        }
        *lifecycle = Lifecycle::Retiring;
        Ok(())
    }
}

fn close_bucket_views(host: &dyn ViewHost, bucket: &str) -> Result<Vec<ViewId>, HostError> {
    let mut closed = Vec::new();
    for view in host.open_views() {
        if view.shows_bucket(bucket) {
            host.close_view(&view)?;
            closed.push(view.id);
        }
    }
    Ok(closed)
}
