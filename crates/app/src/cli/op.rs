use std::error::Error;
use std::sync::Arc;

use bucketfs_object_store::{ObjectStoreClient, StoreError};
use common::prelude::*;

use crate::host::ConsoleHost;
use crate::state::AppState;

#[derive(Clone)]
pub struct OpContext {
    /// Bucket selected with `--bucket`
    pub bucket: Option<String>,
    pub client: Arc<dyn ObjectStoreClient>,
    pub host: Arc<ConsoleHost>,
    pub context: HandleContext,
}

impl OpContext {
    /// Build the store client and start the UI executor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(bucket: Option<String>, state: &AppState) -> Result<Self, StoreError> {
        let client = state.config.store.build()?;
        let host = Arc::new(ConsoleHost::new());
        let (ui, executor) = ui_channel();
        tokio::spawn(executor.run());
        let context = HandleContext::with_config(
            BackgroundContext::current(),
            ui,
            host.clone(),
            state.config.handle_config(),
        );
        Ok(Self {
            bucket,
            client,
            host,
            context,
        })
    }

    /// Open a view of the selected bucket and return a handle on it.
    pub fn open_bucket(&self) -> Result<BucketHandle, BucketOpError> {
        let bucket = self.bucket.as_deref().ok_or(BucketOpError::NoBucket)?;
        let handle = BucketHandle::new(bucket, self.client.clone(), self.context.clone());
        self.host.open(Arc::new(handle.identity().clone()));
        Ok(handle)
    }
}

/// Errors shared by every command that operates on a bucket.
#[derive(Debug, thiserror::Error)]
pub enum BucketOpError {
    #[error("--bucket is required for this command")]
    NoBucket,
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error("{source} (retiring the bucket's views also failed: {recovery})")]
    Recovery {
        source: HandleError,
        recovery: HandleError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pass `result` through, retiring the bucket's views first if it failed
/// because the bucket no longer exists.
///
/// A failed retirement is reported alongside the original error.
pub async fn or_recover<T>(
    handle: &BucketHandle,
    result: Result<T, HandleError>,
) -> Result<T, BucketOpError> {
    match result {
        Err(err) if err.is_bucket_missing() => match handle.handle_deleted_bucket().await {
            Ok(_) => Err(err.into()),
            Err(recovery) => {
                tracing::warn!(error = %recovery, "bucket recovery failed");
                Err(BucketOpError::Recovery {
                    source: err,
                    recovery,
                })
            }
        },
        other => other.map_err(BucketOpError::from),
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
