use std::future::Future;

use tokio::runtime::Handle;
use tracing::Instrument;

use crate::error::HandleError;

/// The execution context every remote operation runs on.
///
/// Operations are spawned onto the runtime and awaited, so the caller only
/// suspends; it never blocks the thread it was called from. Cancellation and
/// timeouts are whatever the runtime and the store client provide.
#[derive(Debug, Clone)]
pub struct BackgroundContext {
    runtime: Handle,
}

impl BackgroundContext {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Use the runtime of the calling task.
    ///
    /// # Panics
    /// When called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub async fn run<F, T>(&self, operation: &'static str, task: F) -> Result<T, HandleError>
    where
        F: Future<Output = Result<T, HandleError>> + Send + 'static,
        T: Send + 'static,
    {
        let span = tracing::debug_span!("bucket_op", operation);
        self.runtime
            .spawn(task.instrument(span))
            .await
            .map_err(|source| HandleError::Background { operation, source })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_returns_task_result() {
        let background = BackgroundContext::current();
        let value = background
            .run("add", async { Ok::<_, HandleError>(1 + 1) })
            .await
            .unwrap();
        assert_eq!(value, 2);

        let err = background
            .run("fail", async { Err::<(), _>(HandleError::UiUnavailable) })
            .await
            .unwrap_err();
        assert!(matches!(err, HandleError::UiUnavailable));
    }

    #[tokio::test]
    async fn test_panicking_task_surfaces_as_background_error() {
        let background = BackgroundContext::current();
        let missing: Option<u8> = None;
        let err = background
            .run("explode", async move {
                let value = missing.expect("boom");
                Ok::<_, HandleError>(value)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HandleError::Background {
                operation: "explode",
                ..
            }
        ));
    }
}
