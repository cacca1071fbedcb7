//! Hand-off onto the host's UI context.
//!
//! The host owns a [`UiExecutor`] and drives it from its UI thread (or task).
//! Anything that touches host UI state is sent to it as a closure through a
//! [`UiDispatcher`], and the sender awaits the result. Tasks run one at a
//! time, in the order they were sent.

use std::cell::Cell;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::HandleError;

type UiTask = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static IN_UI_CONTEXT: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is running a task for a [`UiExecutor`].
pub fn is_ui_context() -> bool {
    IN_UI_CONTEXT.with(|flag| flag.get())
}

/// Create a connected dispatcher/executor pair.
pub fn ui_channel() -> (UiDispatcher, UiExecutor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, UiExecutor { rx })
}

#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
}

impl UiDispatcher {
    /// Run `task` on the UI context and wait for its result.
    ///
    /// Called from the UI context itself, `task` runs inline: the executor is
    /// busy with the caller and would never pick up a queued task.
    ///
    /// # Returns
    /// * `Err(HandleError::UiUnavailable)` - the executor is gone, or the task panicked
    pub async fn invoke<F, T>(&self, task: F) -> Result<T, HandleError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if is_ui_context() {
            return Ok(task());
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Box::new(move || {
                let _ = reply_tx.send(task());
            }))
            .map_err(|_| HandleError::UiUnavailable)?;
        reply_rx.await.map_err(|_| HandleError::UiUnavailable)
    }
}

pub struct UiExecutor {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiExecutor {
    /// Run tasks until every dispatcher is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            run_on_ui(task);
        }
        debug!("ui executor stopped");
    }

    /// Like [`UiExecutor::run`], for hosts with a dedicated (non-async) UI thread.
    pub fn run_blocking(mut self) {
        while let Some(task) = self.rx.blocking_recv() {
            run_on_ui(task);
        }
        debug!("ui executor stopped");
    }

    /// Run whatever is queued right now without waiting. Returns the number of tasks run.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.rx.try_recv() {
            run_on_ui(task);
            count += 1;
        }
        count
    }
}

struct UiContextGuard;

impl UiContextGuard {
    fn enter() -> Self {
        IN_UI_CONTEXT.with(|flag| flag.set(true));
        UiContextGuard
    }
}

impl Drop for UiContextGuard {
    fn drop(&mut self) {
        IN_UI_CONTEXT.with(|flag| flag.set(false));
    }
}

fn run_on_ui(task: UiTask) {
    let _guard = UiContextGuard::enter();
    task();
}
