//! Where handle operations run.
//!
//! Remote work goes to the [`BackgroundContext`]; anything that touches host
//! UI state is handed to the UI executor through a [`UiDispatcher`].

mod background;
mod ui;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::host::ViewHost;

pub use background::BackgroundContext;
pub use ui::{is_ui_context, ui_channel, UiDispatcher, UiExecutor};

/// Page size used for object listings unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 300;

/// Tunables shared by every handle built from a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Maximum number of entries requested per listing page
    pub page_size: usize,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything a [`BucketHandle`](crate::handle::BucketHandle) needs from its
/// surroundings. Cheap to clone; handles share one context.
#[derive(Clone)]
pub struct HandleContext {
    pub background: BackgroundContext,
    pub ui: UiDispatcher,
    pub host: Arc<dyn ViewHost>,
    pub config: HandleConfig,
}

impl HandleContext {
    pub fn new(background: BackgroundContext, ui: UiDispatcher, host: Arc<dyn ViewHost>) -> Self {
        Self::with_config(background, ui, host, HandleConfig::default())
    }

    pub fn with_config(
        background: BackgroundContext,
        ui: UiDispatcher,
        host: Arc<dyn ViewHost>,
        config: HandleConfig,
    ) -> Self {
        Self {
            background,
            ui,
            host,
            config,
        }
    }
}

impl fmt::Debug for HandleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleContext")
            .field("background", &self.background)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
