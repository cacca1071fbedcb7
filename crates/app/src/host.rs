//! A view host for the terminal: no editor tabs, just the views a command
//! opened and notifications printed to stderr.

use std::sync::Arc;

use common::prelude::*;
use parking_lot::Mutex;

#[derive(Default)]
pub struct ConsoleHost {
    views: Mutex<Vec<OpenView>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, file: Arc<dyn Identity>) -> ViewId {
        let view = OpenView::new(file);
        let id = view.id;
        tracing::debug!(view = %id, file = %view.file.name(), "opened view");
        self.views.lock().push(view);
        id
    }

    pub fn view_count(&self) -> usize {
        self.views.lock().len()
    }
}

impl ViewHost for ConsoleHost {
    fn open_views(&self) -> Vec<OpenView> {
        self.views.lock().clone()
    }

    fn close_view(&self, view: &OpenView) -> Result<(), HostError> {
        let mut views = self.views.lock();
        let before = views.len();
        views.retain(|v| v.id != view.id);
        if views.len() == before {
            return Err(HostError::ViewNotOpen(view.id));
        }
        tracing::info!(view = %view.id, file = %view.file.name(), "closed view");
        Ok(())
    }

    fn refresh(&self, resource: ResourceTag) -> Result<(), HostError> {
        tracing::info!(?resource, "refresh requested");
        Ok(())
    }

    fn notify_error(&self, title: &str, message: &str) {
        tracing::error!(title, "{}", message);
        eprintln!("{}: {}", title, message);
    }

    fn property_changed(&self, event: &PropertyChange) {
        tracing::debug!(
            property = event.property,
            old = %event.old_value,
            new = %event.new_value,
            "property changed"
        );
    }
}
