use std::sync::Arc;

use tixctl_core::{CaptchaSolver, SettingsStore, SignalFiles, WorkerController};

/// Static build identifier reported by `/version`
pub const APP_VERSION: &str = concat!(
    "TicketsHunter (",
    env!("CARGO_PKG_VERSION"),
    ") - Cloud Control"
);

/// Shared application state
pub struct AppState {
    settings: Arc<SettingsStore>,
    controller: Arc<WorkerController>,
    solver: Option<Arc<dyn CaptchaSolver>>,
    remote_url: String,
}

impl AppState {
    pub fn new(
        settings: Arc<SettingsStore>,
        controller: Arc<WorkerController>,
        solver: Option<Arc<dyn CaptchaSolver>>,
        remote_url: String,
    ) -> Self {
        Self {
            settings,
            controller,
            solver,
            remote_url,
        }
    }

    pub fn version(&self) -> &'static str {
        APP_VERSION
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn controller(&self) -> &WorkerController {
        self.controller.as_ref()
    }

    pub fn signals(&self) -> &SignalFiles {
        self.controller.signals()
    }

    pub fn solver(&self) -> Option<&Arc<dyn CaptchaSolver>> {
        self.solver.as_ref()
    }

    /// Console URL injected into `/load` responses
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }
}
