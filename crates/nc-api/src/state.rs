//! Application state shared across all handlers and middleware.

use nc_core::config::ConfigHandle;
use nc_service::Services;
use nc_worker::TeamRunRegistry;

/// Application state passed to every handler via `State<AppState>`.
///
/// Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Engine services over the shared store.
    pub services: Services,
    /// Live configuration snapshot.
    pub config: ConfigHandle,
    /// In-flight team rotations, shared with the scheduler.
    pub runs: TeamRunRegistry,
}

impl AppState {
    /// Bundle the services with the configuration handle and a private
    /// run registry.
    pub fn new(services: Services, config: ConfigHandle) -> Self {
        Self {
            services,
            config,
            runs: TeamRunRegistry::new(),
        }
    }

    /// Share the scheduler's run registry so manual rotations and
    /// scheduled ones exclude each other.
    pub fn with_runs(mut self, runs: TeamRunRegistry) -> Self {
        self.runs = runs;
        self
    }
}
