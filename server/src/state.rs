use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use facevault_core::FaceRegistry;

use crate::config::AppConfig;

/// Per-process context handed to every handler.
pub(crate) struct AppState {
    pub(crate) started_at: Instant,
    pub(crate) config: Arc<AppConfig>,
    /// Cleared when a document write fails, set again by the next success.
    pub(crate) storage_available: Arc<AtomicBool>,
    pub(crate) registry: Arc<FaceRegistry>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            started_at: self.started_at,
            config: Arc::clone(&self.config),
            storage_available: Arc::clone(&self.storage_available),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl AppState {
    pub(crate) fn new(config: AppConfig, registry: FaceRegistry) -> Self {
        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
            storage_available: Arc::new(AtomicBool::new(true)),
            registry: Arc::new(registry),
        }
    }
}
