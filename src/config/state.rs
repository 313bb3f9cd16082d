// Application state module
// Holds configuration, the persistence capability and the fallback log

use std::sync::atomic::{AtomicBool, Ordering};

use super::types::Config;
use crate::contact::FallbackLog;
use crate::store::Persistence;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Resolved once at startup; handlers branch on it per request
    pub persistence: Persistence,

    /// Submissions kept in memory when persistence is unavailable
    pub fallback: FallbackLog,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Create `AppState`, resolving the persistence capability from config
    pub fn new(config: &Config) -> Self {
        Self::with_persistence(config, Persistence::resolve(&config.database))
    }

    /// Create `AppState` with an explicitly injected persistence capability
    pub fn with_persistence(config: &Config, persistence: Persistence) -> Self {
        Self {
            config: config.clone(),
            persistence,
            fallback: FallbackLog::new(),
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}
