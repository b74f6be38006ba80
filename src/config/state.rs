// Application state module
// Shared, injectable state handed to every request handler

use tokio::sync::RwLock;

use super::types::Config;
use crate::registry::ActivityRegistry;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Single global lock; signup/unregister hold the write half for the whole
    /// check-then-mutate step
    pub registry: RwLock<ActivityRegistry>,
}

impl AppState {
    /// Create `AppState` with the registry described by `config`
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config, config.build_registry())
    }

    pub fn with_registry(config: &Config, registry: ActivityRegistry) -> Self {
        Self {
            config: config.clone(),
            registry: RwLock::new(registry),
        }
    }
}
