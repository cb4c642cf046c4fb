use refs_hook_engine::{
    EngineConfig, LoggingIndexTrigger, ServerApiClient, SourceRegistry,
};
use tracing::info;

use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
///
/// The registry is loaded once at startup; every delivery builds its own
/// units on top of it.
#[derive(Debug)]
pub struct AppState {
    pub registry: SourceRegistry,
    pub api: ServerApiClient,
    pub trigger: LoggingIndexTrigger,
}

impl AppState {
    pub fn new(registry: SourceRegistry, api: ServerApiClient) -> Self {
        Self {
            registry,
            api,
            trigger: LoggingIndexTrigger,
        }
    }

    /// Loads the source registry and Bitbucket client settings from the environment.
    pub fn from_env() -> AppResult<Self> {
        let config = EngineConfig::from_env()?;
        let registry = SourceRegistry::load(&config.sources_file)?;
        let api = ServerApiClient::from_config(config.provider)?;

        info!(
            navigators = registry.navigators.len(),
            sources = registry.sources.len(),
            "hook state ready"
        );
        Ok(Self::new(registry, api))
    }
}
