//! Application state shared by all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::PayrollEngine;
use crate::error::EngineResult;

/// Shared application state.
///
/// Holds the loaded configuration (for token lookup) and the engine.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    engine: Arc<PayrollEngine>,
}

impl AppState {
    /// Builds the engine from `config` and wraps both for sharing.
    pub fn new(config: ConfigLoader) -> EngineResult<Self> {
        let engine = PayrollEngine::from_config(config.config())?;
        Ok(Self::with_engine(config, engine))
    }

    /// Wraps an already built engine, e.g. one with custom collaborators.
    pub fn with_engine(config: ConfigLoader, engine: PayrollEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }

    /// Returns the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the engine.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }
}
