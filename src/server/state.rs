//! Server shared state
//!
//! Holds the alert engine for the HTTP server.

use crate::config::Config;
use crate::engine::ConfiguredEngine;
use crate::error::Result;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    /// Engine shared by every request, so the place cache is too
    pub engine: ConfiguredEngine,

    started_at: Instant,
}

impl AppState {
    /// Create application state with providers built from `config`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_engine(ConfiguredEngine::from_config(config)?))
    }

    pub fn with_engine(engine: ConfiguredEngine) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
