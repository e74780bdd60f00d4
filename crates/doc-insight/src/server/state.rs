//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::inference::build_backend;
use crate::pipeline::Pipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pipeline: Pipeline,
}

impl AppState {
    /// Create state around an already-built pipeline
    pub fn new(config: AppConfig, pipeline: Pipeline) -> Result<Self> {
        let upload_dir = config.server.upload_dir();
        std::fs::create_dir_all(&upload_dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        })
    }

    /// Build the configured backend and pipeline
    pub fn from_config(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");
        let backend = build_backend(&config)?;
        let pipeline = Pipeline::from_config(&config, backend)?;
        Self::new(config, pipeline)
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }
}
