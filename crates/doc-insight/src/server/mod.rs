//! HTTP server exposing the pipeline

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Document insight HTTP server
pub struct InsightServer {
    state: AppState,
}

impl InsightServer {
    /// Create a server around existing state
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Create with the configured backend and extractors
    pub fn from_config(config: AppConfig) -> Result<Self> {
        Ok(Self::new(AppState::from_config(config)?))
    }

    /// Router with all routes and middleware
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let server = &self.state.config().server;
        format!("{}:{}", server.host, server.port)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting doc-insight server on http://{}", addr);
        tracing::info!("Upload endpoint: POST http://{}/process", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the router for the given state
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config().server.enable_cors;
    let max_upload_size = state.config().server.max_upload_size;

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(routes::routes(max_upload_size))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
