//! doc-insight HTTP server
//!
//! Run with: cargo run -p doc-insight --bin doc-insight-server -- [CONFIG]

use doc_insight::{config::AppConfig, logging, server::InsightServer};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    let _log_guard = logging::init(&config)?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Inference backend: {:?}", config.inference.backend);
    tracing::info!("  - Inference API: {}", config.ollama_api_url);
    tracing::info!("  - Upload dir: {}", config.server.upload_dir().display());
    tracing::info!("  - Log dir: {}", config.output_file_path.display());

    let server = InsightServer::from_config(config)?;

    println!("\nServer starting...");
    println!("  Process: POST http://{}/process", server.address());
    println!("  Health:  http://{}/health", server.address());
    println!("  Info:    http://{}/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
