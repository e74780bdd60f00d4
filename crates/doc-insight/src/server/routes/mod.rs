//! HTTP routes

pub mod process;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};

use crate::server::state::AppState;

/// Build the service routes
pub fn routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/process",
            post(process::process_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/info", get(info))
}

/// Service description
async fn info(State(state): State<AppState>) -> Json<Value> {
    let kinds: Map<String, Value> = state
        .pipeline()
        .supported_kinds()
        .into_iter()
        .map(|kind| (kind.display_name().to_string(), json!(kind.extensions())))
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Extracts content from documents and produces insights",
        "inference_backend": state.pipeline().backend_name(),
        "supported_types": kinds,
        "endpoints": {
            "POST /process": "Upload a file (multipart 'file', optional 'inference_type')",
            "GET /health": "Health check",
            "GET /info": "This description",
        }
    }))
}
