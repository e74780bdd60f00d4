//! File upload endpoint

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{InferenceMode, PipelineRequest, SourceKind};

/// Successful processing response
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Leading characters of the rendered insight
    pub insights: String,
}

/// POST /process - Upload a file and return its insights
pub async fn process_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut inference_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    Error::InvalidRequest(format!("Failed to read file: {}", e))
                })?;
                upload = Some((filename, data));
            }
            "inference_type" => {
                let value = field.text().await.map_err(|e| {
                    Error::InvalidRequest(format!("Failed to read inference_type: {}", e))
                })?;
                inference_type = Some(value);
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let (filename, data) = upload
        .filter(|(filename, _)| !filename.trim().is_empty())
        .ok_or(Error::NoFile)?;

    // Reject unknown types before anything touches the disk
    let kind = SourceKind::from_path(&filename)?;
    let mode: InferenceMode = inference_type.as_deref().unwrap_or("").parse()?;

    let upload_id = Uuid::new_v4();
    tracing::info!(
        "[{}] Processing upload {} ({} bytes, {}, {} mode)",
        upload_id,
        filename,
        data.len(),
        kind,
        mode
    );

    // Removed from disk when dropped, whichever way this handler returns
    let staged = stage_upload(&state.config().server.upload_dir(), &filename, &data).await?;

    let staged_path = staged.path().to_string_lossy().into_owned();
    let request = PipelineRequest::new(staged_path.as_str())
        .with_kind(kind)
        .with_mode(mode);
    let insight = state
        .pipeline()
        .run(&request)
        .await
        .map_err(|e| e.with_location_as(&staged_path, &filename))?;

    tracing::info!("[{}] Completed {}", upload_id, filename);

    Ok(Json(ProcessResponse {
        insights: insight.truncated(state.config().inference.response_char_limit),
    }))
}

/// Write upload bytes to a temp file that keeps the original extension
async fn stage_upload(dir: &Path, filename: &str, data: &[u8]) -> Result<NamedTempFile> {
    let suffix = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let staged = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    tokio::fs::write(staged.path(), data).await?;
    Ok(staged)
}
