//! Error types for the ingestion pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Extension or kind tag with no registered extractor
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Source unreadable, malformed, or a required collaborator is missing
    #[error("Failed to extract {origin}: {cause}")]
    Extraction { origin: String, cause: String },

    /// Payload shape does not match what the cleaner was asked to do
    #[error("Cleaning failed: {0}")]
    Cleaning(String),

    /// Inference backend unreachable or returned a malformed response
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Upload request carried no file field
    #[error("No file provided")]
    NoFile,

    /// Malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(origin: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Extraction {
            origin: origin.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a cleaning error
    pub fn cleaning(message: impl Into<String>) -> Self {
        Self::Cleaning(message.into())
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Replace every mention of `location` with `name`.
    ///
    /// Uploads are extracted from a staged temp file; clients only know the
    /// name they uploaded.
    pub fn with_location_as(self, location: &str, name: &str) -> Self {
        let swap = |s: String| s.replace(location, name);
        match self {
            Error::Extraction { origin, cause } => Error::Extraction {
                origin: swap(origin),
                cause: swap(cause),
            },
            Error::Cleaning(message) => Error::Cleaning(swap(message)),
            Error::FileNotFound(path) if path.as_os_str() == location => {
                Error::FileNotFound(PathBuf::from(name))
            }
            other => other,
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnsupportedType(_) | Error::NoFile | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::FileNotFound(_) => StatusCode::NOT_FOUND,
            Error::Extraction { .. } | Error::Cleaning(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Inference(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) | Error::Io(_) | Error::Json(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // The extension itself stays in the logs, clients get a stable message
        let message = match &self {
            Error::UnsupportedType(_) => "Unsupported file type".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
