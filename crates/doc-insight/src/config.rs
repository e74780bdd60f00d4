//! Configuration for the ingestion pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variable consulted for the cloud documents token
pub const DOCS_TOKEN_ENV: &str = "GOOGLE_DOCS_ACCESS_TOKEN";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_logging_level")]
    pub logging_level: String,
    /// Directory receiving the rolling log file
    #[serde(default = "default_output_file_path")]
    pub output_file_path: PathBuf,
    /// Base URL of the remote inference endpoint (`/chat` is appended)
    #[serde(default = "default_ollama_api_url")]
    pub ollama_api_url: String,
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference configuration
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Extractor configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Pipeline stage toggles
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_output_file_path() -> PathBuf {
    PathBuf::from("./output/")
}

fn default_ollama_api_url() -> String {
    "http://localhost:11434/api".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level(),
            output_file_path: default_output_file_path(),
            ollama_api_url: default_ollama_api_url(),
            server: ServerConfig::default(),
            inference: InferenceConfig::default(),
            extraction: ExtractionConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON or TOML file (chosen by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
        } else {
            Self::from_json(&content)
                .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the explicit file if given, else `./config.json` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Directory for uploaded files while they are processed (default: OS temp dir)
    pub upload_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
            upload_dir: None,
        }
    }
}

impl ServerConfig {
    /// Directory uploads are staged in
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Inference backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote endpoint taking `{"prompt"}` and answering `{"text"}`
    #[default]
    Remote,
    /// Local Ollama server via `/api/generate`
    Ollama,
}

/// Inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Which backend answers text prompts
    pub backend: BackendKind,
    /// Ollama base URL (used by the `ollama` backend)
    pub ollama_base_url: String,
    /// Generation model name (used by the `ollama` backend)
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Characters of extracted text included in the prompt
    pub prompt_char_limit: usize,
    /// Characters of the result returned by the HTTP endpoint
    pub response_char_limit: usize,
    /// Sample rows per table in analytics summaries
    pub sample_rows: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Remote,
            ollama_base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 120,
            prompt_char_limit: 500,
            response_char_limit: 500,
            sample_rows: 5,
        }
    }
}

/// Extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Table read by the database extractor
    pub database_table: String,
    /// Tesseract executable
    pub tesseract_command: String,
    /// Tesseract language pack
    pub ocr_language: String,
    /// Documents API base URL (document id is appended)
    pub docs_api_url: String,
    /// Bearer token for the documents API
    pub docs_access_token: Option<String>,
    /// Request timeout for the documents API in seconds
    pub docs_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            database_table: "calls".to_string(),
            tesseract_command: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            docs_api_url: "https://docs.googleapis.com/v1/documents".to_string(),
            docs_access_token: None,
            docs_timeout_secs: 60,
        }
    }
}

impl ExtractionConfig {
    /// Token from config, falling back to the environment
    pub fn docs_token(&self) -> Option<String> {
        self.docs_access_token
            .clone()
            .or_else(|| std::env::var(DOCS_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Pipeline stage toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the cleaning stage between extraction and inference
    pub clean: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { clean: true }
    }
}
