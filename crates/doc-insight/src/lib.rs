//! doc-insight: document ingestion pipeline producing model or analytics insights
//!
//! Files (spreadsheets, databases, presentations, PDFs, images, call-detail
//! records) and cloud documents are extracted into text or tables, optionally
//! cleaned, then either sent to an inference backend (text) or summarized with
//! descriptive statistics (tables). The same [`Pipeline`] backs the interactive
//! CLI, one-shot CLI runs and the `POST /process` HTTP endpoint.

pub mod cleaning;
pub mod config;
pub mod error;
pub mod inference;
pub mod ingestion;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod session;
pub mod types;

pub use cleaning::{Cleaner, DeclaredShape};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use inference::{build_backend, InferenceBackend, InsightGenerator};
pub use ingestion::{Extractor, ExtractorRegistry};
pub use pipeline::Pipeline;
pub use server::InsightServer;
pub use session::InteractiveSession;
pub use types::{
    Cell, CleanedPayload, InferenceMode, InsightResult, Payload, PipelineRequest, RawPayload,
    SourceKind, Table, TableSummary,
};
