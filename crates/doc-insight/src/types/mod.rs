//! Core types for the ingestion pipeline

pub mod insight;
pub mod kind;
pub mod payload;
pub mod request;

pub use insight::{ColumnMissing, InsightResult, TableSummary};
pub use kind::SourceKind;
pub use payload::{Cell, CleanedPayload, Payload, RawPayload, Table};
pub use request::{InferenceMode, PipelineRequest};
