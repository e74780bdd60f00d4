//! Source extractors and the kind -> extractor registry

mod call_records;
mod cloud_doc;
mod database;
mod image;
mod pdf;
mod presentation;
mod spreadsheet;

pub use call_records::{
    parse_timestamp, CallRecordsExtractor, TimeOfDay, CALL_TIME_COLUMN, DAY_TABLE, NIGHT_TABLE,
    TIME_OF_DAY_COLUMN,
};
pub use cloud_doc::{document_text, CloudDocExtractor};
pub use database::DatabaseExtractor;
pub use image::ImageExtractor;
pub use pdf::{join_pages, PdfExtractor};
pub use presentation::PresentationExtractor;
pub use spreadsheet::SpreadsheetExtractor;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{Payload, SourceKind};

/// Converts one source format into a payload.
///
/// Implementations open and fully read the source on every call and keep no
/// handles afterwards, so one instance can serve concurrent requests.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Kind this extractor handles
    fn kind(&self) -> SourceKind;

    /// Extract content from a local path or document id
    async fn extract(&self, location: &str) -> Result<Payload>;
}

/// Fixed mapping from source kind to extractor
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<SourceKind, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one extractor per supported kind
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(SpreadsheetExtractor));
        registry.register(Arc::new(DatabaseExtractor::new(&config.database_table)?));
        registry.register(Arc::new(PresentationExtractor));
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(ImageExtractor::new(
            &config.tesseract_command,
            &config.ocr_language,
        )));
        registry.register(Arc::new(CallRecordsExtractor));
        registry.register(Arc::new(CloudDocExtractor::new(config)?));
        Ok(registry)
    }

    /// Register (or replace) the extractor for its kind
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(extractor.kind(), extractor);
    }

    /// Extractor for a kind
    pub fn get(&self, kind: SourceKind) -> Result<Arc<dyn Extractor>> {
        self.extractors
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::UnsupportedType(kind.display_name().to_string()))
    }

    /// Kinds with a registered extractor
    pub fn kinds(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|k| self.extractors.contains_key(k))
            .collect()
    }
}

/// Run blocking extraction work off the async executor
pub(crate) async fn run_blocking<T, F>(origin: String, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::extraction(origin, format!("extraction task failed: {}", e)))?
}
