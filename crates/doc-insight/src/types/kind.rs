//! Source kinds and extension dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Supported source kinds, one extractor each
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Excel / OpenDocument workbook
    Spreadsheet,
    /// SQLite database file
    Database,
    /// PowerPoint presentation (.pptx)
    Presentation,
    /// PDF document
    Pdf,
    /// Raster image, read through OCR
    Image,
    /// Call detail records in CSV
    CallRecords,
    /// Cloud-hosted document addressed by id
    CloudDocument,
}

impl SourceKind {
    /// Every kind, in registry order
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Spreadsheet,
        SourceKind::Database,
        SourceKind::Presentation,
        SourceKind::Pdf,
        SourceKind::Image,
        SourceKind::CallRecords,
        SourceKind::CloudDocument,
    ];

    /// Detect kind from a file extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "xls" | "xlsm" | "ods" => Some(Self::Spreadsheet),
            "sql" | "db" | "sqlite" | "sqlite3" => Some(Self::Database),
            "pptx" => Some(Self::Presentation),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Some(Self::Image),
            "csv" => Some(Self::CallRecords),
            _ => None,
        }
    }

    /// Detect kind from a path's extension.
    ///
    /// Pure string inspection: the path is never touched on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        Self::from_extension(ext).ok_or_else(|| {
            let shown = if ext.is_empty() {
                format!("(no extension) {}", path.display())
            } else {
                format!(".{}", ext.to_lowercase())
            };
            Error::UnsupportedType(shown)
        })
    }

    /// Resolve an explicit kind tag such as `gdoc`, `cdr` or `excel`
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim().to_lowercase();
        let kind = match tag.as_str() {
            "excel" | "spreadsheet" | "xlsx" | "xls" => Self::Spreadsheet,
            "sql" | "database" | "sqlite" | "db" => Self::Database,
            "pptx" | "ppt" | "powerpoint" | "presentation" => Self::Presentation,
            "pdf" => Self::Pdf,
            "image" | "ocr" => Self::Image,
            "cdr" | "csv" => Self::CallRecords,
            "gdoc" | "google-doc" => Self::CloudDocument,
            _ => return Err(Error::UnsupportedType(tag)),
        };
        Ok(kind)
    }

    /// Resolve from an explicit tag when given, else from the location's extension
    pub fn resolve(location: &str, tag: Option<&str>) -> Result<Self> {
        match tag.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tag) => Self::from_tag(tag),
            None => Self::from_path(location),
        }
    }

    /// Extensions routed to this kind
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Spreadsheet => &["xlsx", "xls", "xlsm", "ods"],
            Self::Database => &["sql", "db", "sqlite", "sqlite3"],
            Self::Presentation => &["pptx"],
            Self::Pdf => &["pdf"],
            Self::Image => &["png", "jpg", "jpeg", "tif", "tiff", "bmp"],
            Self::CallRecords => &["csv"],
            Self::CloudDocument => &[],
        }
    }

    /// Whether the location names a local file
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::CloudDocument)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Database => "database",
            Self::Presentation => "presentation",
            Self::Pdf => "PDF",
            Self::Image => "image",
            Self::CallRecords => "call records",
            Self::CloudDocument => "cloud document",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
