//! Image extractor: OCR through the tesseract command-line tool

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Payload, SourceKind};

/// Runs tesseract on the image and returns the recognized text as-is
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    command: String,
    language: String,
}

impl ImageExtractor {
    /// Create an extractor using the given tesseract executable and language
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }

    /// Check if the tesseract executable can be run
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Extractor for ImageExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let command = self.command.clone();
        let language = self.language.clone();
        let origin = format!("image '{}'", path.display());
        run_blocking(origin.clone(), move || {
            ocr(&command, &language, &path, &origin).map(Payload::Text)
        })
        .await
    }
}

fn ocr(command: &str, language: &str, path: &Path, origin: &str) -> Result<String> {
    let output = Command::new(command)
        .arg(path)
        .arg("stdout")
        .args(["-l", language])
        .output()
        .map_err(|e| {
            Error::extraction(
                origin,
                format!(
                    "could not run '{}' ({}). Install with: apt install tesseract-ocr",
                    command, e
                ),
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::extraction(origin, format!("tesseract error: {}", stderr.trim())));
    }

    // No confidence filtering; only surrounding whitespace is dropped
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::info!("Image OCR extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_ocr_binary_is_extraction_error() {
        let extractor = ImageExtractor::new("definitely-not-tesseract-binary", "eng");
        assert!(!extractor.is_available());

        let err = extractor.extract("scan.png").await.unwrap_err();
        match err {
            Error::Extraction { origin, cause } => {
                assert!(origin.contains("scan.png"));
                assert!(cause.contains("definitely-not-tesseract-binary"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
