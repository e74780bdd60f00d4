//! PDF extractor: page text in page order

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Payload, SourceKind};

/// Extracts text page by page with lopdf, falling back to pdf-extract
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[async_trait]
impl Extractor for PdfExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let origin = format!("PDF '{}'", path.display());
        run_blocking(origin.clone(), move || {
            let pages = extract_pages(&path, &origin)?;
            tracing::info!("Extracted {} page(s) from {}", pages.len(), path.display());
            Ok(Payload::Text(join_pages(&pages)))
        })
        .await
    }
}

/// Join page texts with no separator and trim the result.
///
/// Empty pages contribute nothing.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let joined: String = pages.iter().map(AsRef::as_ref).collect();
    joined.trim().to_string()
}

fn extract_pages(path: &Path, origin: &str) -> Result<Vec<String>> {
    let doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(load_err) => {
            tracing::warn!("lopdf could not load {}: {}, trying pdf-extract", path.display(), load_err);
            // Whole-document text stands in as a single page
            return pdf_extract::extract_text(path)
                .map(|text| vec![text])
                .map_err(|_| Error::extraction(origin, load_err));
        }
    };

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        // A page that yields nothing never fails the document
        let text = match doc.extract_text(&[*page_number]) {
            // lopdf ends every non-empty page with a line break
            Ok(text) => text.trim_end_matches(['\r', '\n']).to_string(),
            Err(e) => {
                tracing::debug!("No text on page {}: {}", page_number, e);
                String::new()
            }
        };
        texts.push(text);
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pages_contribute_nothing() {
        assert_eq!(join_pages(&["Hello", "", "World"]), "HelloWorld");
    }

    #[test]
    fn test_join_trims_outer_whitespace() {
        assert_eq!(join_pages(&["\n  Intro\n", "Body \n"]), "Intro\nBody");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    fn write_pdf(path: &Path, pages: &[&str]) {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut operations = Vec::new();
            if !text.is_empty() {
                operations = vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ];
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_pages_concatenated_without_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &["Hello", "", "World"]);

        let payload = PdfExtractor.extract(path.to_str().unwrap()).await.unwrap();
        assert_eq!(payload, Payload::Text("HelloWorld".to_string()));
    }

    #[tokio::test]
    async fn test_garbage_file_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfExtractor.extract(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
