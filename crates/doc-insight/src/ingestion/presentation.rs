//! PowerPoint extractor: shape text in slide then shape order

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Payload, SourceKind};

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Reads the text of every top-level shape in a .pptx
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentationExtractor;

#[async_trait]
impl Extractor for PresentationExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Presentation
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let origin = format!("presentation '{}'", path.display());
        run_blocking(origin.clone(), move || read_presentation(&path, &origin)).await
    }
}

fn read_presentation(path: &Path, origin: &str) -> Result<Payload> {
    let file = File::open(path).map_err(|e| Error::extraction(origin, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::extraction(origin, e))?;

    // ppt/slides/slide1.xml, slide2.xml, ... sorted numerically
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (number, name) in &slides {
        let mut xml = String::new();
        archive
            .by_name(name)
            .map_err(|e| Error::extraction(origin, e))?
            .read_to_string(&mut xml)
            .map_err(|e| Error::extraction(origin, format!("slide {}: {}", number, e)))?;

        let shapes = shape_texts(&xml)
            .map_err(|e| Error::extraction(origin, format!("slide {}: {}", number, e)))?;
        for shape in shapes {
            text.push_str(&shape);
        }
    }

    tracing::info!("Read {} slide(s) from {}", slides.len(), path.display());
    Ok(Payload::Text(text))
}

#[derive(Default)]
struct ShapeText {
    has_body: bool,
    in_body: bool,
    in_run: bool,
    paragraphs: Vec<String>,
}

impl ShapeText {
    fn current_paragraph(&mut self) -> &mut String {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(String::new());
        }
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }
}

/// Text of each top-level shape with a text body, in document order.
///
/// A shape's text is its paragraphs joined by newlines. Shapes nested in
/// groups, pictures and graphic frames carry no text of their own.
fn shape_texts(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut group_depth = 0usize;
    let mut shape: Option<ShapeText> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => shape = Some(ShapeText::default()),
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_body = true;
                        s.in_body = true;
                    }
                }
                b"p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.in_body) {
                        s.paragraphs.push(String::new());
                    }
                }
                b"t" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.in_body) {
                        s.in_run = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.has_body = true;
                    }
                }
                b"p" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.in_body) {
                        s.paragraphs.push(String::new());
                    }
                }
                b"br" => {
                    if let Some(s) = shape.as_mut().filter(|s| s.in_body) {
                        s.current_paragraph().push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some(s) = shape.as_mut().filter(|s| s.in_run) {
                    let text = e.unescape()?;
                    s.current_paragraph().push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if group_depth == 0 => {
                    if let Some(s) = shape.take().filter(|s| s.has_body) {
                        texts.push(s.paragraphs.join("\n"));
                    }
                }
                b"txBody" => {
                    if let Some(s) = shape.as_mut() {
                        s.in_body = false;
                    }
                }
                b"t" => {
                    if let Some(s) = shape.as_mut() {
                        s.in_run = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn slide(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn text_shape(paragraphs: &[&str]) -> String {
        let paras: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!("<p:sp><p:nvSpPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>", paras)
    }

    #[test]
    fn test_shapes_in_order_with_paragraphs() {
        let xml = slide(&format!(
            "{}<p:pic><p:blipFill/></p:pic>{}",
            text_shape(&["Quarterly", "Review"]),
            text_shape(&["Revenue &amp; costs"])
        ));
        let texts = shape_texts(&xml).unwrap();
        assert_eq!(texts, vec!["Quarterly\nReview", "Revenue & costs"]);
    }

    #[test]
    fn test_group_and_bodyless_shapes_skipped() {
        let xml = slide(&format!(
            "<p:grpSp>{}</p:grpSp><p:sp><p:nvSpPr/></p:sp>{}",
            text_shape(&["grouped"]),
            text_shape(&["kept"])
        ));
        assert_eq!(shape_texts(&xml).unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_runs_concatenate_and_breaks() {
        let xml = slide(
            "<p:sp><p:txBody><a:p><a:r><a:t>Hel</a:t></a:r><a:r><a:t>lo</a:t></a:r><a:br/><a:r><a:t>there</a:t></a:r></a:p></p:txBody></p:sp>",
        );
        assert_eq!(shape_texts(&xml).unwrap(), vec!["Hello\nthere"]);
    }

    #[tokio::test]
    async fn test_slides_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");

        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, text) in [
            ("ppt/slides/slide10.xml", "ten"),
            ("ppt/slides/slide2.xml", "two"),
            ("ppt/slides/slide1.xml", "one"),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(slide(&text_shape(&[text])).as_bytes()).unwrap();
        }
        zip.start_file("ppt/slides/_rels/slide1.xml.rels", options).unwrap();
        zip.write_all(b"<Relationships/>").unwrap();
        zip.finish().unwrap();

        let payload = PresentationExtractor
            .extract(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Text("onetwoten".to_string()));
    }

    #[tokio::test]
    async fn test_not_a_zip_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(&path, b"plain text").unwrap();

        let err = PresentationExtractor
            .extract(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
