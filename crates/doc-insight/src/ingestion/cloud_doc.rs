//! Cloud document extractor: paragraph text from the documents REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::Extractor;
use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{Payload, SourceKind};

/// Fetches a document by id with a pre-obtained bearer token
pub struct CloudDocExtractor {
    client: Client,
    api_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    body: Body,
}

#[derive(Debug, Default, Deserialize)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
struct StructuralElement {
    paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

impl CloudDocExtractor {
    /// Create an extractor from the extraction settings
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.docs_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.docs_api_url.trim_end_matches('/').to_string(),
            token: config.docs_token(),
        })
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("{}/{}", self.api_url, document_id)
    }
}

#[async_trait]
impl Extractor for CloudDocExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::CloudDocument
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let document_id = location.trim();
        let origin = format!("cloud document '{}'", document_id);

        if document_id.is_empty() {
            return Err(Error::extraction(origin, "document id is empty"));
        }
        let token = self.token.as_deref().ok_or_else(|| {
            Error::extraction(&origin, "no access token configured for the documents API")
        })?;

        tracing::info!("Fetching cloud document {}", document_id);

        let response = self
            .client
            .get(self.document_url(document_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::extraction(&origin, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::extraction(
                origin,
                format!("documents API returned HTTP {}: {}", status, body),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::extraction(&origin, format!("failed to read response: {}", e)))?;

        let text = document_text(&body).map_err(|e| Error::extraction(&origin, e))?;
        tracing::debug!("Cloud document {} has {} characters", document_id, text.len());
        Ok(Payload::Text(text))
    }
}

/// Concatenate every paragraph text run of a documents API response body
pub fn document_text(json: &str) -> std::result::Result<String, serde_json::Error> {
    let document: Document = serde_json::from_str(json)?;
    Ok(document
        .body
        .content
        .iter()
        .filter_map(|element| element.paragraph.as_ref())
        .flat_map(|paragraph| &paragraph.elements)
        .filter_map(|element| element.text_run.as_ref())
        .map(|run| run.content.as_str())
        .collect())
}
