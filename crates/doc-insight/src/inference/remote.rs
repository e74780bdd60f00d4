//! Remote inference endpoint: `POST {base}/chat` with `{"prompt"}`, answers `{"text"}`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::InferenceBackend;
use crate::error::{Error, Result};

/// Client for a remote inference API
pub struct RemoteBackend {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: String,
}

impl RemoteBackend {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/chat", base_url.trim_end_matches('/')),
        })
    }

    /// Endpoint prompts are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceBackend for RemoteBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|e| Error::inference(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::inference(format!(
                "Inference API returned HTTP {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::inference(format!("Malformed inference response: {}", e)))?;

        Ok(chat.text.trim().to_string())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
