//! Generative language API client
//!
//! Uses `models/{model}:generateContent` with image bytes sent inline as
//! base64 data.

use super::{http_client, send_json, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::{MemoriaError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Client for a Gemini-style `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error when no API key is configured
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| MemoriaError::Config("No generator API key configured".to_string()))?;

        tracing::info!(
            "Initialized generator: base={}, model={}",
            config.base_url,
            config.model
        );

        Ok(Self {
            client: http_client(config.timeout_seconds)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, parts: Vec<Value>) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({ "contents": [{ "parts": parts }] });

        tracing::debug!("Sending generator request: model={}", self.model);
        let request = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let response: GenerateResponse = send_json(request, "Generator").await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(
                MemoriaError::Collaborator("Generator returned no text".to_string()).into(),
            );
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn describe_image(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        self.generate_content(vec![
            json!({ "inline_data": { "mime_type": mime_type, "data": STANDARD.encode(image) } }),
            json!({ "text": prompt }),
        ])
        .await
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(vec![json!({ "text": prompt })]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        assert!(GeminiClient::from_config(&GeneratorConfig::default()).is_err());

        let config = GeneratorConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_response_without_candidates_parses() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
