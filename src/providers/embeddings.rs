//! OpenAI-compatible embeddings client

use super::{http_client, send_json, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::{MemoriaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Client for `POST {base}/embeddings`
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl EmbeddingClient {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!(
            "Initialized embedder: base={}, model={}",
            config.base_url,
            config.model
        );
        Ok(Self {
            client: http_client(EMBEDDING_TIMEOUT_SECS)?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: vec![text],
        };

        tracing::debug!("Generating embedding with model {}", self.model);
        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response: EmbeddingResponse = send_json(builder, "Embeddings").await?;
        response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .ok_or_else(|| MemoriaError::Collaborator("No embedding returned".to_string()).into())
    }
}
