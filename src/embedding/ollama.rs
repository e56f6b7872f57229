//! Ollama embeddings implementation.

use super::Embedder;
use crate::config::{EmbeddingSettings, OllamaSettings};
use crate::error::{CronistaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedder backed by a local Ollama instance's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder from configuration.
    pub fn new(ollama: &OllamaSettings, embedding: &EmbeddingSettings) -> Result<Self> {
        Self::with_config(&ollama.host, &embedding.model, embedding.dimensions as usize)
    }

    /// Create a new Ollama embedder with explicit host, model, and dimensions.
    pub fn with_config(host: &str, model: &str, dimensions: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| CronistaError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Keep request bodies small enough for the local model to handle
        const BATCH_SIZE: usize = 32;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest {
                model: &self.model,
                input: chunk,
            };

            let response = self
                .client
                .post(format!("{}/api/embed", self.host))
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    CronistaError::Embedding(format!(
                        "Ollama request failed (is Ollama running at {}?): {}",
                        self.host, e
                    ))
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CronistaError::Embedding(format!(
                    "Ollama embedding API error {}: {}",
                    status, body
                )));
            }

            let parsed: EmbedResponse = response.json().await.map_err(|e| {
                CronistaError::Embedding(format!("Invalid embedding response: {}", e))
            })?;

            if parsed.embeddings.len() != chunk.len() {
                return Err(CronistaError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    parsed.embeddings.len()
                )));
            }

            all_embeddings.extend(parsed.embeddings);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
