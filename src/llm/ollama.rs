//! Ollama text generation implementation.

use super::TextGenerator;
use crate::config::{LlmSettings, OllamaSettings};
use crate::error::{CronistaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Text generator backed by a local Ollama instance's `/api/generate`
/// endpoint, called without streaming.
pub struct OllamaGenerator {
    client: reqwest::Client,
    host: String,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    /// Create a new Ollama generator from configuration.
    pub fn new(ollama: &OllamaSettings, llm: &LlmSettings) -> Result<Self> {
        Self::with_config(&ollama.host, &llm.model, llm.temperature)
    }

    /// Create a new Ollama generator with explicit host, model, and
    /// temperature.
    pub fn with_config(host: &str, model: &str, temperature: f32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    #[instrument(skip(self, prompt), fields(chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion from {}", self.model);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CronistaError::Generation(format!(
                    "Ollama request failed (is Ollama running at {}?): {}",
                    self.host, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CronistaError::Generation(format!(
                "Ollama generate API error {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CronistaError::Generation(format!("Invalid generate response: {}", e)))?;

        Ok(parsed.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator =
            OllamaGenerator::with_config("http://localhost:11434/", "phi3.5:latest", 0.5).unwrap();
        assert_eq!(generator.model(), "phi3.5:latest");
        assert_eq!(generator.host, "http://localhost:11434");
    }

    #[test]
    fn test_request_disables_streaming() {
        let request = GenerateRequest {
            model: "phi3.5:latest",
            prompt: "hola",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], serde_json::json!(false));
        assert_eq!(value["options"]["temperature"], serde_json::json!(0.5));
    }
}
