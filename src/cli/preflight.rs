//! Pre-flight checks before expensive operations.
//!
//! Validates that the Ollama server and the configured models are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CronistaError, Result};
use serde::Deserialize;
use std::time::Duration;

const TAGS_TIMEOUT_SECS: u64 = 5;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion requires the embedding model.
    Ingest,
    /// Answering requires the embedding and generation models.
    Ask,
    /// Search requires the embedding model.
    Search,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub async fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let installed = installed_models(&settings.ollama.host).await?;

    match operation {
        Operation::Ingest | Operation::Search => {
            check_model(&installed, &settings.embedding.model)?;
        }
        Operation::Ask => {
            check_model(&installed, &settings.embedding.model)?;
            check_model(&installed, &settings.llm.model)?;
        }
    }
    Ok(())
}

/// Fetch the list of models installed on the Ollama server.
pub async fn installed_models(host: &str) -> Result<Vec<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(TAGS_TIMEOUT_SECS))
        .build()?;

    let response = client
        .get(format!("{}/api/tags", host.trim_end_matches('/')))
        .send()
        .await
        .map_err(|e| {
            CronistaError::Config(format!(
                "Ollama is not reachable at {}: {}. Start it with: ollama serve",
                host, e
            ))
        })?
        .error_for_status()
        .map_err(|e| CronistaError::Config(format!("Ollama returned an error: {}", e)))?;

    let tags: TagsResponse = response.json().await?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

/// Check that a model is installed on the server.
fn check_model(installed: &[String], model: &str) -> Result<()> {
    if installed.iter().any(|m| model_matches(m, model)) {
        Ok(())
    } else {
        Err(CronistaError::Config(format!(
            "Model '{}' is not installed. Pull it with: ollama pull {}",
            model, model
        )))
    }
}

/// Compare model names, treating a missing tag as `:latest`.
pub fn model_matches(installed: &str, wanted: &str) -> bool {
    normalize_tag(installed) == normalize_tag(wanted)
}

fn normalize_tag(name: &str) -> &str {
    name.strip_suffix(":latest").unwrap_or(name)
}
