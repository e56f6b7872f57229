//! Page fetching and text extraction for the ingestion pipeline.
//!
//! Provides a trait-based interface so ingestion can run against mocked
//! sources in tests.

mod clean;

pub use clean::HtmlCleaner;

use crate::config::FetcherSettings;
use crate::error::{CronistaError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Trait for retrieving raw page content by URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw content of a page. Network and HTTP-status failures
    /// are errors; the ingestion loop decides how to handle them.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP page fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout and user-agent.
    pub fn new(settings: &FetcherSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)
            .map_err(|e| CronistaError::Fetch(format!("Invalid URL '{}': {}", url, e)))?;

        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let body = response.text().await?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
