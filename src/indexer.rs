//! Ingestion pipeline for Cronista.
//!
//! Coordinates fetching the source pages, cleaning and chunking their text,
//! generating embeddings, and writing fragments to the vector store.

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::error::Result;
use crate::scrape::{HtmlCleaner, HttpFetcher, PageFetcher};
use crate::vector_store::{Fragment, SqliteVectorStore, VectorStore};
use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Sources that contributed fragments.
    pub sources_fetched: usize,
    /// Sources that could not be fetched or yielded no text.
    pub sources_failed: usize,
    /// Fragments written to the vector store.
    pub fragments_written: usize,
    /// True when the store already held fragments and ingestion was skipped.
    pub skipped: bool,
}

/// The ingestion pipeline.
pub struct Indexer {
    settings: Settings,
    fetcher: Arc<dyn PageFetcher>,
    cleaner: HtmlCleaner,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Indexer {
    /// Create a new indexer with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        std::fs::create_dir_all(settings.data_dir())?;

        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&settings.fetcher)?);
        let embedder: Arc<dyn Embedder> =
            Arc::new(OllamaEmbedder::new(&settings.ollama, &settings.embedding)?);
        let vector_store: Arc<dyn VectorStore> =
            Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Self::with_components(settings, fetcher, embedder, vector_store)
    }

    /// Create an indexer with custom components.
    pub fn with_components(
        settings: Settings,
        fetcher: Arc<dyn PageFetcher>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let splitter = TextSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
            settings.chunking.separators.clone(),
        )?;

        Ok(Self {
            settings,
            fetcher,
            cleaner: HtmlCleaner::new(),
            splitter,
            embedder,
            vector_store,
        })
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Populate the index from the configured source URLs.
    ///
    /// A non-empty store is assumed to be already ingested and is left
    /// untouched. Sources that fail to fetch or yield no text are logged
    /// and skipped; a failing source never aborts the run.
    #[instrument(skip(self))]
    pub async fn ensure_indexed(&self) -> Result<IndexReport> {
        if self.vector_store.count().await? > 0 {
            info!("Index already populated, skipping ingestion");
            return Ok(IndexReport {
                skipped: true,
                ..Default::default()
            });
        }

        let urls = &self.settings.sources.urls;
        info!("Building index from {} sources", urls.len());

        // Fetch pages concurrently, preserving source order
        let mut pages = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let result = self.fetcher.fetch(&url).await;
                (url, result)
            })
            .buffered(self.settings.fetcher.max_concurrent.max(1));

        let mut report = IndexReport::default();
        let mut pending: Vec<(String, i32, String)> = Vec::new();

        while let Some((url, result)) = pages.next().await {
            let html = match result {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping source {}: {}", url, e);
                    report.sources_failed += 1;
                    continue;
                }
            };

            let text = self.cleaner.extract_text(&html);
            if text.is_empty() {
                warn!("Skipping source {}: no text content", url);
                report.sources_failed += 1;
                continue;
            }

            let chunks = self.splitter.split(&text);
            info!("Source {} produced {} chunks", url, chunks.len());

            for (index, chunk) in chunks.into_iter().enumerate() {
                pending.push((url.clone(), index as i32, chunk));
            }
            report.sources_fetched += 1;
        }

        if pending.is_empty() {
            warn!("No fragments produced from any source");
            return Ok(report);
        }

        let texts: Vec<String> = pending
            .iter()
            .map(|(_, _, content)| content.clone())
            .collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let fragments: Vec<Fragment> = pending
            .into_iter()
            .zip(embeddings)
            .map(|((source_url, chunk_index, content), embedding)| {
                Fragment::new(source_url, chunk_index, content, embedding)
            })
            .collect();

        report.fragments_written = self.vector_store.insert_batch(&fragments).await?;
        info!(
            "Indexed {} fragments from {} sources",
            report.fragments_written, report.sources_fetched
        );

        Ok(report)
    }
}
