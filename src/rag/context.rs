//! Context retrieval for question answering.

use super::RetrievedFragment;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VectorStore;
use std::sync::Arc;
use tracing::debug;

/// Retrieves the stored fragments most relevant to a question.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ContextBuilder {
    /// Create a new context builder retrieving three fragments per question.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 3,
        }
    }

    /// Set the number of fragments to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve the fragments most similar to a question, best first.
    ///
    /// The question is embedded with the same embedder used at ingestion.
    /// No score threshold is applied; weakly related fragments are returned
    /// as-is.
    pub async fn build(&self, question: &str) -> Result<Vec<RetrievedFragment>> {
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .vector_store
            .search(&query_embedding, self.top_k)
            .await?;

        for result in &results {
            debug!(
                "Retrieved {} (score {:.3})",
                result.fragment.source_url, result.score
            );
        }

        Ok(results.into_iter().map(RetrievedFragment::from).collect())
    }
}

/// Join fragment texts with a blank line, in retrieval order.
pub fn format_context(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
