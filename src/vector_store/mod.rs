//! Vector store abstraction for Cronista.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded fragment of a source page stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique fragment ID.
    pub id: Uuid,
    /// URL of the page this fragment came from.
    pub source_url: String,
    /// Order of this fragment within its source page.
    pub chunk_index: i32,
    /// Text content of this fragment.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this fragment was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Fragment {
    /// Create a new fragment.
    pub fn new(source_url: String, chunk_index: i32, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url,
            chunk_index,
            content,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    /// The matched fragment.
    pub fragment: Fragment,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// URL of the source page.
    pub source_url: String,
    /// Number of indexed fragments.
    pub fragment_count: u32,
    /// When the page was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a batch of fragments with their embeddings.
    async fn insert_batch(&self, fragments: &[Fragment]) -> Result<usize>;

    /// Search for the fragments most similar to a query embedding.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredFragment>>;

    /// Get total fragment count.
    async fn count(&self) -> Result<usize>;

    /// List all indexed source pages.
    async fn list_sources(&self) -> Result<Vec<SourceInfo>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
