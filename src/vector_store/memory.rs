//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, Fragment, ScoredFragment, SourceInfo, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    fragments: RwLock<HashMap<String, Fragment>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            fragments: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(&self, fragments: &[Fragment]) -> Result<usize> {
        let mut store = self.fragments.write().unwrap();
        for fragment in fragments {
            store.insert(fragment.id.to_string(), fragment.clone());
        }
        Ok(fragments.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredFragment>> {
        let fragments = self.fragments.read().unwrap();

        let mut results: Vec<ScoredFragment> = fragments
            .values()
            .map(|fragment| {
                let score = cosine_similarity(query_embedding, &fragment.embedding);
                ScoredFragment {
                    fragment: fragment.clone(),
                    score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let fragments = self.fragments.read().unwrap();
        Ok(fragments.len())
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>> {
        let fragments = self.fragments.read().unwrap();

        let mut source_map: HashMap<String, SourceInfo> = HashMap::new();

        for fragment in fragments.values() {
            let entry = source_map
                .entry(fragment.source_url.clone())
                .or_insert_with(|| SourceInfo {
                    source_url: fragment.source_url.clone(),
                    fragment_count: 0,
                    indexed_at: fragment.indexed_at,
                });

            entry.fragment_count += 1;
            if fragment.indexed_at > entry.indexed_at {
                entry.indexed_at = fragment.indexed_at;
            }
        }

        let mut sources: Vec<SourceInfo> = source_map.into_values().collect();
        sources.sort_by(|a, b| a.source_url.cmp(&b.source_url));

        Ok(sources)
    }
}
