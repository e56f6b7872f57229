//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large datasets, consider using sqlite-vec extension
//! or a dedicated vector database.

use super::{cosine_similarity, Fragment, ScoredFragment, SourceInfo, VectorStore};
use crate::error::{CronistaError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fragments (
    id TEXT PRIMARY KEY,
    source_url TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_fragments_source_url ON fragments(source_url);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, fragments))]
    async fn insert_batch(&self, fragments: &[Fragment]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CronistaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for fragment in fragments {
            let embedding_bytes = Self::embedding_to_bytes(&fragment.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO fragments
                (id, source_url, chunk_index, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    fragment.id.to_string(),
                    fragment.source_url,
                    fragment.chunk_index,
                    fragment.content,
                    embedding_bytes,
                    fragment.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch inserted {} fragments", fragments.len());
        Ok(fragments.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredFragment>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CronistaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source_url, chunk_index, content, embedding, indexed_at
            FROM fragments
            "#,
        )?;

        let fragments = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let indexed_at_str: String = row.get(5)?;

            Ok(Fragment {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                source_url: row.get(1)?,
                chunk_index: row.get(2)?,
                content: row.get(3)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut results: Vec<ScoredFragment> = fragments
            .filter_map(|fragment_result| fragment_result.ok())
            .map(|fragment| {
                let score = cosine_similarity(query_embedding, &fragment.embedding);
                ScoredFragment { fragment, score }
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching fragments", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CronistaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<SourceInfo>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CronistaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_url, COUNT(*) as fragment_count, MAX(indexed_at) as indexed_at
            FROM fragments
            GROUP BY source_url
            ORDER BY source_url
            "#,
        )?;

        let sources = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(SourceInfo {
                source_url: row.get(0)?,
                fragment_count: row.get(1)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<SourceInfo> = sources.filter_map(|s| s.ok()).collect();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(url: &str, index: i32, content: &str, embedding: Vec<f32>) -> Fragment {
        Fragment::new(url.to_string(), index, content.to_string(), embedding)
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let fragments = vec![
            fragment("https://example.com/a", 0, "la batalla", vec![1.0, 0.0, 0.0]),
            fragment("https://example.com/a", 1, "la campaña", vec![0.0, 1.0, 0.0]),
            fragment("https://example.com/b", 0, "el virrey", vec![0.0, 0.0, 1.0]),
        ];

        let inserted = store.insert_batch(&fragments).await.unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].fragment.content, "la batalla");
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_empty_store_counts_zero() {
        let store = SqliteVectorStore::in_memory().unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert!(store.list_sources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sources_groups_by_url() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let fragments = vec![
            fragment("https://example.com/a", 0, "uno", vec![1.0, 0.0]),
            fragment("https://example.com/a", 1, "dos", vec![0.0, 1.0]),
            fragment("https://example.com/b", 0, "tres", vec![1.0, 1.0]),
        ];
        store.insert_batch(&fragments).await.unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source_url, "https://example.com/a");
        assert_eq!(sources[0].fragment_count, 2);
        assert_eq!(sources[1].source_url, "https://example.com/b");
        assert_eq!(sources[1].fragment_count, 1);
    }

    #[tokio::test]
    async fn test_embeddings_survive_storage() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let embedding = vec![0.25, -0.5, 0.75, 1.0];
        let fragments = vec![fragment("https://example.com/a", 0, "texto", embedding.clone())];
        store.insert_batch(&fragments).await.unwrap();

        let results = store.search(&embedding, 1).await.unwrap();
        assert_eq!(results[0].fragment.embedding, embedding);
    }

    #[tokio::test]
    async fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragments.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            let fragments = vec![fragment("https://example.com/a", 0, "uno", vec![1.0, 0.0])];
            store.insert_batch(&fragments).await.unwrap();
        }

        let reopened = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
