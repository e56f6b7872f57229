//! Cronista - Question Answering about the Battle of Ayacucho
//!
//! A local-first RAG service that answers Spanish-language questions about the
//! Battle of Ayacucho (1824) from a fixed set of indexed web pages.
//!
//! The name "Cronista" is the Spanish word for "chronicler."
//!
//! # Overview
//!
//! Cronista allows you to:
//! - Fetch and index a curated set of historical web pages
//! - Search the indexed fragments semantically
//! - Ask questions and get grounded answers from a local Ollama model
//! - Serve the question/answer flow over an HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `scrape` - Page fetching and HTML cleaning
//! - `chunking` - Text splitting into overlapping fragments
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `indexer` - Ingestion pipeline coordination
//! - `llm` - Text generation
//! - `rag` - Context retrieval and answer assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use cronista::config::Settings;
//! use cronista::rag::ChatService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let service = ChatService::from_settings(settings)?;
//!
//!     // Build the index, then answer a question
//!     service.initialize().await?;
//!     let answer = service
//!         .answer("¿Quién comandó al ejército patriota en Ayacucho?")
//!         .await
//!         .unwrap_or_else(|e| e.user_message());
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod rag;
pub mod scrape;
pub mod vector_store;

pub use error::{CronistaError, Result};
