//! RAG (Retrieval-Augmented Generation) for question answering.
//!
//! Provides the ability to ask questions and get Spanish-language answers
//! grounded in the indexed source pages.

pub mod context;
mod service;

pub use context::{format_context, ContextBuilder};
pub use service::{AnswerError, ChatService};

use crate::vector_store::ScoredFragment;

/// A fragment retrieved as context for a question.
#[derive(Debug, Clone)]
pub struct RetrievedFragment {
    /// URL of the page the fragment came from.
    pub source_url: String,
    /// Fragment text.
    pub content: String,
    /// Similarity to the question (higher is better).
    pub score: f32,
}

impl From<ScoredFragment> for RetrievedFragment {
    fn from(result: ScoredFragment) -> Self {
        Self {
            source_url: result.fragment.source_url,
            content: result.fragment.content,
            score: result.score,
        }
    }
}
