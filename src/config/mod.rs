//! Configuration module for Cronista.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, FetcherSettings, GeneralSettings, LlmSettings,
    OllamaSettings, PromptSettings, RagSettings, ServerSettings, Settings, SourceSettings,
};
