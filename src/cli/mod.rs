//! CLI module for Cronista.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Cronista - Spanish-language question answering about the Battle of Ayacucho
///
/// A local-first RAG service that indexes a fixed set of web pages about the
/// battle and answers questions in Spanish using a local Ollama model.
/// The name "Cronista" is the Spanish word for "chronicler."
#[derive(Parser, Debug)]
#[command(name = "cronista")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server (builds the index first)
    Serve {
        /// Host to bind to (overrides the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch and index the configured source pages
    Ingest,

    /// Ask a question and get an answer from the indexed sources
    Ask {
        /// The question to ask (in Spanish)
        question: String,
    },

    /// Search the index for relevant fragments
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// List indexed source pages
    Sources,

    /// Check the Ollama backend and local state
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
