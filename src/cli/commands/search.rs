//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::Indexer;
use crate::rag::ContextBuilder;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Search, &settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'cronista doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let indexer = Indexer::new(settings)?;
    let builder =
        ContextBuilder::new(indexer.vector_store(), indexer.embedder()).with_top_k(limit);

    let spinner = Output::spinner("Searching...");
    let results = builder.build(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(fragments) => {
            if fragments.is_empty() {
                Output::warning("No fragments matched the query.");
                Output::info("Run 'cronista ingest' if the index has not been built yet.");
            } else {
                Output::success(&format!("Found {} fragments", fragments.len()));

                for fragment in &fragments {
                    Output::search_result(&fragment.source_url, fragment.score, &fragment.content);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
