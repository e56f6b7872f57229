//! Sources command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::Indexer;
use anyhow::Result;

/// Run the sources command.
pub async fn run_sources(settings: Settings) -> Result<()> {
    let indexer = Indexer::new(settings)?;

    match indexer.vector_store().list_sources().await {
        Ok(sources) => {
            if sources.is_empty() {
                Output::info("No sources indexed yet. Run 'cronista ingest' to build the index.");
            } else {
                Output::header(&format!("Indexed Sources ({})", sources.len()));
                println!();

                for source in &sources {
                    Output::source_info(
                        &source.source_url,
                        source.fragment_count,
                        &source.indexed_at.format("%Y-%m-%d").to_string(),
                    );
                }

                let total_fragments: u32 = sources.iter().map(|s| s.fragment_count).sum();
                println!();
                Output::kv("Total sources", &sources.len().to_string());
                Output::kv("Total fragments", &total_fragments.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list sources: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
