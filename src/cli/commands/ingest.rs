//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::Indexer;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest, &settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'cronista doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let indexer = Indexer::new(settings)?;

    let spinner = Output::spinner("Fetching and indexing sources...");
    let report = indexer.ensure_indexed().await;
    spinner.finish_and_clear();

    match report {
        Ok(report) if report.skipped => {
            let count = indexer.vector_store().count().await?;
            Output::warning(&format!(
                "Index already holds {} fragments. Ingestion skipped.",
                count
            ));
        }
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} fragments from {} sources",
                report.fragments_written, report.sources_fetched
            ));
            if report.sources_failed > 0 {
                Output::warning(&format!(
                    "{} source(s) could not be fetched and were skipped",
                    report.sources_failed
                ));
            }
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
