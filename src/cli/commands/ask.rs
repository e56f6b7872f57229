//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::ChatService;
use anyhow::Result;

/// Run the ask command.
///
/// Uses the same question-answering path as the HTTP endpoint; warnings
/// render as their Spanish-language strings rather than failing the command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'cronista doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let service = ChatService::from_settings(settings)?;

    let spinner = Output::spinner("Preparing the index...");
    let report = service.initialize().await?;
    spinner.finish_and_clear();

    if !report.skipped {
        Output::info(&format!(
            "Indexed {} fragments from {} sources",
            report.fragments_written, report.sources_fetched
        ));
    }

    let spinner = Output::spinner("Generating answer...");
    let result = service.answer(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => println!("\n{}\n", answer),
        Err(e) => println!("\n{}\n", e.user_message()),
    }

    Ok(())
}
