//! Doctor command - verify system requirements and configuration.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Cronista Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check the Ollama server and its models
    println!("{}", style("Ollama").bold());
    let ollama_checks = check_ollama(settings).await;
    for check in &ollama_checks {
        check.print();
    }
    checks.extend(ollama_checks);

    println!();

    // Check local state
    println!("{}", style("Local State").bold());
    let state_checks = check_local_state(settings);
    for check in &state_checks {
        check.print();
    }
    checks.extend(state_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Cronista.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Cronista is ready to use.");
    }

    Ok(())
}

/// Check that the Ollama server is reachable and the configured models are installed.
async fn check_ollama(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match preflight::installed_models(&settings.ollama.host).await {
        Ok(installed) => {
            results.push(CheckResult::ok(
                "Server",
                &format!("{} ({} models installed)", settings.ollama.host, installed.len()),
            ));
            results.push(check_model(&installed, "Embedding model", &settings.embedding.model));
            results.push(check_model(&installed, "Generation model", &settings.llm.model));
        }
        Err(e) => {
            results.push(CheckResult::error(
                "Server",
                &format!("not reachable at {}", settings.ollama.host),
                "Start it with: ollama serve",
            ));
            tracing::debug!(error = %e, "ollama tags request failed");
            results.push(CheckResult::warning(
                "Embedding model",
                "not checked",
                "Server must be running to verify models",
            ));
            results.push(CheckResult::warning(
                "Generation model",
                "not checked",
                "Server must be running to verify models",
            ));
        }
    }

    results
}

fn check_model(installed: &[String], name: &str, model: &str) -> CheckResult {
    if installed.iter().any(|m| preflight::model_matches(m, model)) {
        CheckResult::ok(name, model)
    } else {
        CheckResult::error(
            name,
            &format!("'{}' is not installed", model),
            &format!("Pull it with: ollama pull {}", model),
        )
    }
}

/// Check the data directory and fragment database.
fn check_local_state(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Database",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", db_path.display()),
            "Run: cronista ingest",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create one at the path shown by: cronista config path",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_model_hint_names_the_pull_command() {
        let installed = vec!["llama3:latest".to_string()];
        let result = check_model(&installed, "Embedding model", "all-minilm");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(
            result.hint,
            Some("Pull it with: ollama pull all-minilm".to_string())
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
