// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tidewell doctor` command implementation.
//!
//! Runs diagnostic checks against the configured storage, queue and
//! external generator.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use tidewell_anthropic::AnthropicProvider;
use tidewell_config::model::TidewellConfig;
use tidewell_core::{HealthStatus, PluginAdapter, QueueStatus, StorageAdapter, TidewellError};
use tidewell_storage::SqliteStorage;
use tidewell_storage::queries::queue::count_by_status;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `tidewell doctor` command. `plain` disables colored output.
pub async fn run_doctor(config: &TidewellConfig, plain: bool) -> Result<(), TidewellError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        // Reaching this point means the configuration loaded and validated.
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", Instant::now()),
        check_database(config).await,
        check_queue(config).await,
        check_generator(config),
    ];

    println!();
    println!("  tidewell doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}

/// Open the database (running migrations) and run the adapter health check.
async fn check_database(config: &TidewellConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;

    if !std::path::Path::new(path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {path} (will be created on first run)"),
            start,
        );
    }

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
    }
    let result = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    };
    let _ = storage.close().await;
    result
}

/// Report queue backlog and dead entries.
async fn check_queue(config: &TidewellConfig) -> CheckResult {
    let start = Instant::now();
    let name = &config.queue.name;

    if !std::path::Path::new(&config.storage.database_path).exists() {
        return CheckResult::new("Queue", CheckStatus::Warn, "database not created yet", start);
    }

    let storage = SqliteStorage::new(config.storage.clone());
    let counts = async {
        storage.initialize().await?;
        let db = storage.db()?;
        let pending = count_by_status(db, name, QueueStatus::Pending).await?;
        let failed = count_by_status(db, name, QueueStatus::Failed).await?;
        Ok::<_, TidewellError>((pending, failed))
    }
    .await;
    let _ = storage.close().await;

    match counts {
        Ok((pending, 0)) => {
            CheckResult::new("Queue", CheckStatus::Pass, format!("{name}: {pending} pending"), start)
        }
        Ok((pending, failed)) => CheckResult::new(
            "Queue",
            CheckStatus::Warn,
            format!("{name}: {pending} pending, {failed} failed"),
            start,
        ),
        Err(e) => CheckResult::new("Queue", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// Check the external generator can be constructed. Makes no network calls.
fn check_generator(config: &TidewellConfig) -> CheckResult {
    let start = Instant::now();

    if !config.generator.enabled {
        return CheckResult::new("Generator", CheckStatus::Pass, "disabled, using rules", start);
    }
    match AnthropicProvider::new(config) {
        Ok(provider) => CheckResult::new(
            "Generator",
            CheckStatus::Pass,
            format!("{} ({})", provider.name(), config.anthropic.default_model),
            start,
        ),
        Err(e) => CheckResult::new("Generator", CheckStatus::Fail, e.to_string(), start),
    }
}
