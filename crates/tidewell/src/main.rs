// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tidewell - well-being recommendations from daily mood samples.
//!
//! This is the binary entry point.

mod app;
mod commands;
mod doctor;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tidewell_core::types::DEFAULT_WINDOW_DAYS;

/// Tidewell - well-being recommendations from daily mood samples.
#[derive(Parser, Debug)]
#[command(name = "tidewell", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the queue consumer until SIGINT or SIGTERM.
    Serve,
    /// Generate recommendations for a user.
    Generate {
        #[arg(long)]
        user: String,
        /// Trailing window in days (1-30).
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Generate inline even when async mode is configured.
        #[arg(long)]
        sync: bool,
    },
    /// List a user's recommendations, most recent first.
    List {
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Record one day's mood sample.
    Record {
        #[arg(long)]
        user: String,
        /// Calendar date (YYYY-MM-DD). Defaults to today in UTC.
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        #[arg(long)]
        mood: u8,
        #[arg(long)]
        stress: u8,
        #[arg(long)]
        productivity: u8,
        #[arg(long)]
        notes: Option<String>,
        /// Free-form tag; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Check configuration, storage and provider setup.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tidewell_config::load_and_validate_path(path),
        None => tidewell_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tidewell_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Generate { user, days, sync }) => {
            commands::run_generate(config, &user, days, sync).await
        }
        Some(Commands::List { user, limit }) => commands::run_list(config, &user, limit).await,
        Some(Commands::Record {
            user,
            date,
            mood,
            stress,
            productivity,
            notes,
            tags,
        }) => {
            let input = commands::RecordInput {
                user,
                date,
                mood,
                stress,
                productivity,
                notes,
                tags,
            };
            commands::run_record(config, input).await
        }
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("tidewell: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tidewell={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
