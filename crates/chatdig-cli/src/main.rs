//! chatdig CLI: rebuild chat history from a client's record stores and
//! export it as JSON and CSV.

mod batch;

use anyhow::{Context, Result, bail};
use chatdig_codec::BlockDecompressor;
use chatdig_config::{CliOverrides, ExportConfig};
use chatdig_export::{ExportFormat, TimeZoneMode};
use chatdig_store::{DumpStore, RecordSource};
use chatdig_types::ConfigError;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatdig",
    version,
    about = "Export reconciled chat history to JSON and CSV"
)]
struct Cli {
    /// Client data root (contains IndexedDB/ and users/)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Database to export; repeat for several. Defaults to all
    #[arg(long = "db-name")]
    db_name: Vec<String>,

    /// Output directory; one subdirectory per database
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep soft-deleted messages
    #[arg(long)]
    include_deleted: bool,

    /// Emit every stored message version instead of reconciling
    #[arg(long)]
    include_duplicates: bool,

    /// Output format: json, csv or both
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Timestamp zone: local or utc
    #[arg(long)]
    timezone: Option<TimeZoneMode>,

    /// List available databases and exit
    #[arg(long)]
    list: bool,

    /// Stop at the first database that fails
    #[arg(long)]
    fail_fast: bool,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ExportConfig::load(CliOverrides {
        root: cli.root,
        out: cli.out,
        db_names: cli.db_name,
        format: cli.format,
        timezone: cli.timezone,
        include_deleted: cli.include_deleted,
        include_duplicates: cli.include_duplicates,
        fail_fast: cli.fail_fast,
    })?;

    if !config.root.is_dir() {
        return Err(ConfigError::MissingRoot {
            path: config.root.display().to_string(),
        }
        .into());
    }
    let store = DumpStore::open(&config.root, Box::new(BlockDecompressor))
        .with_context(|| format!("Failed to open record stores under {}", config.root.display()))?;
    let available = store.databases().context("Failed to list databases")?;

    if cli.list {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for name in &available {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let targets = config.select_databases(&available)?;
    if targets.is_empty() {
        tracing::warn!("No databases found under {}", config.root.display());
        return Ok(());
    }

    let outcome = batch::run(&store, &targets, &config.export_settings(), config.fail_fast);
    for summary in &outcome.exported {
        let paths: Vec<String> = [&summary.json_path, &summary.csv_path]
            .into_iter()
            .flatten()
            .map(|p| p.display().to_string())
            .collect();
        println!(
            "{}: {} messages -> {}",
            summary.db_name,
            summary.record_count,
            paths.join(", ")
        );
    }

    if !outcome.failed.is_empty() {
        bail!(
            "Export failed for {} database(s): {}",
            outcome.failed.len(),
            outcome.failed_names().join(", ")
        );
    }
    Ok(())
}
