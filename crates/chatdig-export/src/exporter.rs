//! Per-database export driver.

use crate::assemble::assemble;
use crate::error::ExportError;
use crate::image::ImageLocator;
use crate::timestamp::TimeZoneMode;
use crate::writer::{ExportDocument, write_csv, write_json};
use chatdig_reconcile::{ReconcileContext, ReconcileOptions};
use chatdig_store::RecordSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufWriter;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Which output files to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn writes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn writes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

impl FromStr for ExportFormat {
    type Err = chatdig_types::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "both" => Ok(Self::Both),
            other => Err(chatdig_types::ConfigError::InvalidValue {
                key: "format".into(),
                message: format!("expected json, csv or both, got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Both => "both",
        })
    }
}

/// Everything one database export needs besides the record source.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Data root; sidecar images are resolved and reported relative to it.
    pub root: PathBuf,
    /// Parent of the per-database output directories.
    pub out_root: PathBuf,
    pub format: ExportFormat,
    pub zone: TimeZoneMode,
    pub reconcile: ReconcileOptions,
}

/// Result of exporting one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub db_name: String,
    pub record_count: usize,
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

/// Reconcile, assemble and write one database to `<out_root>/<db>/`.
pub fn export_database(
    source: &dyn RecordSource,
    db: &str,
    settings: &ExportSettings,
) -> Result<ExportSummary, ExportError> {
    let db_name = if db.is_empty() { "unknown" } else { db };
    let reconciled = ReconcileContext::load(source, db, settings.reconcile)?;
    let images = ImageLocator::new(&settings.root, db_name);
    let records = assemble(&reconciled, db_name, settings.zone, &images);

    let out_dir = settings.out_root.join(db_name);
    std::fs::create_dir_all(&out_dir).map_err(|source| ExportError::Write {
        path: out_dir.display().to_string(),
        source,
    })?;

    let mut summary = ExportSummary {
        db_name: db_name.to_string(),
        record_count: records.len(),
        json_path: None,
        csv_path: None,
    };

    if settings.format.writes_json() {
        info!(db = %db_name, "writing JSON");
        let path = out_dir.join("messages.json");
        let document =
            ExportDocument::new(db_name, &records, &reconciled.members, &reconciled.chats);
        write_json(&path, &document)?;
        summary.json_path = Some(path);
    }

    if settings.format.writes_csv() {
        info!(db = %db_name, "writing CSV");
        let path = out_dir.join("messages.csv");
        let file = std::fs::File::create(&path).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })?;
        write_csv(BufWriter::new(file), &records)?;
        summary.csv_path = Some(path);
    }

    Ok(summary)
}
