//! Multi-tier TOML configuration for chatdig.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use chatdig_export::{ExportFormat, ExportSettings, TimeZoneMode};
use chatdig_reconcile::ReconcileOptions;
use chatdig_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The default data root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "zentaoclient";

/// The default output directory.
pub const DEFAULT_OUT: &str = "output";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub root: PathBuf,
    pub out: PathBuf,
    /// Databases to export. Empty means all of them.
    pub db_names: Vec<String>,
    pub format: ExportFormat,
    pub timezone: TimeZoneMode,
    pub include_deleted: bool,
    pub include_duplicates: bool,
    /// Stop at the first failing database instead of continuing.
    pub fail_fast: bool,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub export: ExportSection,
}

/// `[export]` section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub root: Option<PathBuf>,
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub databases: Vec<String>,
    pub format: Option<String>,
    pub timezone: Option<String>,
    pub include_deleted: Option<bool>,
    pub include_duplicates: Option<bool>,
    pub fail_fast: Option<bool>,
}

/// CLI overrides that take highest precedence.
///
/// Switches only ever turn a behaviour on; an unset switch defers to the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub db_names: Vec<String>,
    pub format: Option<ExportFormat>,
    pub timezone: Option<TimeZoneMode>,
    pub include_deleted: bool,
    pub include_duplicates: bool,
    pub fail_fast: bool,
}

impl ExportConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (CHATDIG_ROOT, CHATDIG_OUT, CHATDIG_FORMAT, CHATDIG_TIMEZONE)
    /// 3. Config file (~/.chatdig/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let settings = load_settings_file(&config_dir().join("config.toml"));
        Self::resolve(overrides, |key| std::env::var(key).ok(), settings)
    }

    /// Apply precedence rules to already-gathered sources.
    pub fn resolve(
        overrides: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
        settings: SettingsFile,
    ) -> Result<Self, ConfigError> {
        let file = settings.export;

        let root = overrides
            .root
            .or_else(|| env("CHATDIG_ROOT").map(PathBuf::from))
            .or(file.root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        let out = overrides
            .out
            .or_else(|| env("CHATDIG_OUT").map(PathBuf::from))
            .or(file.out)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

        // Parse failures from env or file are errors, not silent defaults
        let format = match overrides.format {
            Some(format) => format,
            None => env("CHATDIG_FORMAT")
                .or(file.format)
                .map(|s| s.parse::<ExportFormat>())
                .transpose()?
                .unwrap_or_default(),
        };

        let timezone = match overrides.timezone {
            Some(zone) => zone,
            None => env("CHATDIG_TIMEZONE")
                .or(file.timezone)
                .map(|s| s.parse::<TimeZoneMode>())
                .transpose()?
                .unwrap_or_default(),
        };

        let db_names = if overrides.db_names.is_empty() {
            file.databases
        } else {
            overrides.db_names
        };

        Ok(ExportConfig {
            root,
            out,
            db_names: dedup_names(db_names),
            format,
            timezone,
            include_deleted: overrides.include_deleted || file.include_deleted.unwrap_or(false),
            include_duplicates: overrides.include_duplicates
                || file.include_duplicates.unwrap_or(false),
            fail_fast: overrides.fail_fast || file.fail_fast.unwrap_or(false),
        })
    }

    /// Per-database export settings derived from this configuration.
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            root: self.root.clone(),
            out_root: self.out.clone(),
            format: self.format,
            zone: self.timezone,
            reconcile: ReconcileOptions {
                include_deleted: self.include_deleted,
                include_duplicates: self.include_duplicates,
            },
        }
    }

    /// Pick the databases to export from those available.
    ///
    /// With no names configured every database is selected. Otherwise the
    /// configured names are kept in order; any name that does not exist is
    /// an error listing what is available.
    pub fn select_databases(&self, available: &[String]) -> Result<Vec<String>, ConfigError> {
        if self.db_names.is_empty() {
            return Ok(available.to_vec());
        }
        let selected: Vec<String> = self
            .db_names
            .iter()
            .filter(|name| available.contains(name))
            .cloned()
            .collect();
        if selected.len() < self.db_names.len() {
            let mut available = available.to_vec();
            available.sort();
            return Err(ConfigError::UnknownDatabase {
                requested: self.db_names.clone(),
                available,
            });
        }
        Ok(selected)
    }
}

/// Get the chatdig config directory path (~/.chatdig/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATDIG_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chatdig")
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

/// Drop repeated names, keeping the first occurrence.
fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
