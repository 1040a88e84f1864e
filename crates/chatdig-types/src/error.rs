//! Error hierarchy for chatdig.

use thiserror::Error;

/// Top-level error type for a chatdig run.
///
/// Export failures are flattened into strings here so this crate stays at
/// the bottom of the dependency graph.
#[derive(Debug, Error)]
pub enum ChatdigError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(String),
}

/// Errors from configuration loading and target selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("No database matched {requested:?}. Available: {}", available.join(", "))]
    UnknownDatabase {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Data root not found: {path}")]
    MissingRoot { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_database_lists_available_names() {
        let err = ConfigError::UnknownDatabase {
            requested: vec!["nobody@host".into()],
            available: vec!["alice@host".into(), "bob@host".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("nobody@host"));
        assert!(msg.ends_with("Available: alice@host, bob@host"));
    }

    #[test]
    fn config_error_wraps_into_top_level() {
        let err: ChatdigError = ConfigError::InvalidValue {
            key: "format".into(),
            message: "expected json, csv or both".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
