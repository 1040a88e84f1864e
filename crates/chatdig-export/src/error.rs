//! Export-specific error types.

use chatdig_store::StoreError;
use thiserror::Error;

/// Errors that can occur while exporting one database.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<ExportError> for chatdig_types::ChatdigError {
    fn from(e: ExportError) -> Self {
        chatdig_types::ChatdigError::Export(e.to_string())
    }
}
