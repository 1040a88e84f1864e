//! Store-specific error types.

use chatdig_codec::DecodeError;
use thiserror::Error;

/// Errors that can occur while reading records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store directory not found: {path}")]
    NotFound { path: String },

    #[error("Unknown database: {name}")]
    UnknownDatabase { name: String },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("Malformed record at {path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
