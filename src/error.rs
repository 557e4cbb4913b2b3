//! Error types for the colisten engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by catalog loading, synthesis, the interaction store and ranking.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Synthesis asked for more songs per user than the catalog holds
    #[error("Not enough catalog tracks to choose from: {required} songs per user requested, {available} available")]
    InsufficientCatalog { required: usize, available: usize },

    /// Catalog file is absent
    #[error("Catalog file not found: {}", path.display())]
    CatalogUnavailable { path: PathBuf },

    /// Catalog file exists but could not be read as CSV
    #[error("Failed to read catalog {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A count parameter was zero
    #[error("Invalid value for `{name}`: {value} (must be greater than zero)")]
    InvalidParameter { name: &'static str, value: usize },

    /// Any failure talking to the interaction store
    #[error("Interaction store error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Ingestion payload was not valid JSON
    #[error("Malformed listening history payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject zero-valued count parameters.
pub(crate) fn require_positive(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(EngineError::InvalidParameter { name, value });
    }
    Ok(value)
}
