//! Stock error types.

use std::path::PathBuf;

/// Errors that can occur while loading catalogs or reading part data.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    /// A catalog file that does not describe parts.
    #[error("invalid catalog {path}: {detail}")]
    InvalidCatalog { path: PathBuf, detail: String },

    /// A part value that is not a quantity.
    #[error("part '{part}' has an invalid value '{value}'")]
    InvalidPartValue { part: String, value: String },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] bem_core::CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for stock operations.
pub type Result<T> = std::result::Result<T, StockError>;
