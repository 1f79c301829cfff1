//! Resolution error types.

use bem_core::Value;
use bem_registry::RegistryError;
use bem_stock::StockError;

/// Errors that can occur while resolving a block to a part.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Composition failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The catalog could not be read.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// No stock part satisfies the request.
    #[error("no part in stock for '{name}' with suitable characteristics: {request}")]
    NoSuitablePart { name: String, request: String },

    /// Parts exist, but none of their values (alone or combined) is close
    /// enough to the requested value.
    #[error("no stock value or combination for '{name}' reaches {value}")]
    Unavailable { name: String, value: Value },
}

/// Result type alias for resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;
