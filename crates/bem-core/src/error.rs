//! Core error types.

/// Errors raised while parsing values and request fragments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A quantity string could not be parsed.
    #[error("invalid value '{input}': {detail}")]
    InvalidValue { input: String, detail: String },

    /// A modifier selection is not of the form `key=value[,value...]`.
    #[error("invalid modifier '{input}': expected key=value[,value...]")]
    InvalidModifier { input: String },

    /// An attribute assignment is not of the form `name=value`.
    #[error("invalid attribute '{input}': expected name=value")]
    InvalidAttribute { input: String },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
