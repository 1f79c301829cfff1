//! Registry error types.

/// Errors that can occur during registry lookups and composition.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No base module exists for the requested block.
    #[error("module not found: {name}")]
    ModuleNotFound { name: String },

    /// A modifier value resolves to more than one module.
    #[error("modifier {key}={value} of '{name}' resolves to more than one module")]
    AmbiguousModifier {
        name: String,
        key: String,
        value: String,
    },

    /// A module with this key is already registered.
    #[error("module '{key}' already registered")]
    AlreadyRegistered { key: String },

    /// A block or modifier name that cannot address a module.
    #[error("invalid module name '{name}'")]
    InvalidName { name: String },

    /// Ancestor chain could not be composed (cycle or excessive depth).
    #[error("composition conflict: {detail}")]
    ResolutionConflict { detail: String },

    /// Invalid module manifest.
    #[error("invalid module manifest: {detail}")]
    InvalidManifest { detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semver parse error.
    #[error("invalid version: {0}")]
    SemverVersion(#[from] semver::Error),

    /// Invalid value in a manifest.
    #[error(transparent)]
    Core(#[from] bem_core::CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
