//! Error handling module for pkgsvc
//!
//! Provides the crate error type using thiserror. Only a few failures ever
//! surface as errors: most collaborator failures are reported in-line and the
//! run continues (see `logic::workflow`).

use thiserror::Error;

/// Main error type for pkgsvc
#[derive(Error, Debug)]
pub enum PkgSvcError {
    /// IO errors (prompt streams, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (package names, config values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Package installation failed. Terminal for the whole run.
    #[error("Failed to install package '{package}': {detail}")]
    Install { package: String, detail: String },

    /// Interactive input could not be obtained
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pkgsvc operations
pub type Result<T> = std::result::Result<T, PkgSvcError>;

impl PkgSvcError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an install error
    pub fn install(package: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Install {
            package: package.into(),
            detail: detail.into(),
        }
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }
}
