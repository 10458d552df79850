//! CLI error types

use pledge_types::PledgeError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Checkout file is not valid TOML or has the wrong shape
    #[error("Invalid checkout file: {0}")]
    CheckoutFile(#[from] toml::de::Error),

    /// Checkout file is well-formed but inconsistent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pricing or session error
    #[error("Pledge error: {0}")]
    Pledge(#[from] PledgeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
