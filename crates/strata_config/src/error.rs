//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `strata.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value is out of range.
    #[error("validation error: {0}")]
    ValidationError(String),
}
