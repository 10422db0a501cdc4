//! Error types shared across tidebar.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while loading and validating configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Reading the config file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Strict validation failed; all collected messages, one per line.
    #[error("invalid configuration:\n{}", .0.join("\n"))]
    ConfigValidation(Vec<String>),
}
