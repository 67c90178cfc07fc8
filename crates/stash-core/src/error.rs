//! Error types for Stash.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse error.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value outside its allowed range.
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}
