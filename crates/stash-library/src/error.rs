//! Library error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file did not hold the expected JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown folder: {0}")]
    UnknownFolder(String),

    #[error("No item '{id}' in folder '{folder}'")]
    UnknownItem { folder: String, id: String },

    #[error("Nothing to undo")]
    NothingToUndo,

    /// An intent reached no handler callback.
    #[error("Unhandled {0} intent")]
    Unhandled(&'static str),

    /// No export directory configured and none could be resolved.
    #[error("No export directory available")]
    NoExportDir,
}
