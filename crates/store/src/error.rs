use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by a [`ReportStore`](crate::ReportStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// An underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be parsed back into a report.
    #[error("corrupt record {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// An entry with the same name already exists and was left untouched.
    #[error("entry already exists: {}", .0.display())]
    Conflict(PathBuf),

    /// The configured store location is unusable.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}
