//! Error types for timer persistence

use std::path::PathBuf;

/// Errors raised while writing the timer store.
///
/// Reads never fail: unreadable or corrupt data degrades to an empty store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize timer store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write timer store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timer store path has no parent directory: {0}")]
    NoParentDir(PathBuf),
}
