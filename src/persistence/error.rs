use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or writing a task file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no parent directory", path.display())]
    NoParent { path: PathBuf },

    #[error("{} is not a JSON object", path.display())]
    Malformed { path: PathBuf },

    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}
