use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The configured source directory does not exist. Fatal: there is
    /// nothing to ingest and retrying without intervention cannot succeed.
    #[error("Source directory not found: {0}")]
    SourceDirectoryMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
