//! Error types for baseline-state

use std::path::PathBuf;

/// Result type for baseline-state operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Snapshot prefix {path} is not a directory")]
    MissingPrefix { path: PathBuf },

    #[error("Snapshot {key} has no copy of {target}")]
    SnapshotMissing { key: String, target: PathBuf },

    #[error("No backup location available")]
    NoBackupRoot,

    #[error(transparent)]
    Fs(#[from] baseline_fs::Error),
}
