//! Error types for baseline-content

use std::path::PathBuf;

/// Result type for baseline-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a config file.
///
/// Drift is not an error; it is a non-compliant [`crate::ReconcileResult`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed desired state for key {key:?}: {reason}")]
    MalformedDialectSpec { key: String, reason: String },

    #[error("Could not detect key/value syntax of {path}")]
    UnknownSyntax { path: PathBuf },

    #[error(transparent)]
    Fs(#[from] baseline_fs::Error),
}

impl Error {
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDialectSpec {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
