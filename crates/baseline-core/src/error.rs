//! Error types for baseline-core

use std::path::PathBuf;

/// Result type for baseline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in baseline-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A policy manifest could not be parsed
    #[error("Invalid policy {path}: {source}")]
    PolicyParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A check is structurally wrong
    #[error("Invalid check: {reason}")]
    InvalidCheck { reason: String },

    /// No snapshot exists for the requested state
    #[error("No snapshot for state {state:?} under {prefix}")]
    NoSnapshot { state: String, prefix: PathBuf },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] baseline_fs::Error),

    #[error(transparent)]
    Applicability(#[from] baseline_applicability::Error),

    #[error(transparent)]
    Content(#[from] baseline_content::Error),

    #[error(transparent)]
    Prefs(#[from] baseline_prefs::Error),

    #[error(transparent)]
    State(#[from] baseline_state::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Errors caused by the policy data itself rather than the host.
    ///
    /// These are reported as invalid policies, everything else as failures.
    pub fn is_invalid_input(&self) -> bool {
        use baseline_content::Error as Content;
        use baseline_prefs::Error as Prefs;

        match self {
            Self::PolicyParse { .. } | Self::InvalidCheck { .. } | Self::Applicability(_) => true,
            Self::Content(Content::MalformedDialectSpec { .. } | Content::UnknownSyntax { .. }) => true,
            Self::Prefs(Prefs::Tokenize { .. } | Prefs::Pattern { .. }) => true,
            Self::Fs(baseline_fs::Error::UnsafePath { .. })
            | Self::State(baseline_state::Error::Fs(baseline_fs::Error::UnsafePath { .. })) => true,
            _ => false,
        }
    }
}
