//! Error types for baseline-prefs

use std::time::Duration;

/// Result type for baseline-prefs operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command {argv:?} timed out after {timeout:?}")]
    Timeout { argv: Vec<String>, timeout: Duration },

    #[error("Command {argv:?} failed (status {status:?}): {stderr}")]
    ExternalCommand {
        argv: Vec<String>,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Cannot tokenize {input:?}: {reason}")]
    Tokenize { input: String, reason: String },

    #[error("Invalid match pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
