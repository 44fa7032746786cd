//! Error types for baseline-applicability

/// Result type for applicability operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading a descriptor.
///
/// None of these escape [`crate::Resolver::evaluate`]; they become
/// [`crate::Applicability::Invalid`] there.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed applicability descriptor: {reason}")]
    MalformedDescriptor { reason: String },

    #[error("Invalid version range {spec:?}: {reason}")]
    RangeSpec { spec: Vec<String>, reason: String },

    #[error("Invalid OS type pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            reason: reason.into(),
        }
    }
}
