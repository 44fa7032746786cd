//! Dialect strategies.
//!
//! Each dialect answers two questions about a [`Document`]: what differs from
//! the desired state ([`Dialect::validate`]) and which edits fix it
//! ([`Dialect::plan`]).

mod flat;
mod region;
mod space;
mod tagged;

pub use flat::FlatDialect;
pub use space::SpaceDialect;
pub use tagged::TaggedDialect;

use serde::Serialize;

use crate::document::Document;
use crate::edit::EditScript;
use crate::error::Result;
use crate::value::{DesiredState, Intent};

/// Outcome of validating a document against a desired state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileResult {
    pub compliant: bool,
    /// Keys that are missing or carry the wrong value, with the value to write.
    /// A repeatable key lists only the missing elements.
    pub fixables: DesiredState,
    /// Keys that are present but unwanted. A repeatable key lists only the
    /// offending elements.
    pub removeables: DesiredState,
}

impl ReconcileResult {
    pub fn compliant() -> Self {
        Self {
            compliant: true,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(fixables: DesiredState, removeables: DesiredState) -> Self {
        Self {
            compliant: fixables.is_empty() && removeables.is_empty(),
            fixables,
            removeables,
        }
    }
}

/// A key/value syntax the reconciler can drive.
pub trait Dialect: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    fn validate(
        &self,
        doc: &Document,
        desired: &DesiredState,
        intent: Intent,
    ) -> Result<ReconcileResult>;

    /// Edits that bring `doc` to the state `result` asks for.
    fn plan(&self, doc: &Document, result: &ReconcileResult) -> Result<EditScript>;

    fn update(&self, doc: &Document, result: &ReconcileResult) -> Result<Document> {
        Ok(doc.apply(&self.plan(doc, result)?))
    }
}
