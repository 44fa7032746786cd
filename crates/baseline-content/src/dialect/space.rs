use crate::dialect::{Dialect, ReconcileResult, region};
use crate::document::Document;
use crate::edit::EditScript;
use crate::error::Result;
use crate::syntax::Separator;
use crate::value::{DesiredState, Intent};
use crate::MANAGED_MARKER;

/// Whitespace-separated files such as `sshd_config` or `modprobe.d` lists.
///
/// Repeatable keys are checked per element: only missing elements are
/// appended and only unwanted elements are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceDialect;

impl SpaceDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SpaceDialect {
    fn name(&self) -> &'static str {
        "space"
    }

    fn validate(
        &self,
        doc: &Document,
        desired: &DesiredState,
        intent: Intent,
    ) -> Result<ReconcileResult> {
        region::validate(doc, 0..doc.len(), Separator::Space, desired, intent)
    }

    fn plan(&self, doc: &Document, result: &ReconcileResult) -> Result<EditScript> {
        region::plan(
            doc,
            0..doc.len(),
            Separator::Space,
            result,
            doc.len(),
            Some(MANAGED_MARKER),
        )
    }
}
