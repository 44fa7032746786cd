use crate::dialect::{Dialect, ReconcileResult, region};
use crate::document::Document;
use crate::edit::EditScript;
use crate::error::Result;
use crate::syntax::Separator;
use crate::value::{DesiredState, Intent};
use crate::MANAGED_MARKER;

/// `key = value` (open) or `key=value` (closed) files such as `login.defs`
/// or `sysctl.conf`.
///
/// Corrected keys are removed from their original position and appended at
/// the end of the file under [`MANAGED_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatDialect {
    separator: Separator,
}

impl FlatDialect {
    pub fn open() -> Self {
        Self {
            separator: Separator::OpenEq,
        }
    }

    pub fn closed() -> Self {
        Self {
            separator: Separator::ClosedEq,
        }
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }
}

impl Dialect for FlatDialect {
    fn name(&self) -> &'static str {
        match self.separator {
            Separator::ClosedEq => "closed-eq",
            _ => "open-eq",
        }
    }

    fn validate(
        &self,
        doc: &Document,
        desired: &DesiredState,
        intent: Intent,
    ) -> Result<ReconcileResult> {
        region::validate(doc, 0..doc.len(), self.separator, desired, intent)
    }

    fn plan(&self, doc: &Document, result: &ReconcileResult) -> Result<EditScript> {
        region::plan(
            doc,
            0..doc.len(),
            self.separator,
            result,
            doc.len(),
            Some(MANAGED_MARKER),
        )
    }
}
