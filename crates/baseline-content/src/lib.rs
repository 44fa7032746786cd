//! Config file reconciliation.
//!
//! A [`ConfigReconciler`] reads a target file into a [`Document`], asks a
//! [`Dialect`] which keys are missing, wrong, or unwanted, and turns the answer
//! into an [`EditScript`] that leaves every unrelated line alone.
//!
//! Supported dialects:
//! - [`FlatDialect`]: `key = value` and `key=value`
//! - [`SpaceDialect`]: `key value`, with repeatable keys
//! - [`TaggedDialect`]: one `[tag]` section, body in either syntax

pub mod dialect;
pub mod document;
pub mod edit;
pub mod error;
pub mod reconciler;
pub mod syntax;
pub mod value;

pub use dialect::{Dialect, FlatDialect, ReconcileResult, SpaceDialect, TaggedDialect};
pub use document::{Document, Line};
pub use edit::{EditScript, Insertion};
pub use error::{Error, Result};
pub use reconciler::{ConfigReconciler, FileChange};
pub use syntax::Separator;
pub use value::{DesiredState, Intent, Value};

/// Comment placed above lines appended by a flat or space-separated update.
pub const MANAGED_MARKER: &str = "# The following lines were added by baseline";
