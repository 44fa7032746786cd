//! Drives a [`Dialect`] against one target file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::dialect::{Dialect, ReconcileResult};
use crate::document::Document;
use crate::error::Result;
use crate::value::{DesiredState, Intent};

/// What a commit changed, for the caller's undo ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// The target the change is meant for.
    pub path: PathBuf,
    /// Where the new content was written.
    pub written_to: PathBuf,
    /// `false` when the target did not exist before.
    pub existed: bool,
    pub before: String,
    pub after: String,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl FileChange {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    /// Unified diff of the change, three lines of context.
    pub fn unified_diff(&self) -> String {
        let name = self.path.display().to_string();
        TextDiff::from_lines(&self.before, &self.after)
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string()
    }
}

/// Validate/update/commit session over one config file.
///
/// The file is read once. Updates accumulate in a working document, so a
/// caller can run several rounds (for example a present round and an absent
/// round, or one round per section) before committing once.
pub struct ConfigReconciler {
    path: PathBuf,
    dialect: Box<dyn Dialect>,
    exists: bool,
    original: Document,
    working: Document,
}

impl ConfigReconciler {
    /// Read `path`. A missing file reads as an empty document.
    pub fn open(path: impl Into<PathBuf>, dialect: impl Dialect + 'static) -> Result<Self> {
        let path = path.into();
        let text = baseline_fs::read_text_if_exists(&path)?;
        let exists = text.is_some();
        if !exists {
            tracing::debug!(path = %path.display(), "target missing, starting from empty document");
        }
        Ok(Self::with_document(
            path,
            Document::parse(text.as_deref().unwrap_or_default()),
            exists,
            Box::new(dialect),
        ))
    }

    /// Start from in-memory text instead of reading the file.
    pub fn from_text(path: impl Into<PathBuf>, text: &str, dialect: impl Dialect + 'static) -> Self {
        Self::with_document(path.into(), Document::parse(text), true, Box::new(dialect))
    }

    fn with_document(path: PathBuf, doc: Document, exists: bool, dialect: Box<dyn Dialect>) -> Self {
        Self {
            path,
            dialect,
            exists,
            original: doc.clone(),
            working: doc,
        }
    }

    /// Switch to another dialect, keeping the working document.
    pub fn set_dialect(&mut self, dialect: impl Dialect + 'static) {
        self.dialect = Box::new(dialect);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn document(&self) -> &Document {
        &self.working
    }

    pub fn is_modified(&self) -> bool {
        self.working != self.original
    }

    pub fn validate(&self, desired: &DesiredState, intent: Intent) -> Result<ReconcileResult> {
        let result = self.dialect.validate(&self.working, desired, intent)?;
        tracing::debug!(
            path = %self.path.display(),
            dialect = self.dialect.name(),
            compliant = result.compliant,
            fixables = result.fixables.len(),
            removeables = result.removeables.len(),
            "validated"
        );
        Ok(result)
    }

    /// Apply the edits for `result` to the working document.
    pub fn update(&mut self, result: &ReconcileResult) -> Result<()> {
        if result.compliant {
            return Ok(());
        }
        self.working = self.dialect.update(&self.working, result)?;
        Ok(())
    }

    /// Validate and, on drift, update. Returns the validation result.
    pub fn reconcile(&mut self, desired: &DesiredState, intent: Intent) -> Result<ReconcileResult> {
        let result = self.validate(desired, intent)?;
        self.update(&result)?;
        Ok(result)
    }

    /// What committing now would change, without writing anything.
    pub fn pending_change(&self, dest: &Path) -> FileChange {
        let before = self.original.render();
        let after = self.working.render();

        let mut removed = Vec::new();
        let mut added = Vec::new();
        for change in TextDiff::from_lines(&before, &after).iter_all_changes() {
            let line = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                ChangeTag::Delete => removed.push(line),
                ChangeTag::Insert => added.push(line),
                ChangeTag::Equal => {}
            }
        }

        FileChange {
            path: self.path.clone(),
            written_to: dest.to_path_buf(),
            existed: self.exists,
            before,
            after,
            removed,
            added,
        }
    }

    /// Write the working document to `dest`. The target itself is never
    /// written; replacing it with `dest` is up to the caller.
    pub fn commit(&self, dest: &Path) -> Result<FileChange> {
        let change = self.pending_change(dest);
        baseline_fs::write_text(dest, &change.after)?;
        tracing::info!(
            path = %self.path.display(),
            dest = %dest.display(),
            added = change.added.len(),
            removed = change.removed.len(),
            "committed"
        );
        Ok(change)
    }
}

impl std::fmt::Debug for ConfigReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigReconciler")
            .field("path", &self.path)
            .field("dialect", &self.dialect.name())
            .field("exists", &self.exists)
            .field("modified", &self.is_modified())
            .finish()
    }
}
