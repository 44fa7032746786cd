//! Edit scripts over a [`crate::Document`].

use std::collections::BTreeSet;

/// A batch of lines inserted before the line at `at`.
///
/// `at == document.len()` appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub at: usize,
    pub lines: Vec<String>,
}

impl Insertion {
    pub fn new(at: usize, lines: Vec<String>) -> Self {
        Self { at, lines }
    }
}

/// Deletions and insertions computed against one document.
///
/// All indices refer to the source document, so the script is independent of
/// the order in which edits were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    deletions: BTreeSet<usize>,
    insertions: Vec<Insertion>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, index: usize) {
        self.deletions.insert(index);
    }

    pub fn insert(&mut self, insertion: Insertion) {
        if !insertion.lines.is_empty() {
            self.insertions.push(insertion);
        }
    }

    pub fn deletes(&self, index: usize) -> bool {
        self.deletions.contains(&index)
    }

    pub fn deletions(&self) -> &BTreeSet<usize> {
        &self.deletions
    }

    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }

    pub(crate) fn inserted_len(&self) -> usize {
        self.insertions.iter().map(|i| i.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty()
    }
}
