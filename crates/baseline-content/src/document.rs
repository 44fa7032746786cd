//! Line-oriented document model

use std::fmt;

use crate::edit::EditScript;

/// One line of a config file, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    raw: String,
    is_comment: bool,
    is_blank: bool,
}

impl Line {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim_start();
        Self {
            is_comment: trimmed.starts_with('#'),
            is_blank: trimmed.is_empty(),
            raw,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_comment(&self) -> bool {
        self.is_comment
    }

    pub fn is_blank(&self) -> bool {
        self.is_blank
    }

    /// Neither a comment nor blank.
    pub fn is_data(&self) -> bool {
        !self.is_comment && !self.is_blank
    }
}

/// An ordered sequence of lines.
///
/// Documents are never edited in place; [`Document::apply`] builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        Self {
            lines: body.split('\n').map(Line::new).collect(),
            trailing_newline,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render back to text. Line terminators are `\n`; a document that had
    /// lines appended always ends with one.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.raw);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Produce the document that results from `script`.
    ///
    /// Deletions refer to indices in `self`. Insertions at the same index are
    /// emitted in script order, ahead of the line that sits at that index.
    pub fn apply(&self, script: &EditScript) -> Document {
        if script.is_empty() {
            return self.clone();
        }

        let mut lines = Vec::with_capacity(self.lines.len() + script.inserted_len());
        for index in 0..=self.lines.len() {
            for insertion in script.insertions().iter().filter(|ins| ins.at == index) {
                lines.extend(insertion.lines.iter().map(|l| Line::new(l.as_str())));
            }
            if let Some(line) = self.lines.get(index) {
                if !script.deletes(index) {
                    lines.push(line.clone());
                }
            }
        }

        let trailing_newline = self.trailing_newline || script.inserted_len() > 0;
        Document {
            lines,
            trailing_newline,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
