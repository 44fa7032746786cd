use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::{Dialect, ReconcileResult, region};
use crate::document::Document;
use crate::edit::{EditScript, Insertion};
use crate::error::{Error, Result};
use crate::syntax::Separator;
use crate::value::{DesiredState, Intent, Value};

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]\s*(?:#.*)?$").unwrap());

/// Name of the section a header line opens. A trailing `#` comment is allowed.
fn section_name(raw: &str) -> Option<&str> {
    SECTION_HEADER
        .captures(raw.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// A found `[tag]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    header: usize,
    body: Range<usize>,
}

/// One bracket-delimited section of an INI-like file, e.g. `[userdefaults]`
/// in `libuser.conf`.
///
/// Only the first section carrying the tag is read or written; a repeated
/// tag further down the file is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedDialect {
    tag: String,
    separator: Separator,
}

impl TaggedDialect {
    pub fn new(tag: impl Into<String>, separator: Separator) -> Self {
        Self {
            tag: tag.into(),
            separator,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn header_line(&self) -> String {
        format!("[{}]", self.tag)
    }

    fn find_section(&self, doc: &Document) -> Option<Section> {
        let lines = doc.lines();
        let header = lines
            .iter()
            .position(|l| section_name(l.raw()) == Some(self.tag.as_str()))?;
        let end = lines[header + 1..]
            .iter()
            .position(|l| section_name(l.raw()).is_some())
            .map_or(lines.len(), |offset| header + 1 + offset);
        Some(Section {
            header,
            body: header + 1..end,
        })
    }

    fn check_values(&self, desired: &DesiredState) -> Result<()> {
        if self.separator.is_equals() {
            if let Some((key, _)) = desired
                .iter()
                .find(|(_, v)| matches!(v, Value::Repeatable(_)))
            {
                return Err(Error::malformed(
                    key,
                    "repeatable values need the space-separated syntax",
                ));
            }
        }
        Ok(())
    }
}

impl Dialect for TaggedDialect {
    fn name(&self) -> &'static str {
        "tagged"
    }

    fn validate(
        &self,
        doc: &Document,
        desired: &DesiredState,
        intent: Intent,
    ) -> Result<ReconcileResult> {
        match self.find_section(doc) {
            Some(section) => region::validate(doc, section.body, self.separator, desired, intent),
            None => {
                self.check_values(desired)?;
                tracing::debug!(tag = %self.tag, ?intent, "section not found");
                Ok(match intent {
                    Intent::Present if !desired.is_empty() => {
                        ReconcileResult::from_parts(desired.clone(), DesiredState::new())
                    }
                    _ => ReconcileResult::compliant(),
                })
            }
        }
    }

    fn plan(&self, doc: &Document, result: &ReconcileResult) -> Result<EditScript> {
        match self.find_section(doc) {
            Some(section) => {
                // After the last non-blank body line.
                let insert_at = doc.lines()[section.body.clone()]
                    .iter()
                    .rposition(|l| !l.is_blank())
                    .map_or(section.header + 1, |offset| section.body.start + offset + 1);
                region::plan(doc, section.body, self.separator, result, insert_at, None)
            }
            None => {
                let mut script = EditScript::new();
                if result.fixables.is_empty() {
                    return Ok(script);
                }
                self.check_values(&result.fixables)?;
                let mut lines = vec![self.header_line()];
                for (key, value) in result.fixables.iter() {
                    match value {
                        Value::Scalar(v) => lines.push(self.separator.format(key, v.trim())),
                        Value::Repeatable(items) => lines.extend(
                            items.iter().map(|item| self.separator.format(key, item.trim())),
                        ),
                    }
                }
                script.insert(Insertion::new(doc.len(), lines));
                Ok(script)
            }
        }
    }
}
