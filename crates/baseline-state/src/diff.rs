//! Comparison strategies between a snapshot copy and a live file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::Result;

/// How a live file is compared with a snapshot copy. Chosen once per manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffMode {
    /// Length then checksum compare. No diff text.
    #[default]
    ByteIdentical,
    /// Unified diff with the whole file as context.
    Unified,
    /// Line-by-line delta, every line prefixed with `  `, `- ` or `+ `.
    Incremental,
}

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub mode: DiffMode,
    pub identical: bool,
    /// Diff text for the textual modes, empty when identical.
    pub text: String,
}

impl DiffMode {
    /// Compare `reference` (the snapshot copy) with `live`.
    pub fn compare(&self, reference: &Path, live: &Path) -> Result<DiffResult> {
        if *self == Self::ByteIdentical {
            let identical = baseline_fs::files_identical(reference, live)?;
            return Ok(DiffResult {
                mode: *self,
                identical,
                text: String::new(),
            });
        }

        let before = read_lossy(reference)?;
        let after = read_lossy(live)?;
        Ok(self.compare_text(&before, &after, reference, live))
    }

    fn compare_text(&self, before: &str, after: &str, reference: &Path, live: &Path) -> DiffResult {
        let diff = TextDiff::from_lines(before, after);
        let identical = diff.iter_all_changes().all(|c| c.tag() == ChangeTag::Equal);
        if identical {
            return DiffResult {
                mode: *self,
                identical,
                text: String::new(),
            };
        }

        let text = match self {
            Self::Unified => {
                let radius = before.lines().count().max(after.lines().count());
                diff.unified_diff()
                    .context_radius(radius)
                    .header(&reference.display().to_string(), &live.display().to_string())
                    .to_string()
            }
            _ => diff
                .iter_all_changes()
                .map(|change| {
                    let sign = match change.tag() {
                        ChangeTag::Equal => "  ",
                        ChangeTag::Delete => "- ",
                        ChangeTag::Insert => "+ ",
                    };
                    format!("{sign}{}", change.value().trim_end_matches('\n'))
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };

        DiffResult {
            mode: *self,
            identical,
            text,
        }
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| baseline_fs::Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
