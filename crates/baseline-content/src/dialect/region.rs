//! Key/value scanning over a slice of a document, shared by all text dialects.

use std::ops::Range;

use crate::dialect::ReconcileResult;
use crate::document::Document;
use crate::edit::{EditScript, Insertion};
use crate::error::{Error, Result};
use crate::syntax::Separator;
use crate::value::{DesiredState, Intent, Value};

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn same_value(sep: Separator, found: &str, wanted: &str) -> bool {
    match sep {
        Separator::Space => collapse(found) == collapse(wanted),
        Separator::OpenEq | Separator::ClosedEq => found == wanted.trim(),
    }
}

fn require_space(sep: Separator, key: &str) -> Result<()> {
    if sep.is_equals() {
        return Err(Error::malformed(
            key,
            "repeatable values need the space-separated syntax",
        ));
    }
    Ok(())
}

/// Indices and values of every data line in `range` carrying `key`.
fn key_lines<'a>(
    doc: &'a Document,
    range: Range<usize>,
    sep: Separator,
    key: &'a str,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    let start = range.start;
    doc.lines()[range]
        .iter()
        .enumerate()
        .filter_map(move |(offset, line)| {
            sep.split(line)
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| (start + offset, v))
        })
}

/// Every occurrence must carry the wanted value; any other value makes the
/// key drift regardless of where it sits.
fn scalar_present(doc: &Document, range: Range<usize>, sep: Separator, key: &str, wanted: &str) -> bool {
    let mut found = false;
    for (_, value) in key_lines(doc, range, sep, key) {
        if same_value(sep, value, wanted) {
            found = true;
        } else {
            found = false;
            break;
        }
    }
    found
}

fn item_present(doc: &Document, range: Range<usize>, sep: Separator, key: &str, item: &str) -> bool {
    key_lines(doc, range, sep, key).any(|(_, v)| same_value(sep, v, item))
}

pub(crate) fn validate(
    doc: &Document,
    range: Range<usize>,
    sep: Separator,
    desired: &DesiredState,
    intent: Intent,
) -> Result<ReconcileResult> {
    let mut fixables = DesiredState::new();
    let mut removeables = DesiredState::new();

    for (key, value) in desired.iter() {
        match (intent, value) {
            (Intent::Present, Value::Scalar(wanted)) => {
                if !scalar_present(doc, range.clone(), sep, key, wanted) {
                    tracing::debug!(key, wanted = %wanted, "key missing or wrong");
                    fixables.insert(key, value.clone());
                }
            }
            (Intent::Present, Value::Repeatable(items)) => {
                require_space(sep, key)?;
                let missing: Vec<String> = items
                    .iter()
                    .filter(|item| !item_present(doc, range.clone(), sep, key, item))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    tracing::debug!(key, ?missing, "repeatable key incomplete");
                    fixables.insert(key, Value::Repeatable(missing));
                }
            }
            (Intent::Absent, Value::Scalar(_)) => {
                if key_lines(doc, range.clone(), sep, key).next().is_some() {
                    tracing::debug!(key, "unwanted key present");
                    removeables.insert(key, value.clone());
                }
            }
            (Intent::Absent, Value::Repeatable(items)) => {
                require_space(sep, key)?;
                let present: Vec<String> = items
                    .iter()
                    .filter(|item| item_present(doc, range.clone(), sep, key, item))
                    .cloned()
                    .collect();
                if !present.is_empty() {
                    tracing::debug!(key, ?present, "unwanted repeatable values present");
                    removeables.insert(key, Value::Repeatable(present));
                }
            }
        }
    }

    Ok(ReconcileResult::from_parts(fixables, removeables))
}

/// Plan edits inside `range`. New lines go in as one batch at `insert_at`,
/// in fixables order, under `marker` when one is given.
pub(crate) fn plan(
    doc: &Document,
    range: Range<usize>,
    sep: Separator,
    result: &ReconcileResult,
    insert_at: usize,
    marker: Option<&str>,
) -> Result<EditScript> {
    let mut script = EditScript::new();

    for (key, value) in result.removeables.iter() {
        match value {
            Value::Scalar(_) => {
                for (index, _) in key_lines(doc, range.clone(), sep, key) {
                    script.delete(index);
                }
            }
            Value::Repeatable(items) => {
                require_space(sep, key)?;
                for (index, found) in key_lines(doc, range.clone(), sep, key) {
                    if items.iter().any(|item| same_value(sep, found, item)) {
                        script.delete(index);
                    }
                }
            }
        }
    }

    let mut appended = Vec::new();
    for (key, value) in result.fixables.iter() {
        match value {
            Value::Scalar(wanted) => {
                for (index, _) in key_lines(doc, range.clone(), sep, key) {
                    script.delete(index);
                }
                appended.push(sep.format(key, wanted.trim()));
            }
            Value::Repeatable(items) => {
                require_space(sep, key)?;
                appended.extend(items.iter().map(|item| sep.format(key, item.trim())));
            }
        }
    }

    if !appended.is_empty() {
        if let Some(marker) = marker {
            appended.insert(0, marker.to_string());
        }
        script.insert(Insertion::new(insert_at, appended));
    }

    Ok(script)
}
