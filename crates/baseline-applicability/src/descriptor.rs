//! Applicability descriptors.
//!
//! In a policy manifest the descriptor is a TOML table:
//!
//! ```toml
//! [applicability]
//! type = "allow"
//! family = ["linux"]
//! requires-non-root = false
//! category = "medium"
//!
//! [applicability.os]
//! "Red Hat Enterprise Linux" = ["6.0", "+"]
//! "Mac OS X" = ["10.8", "r", "10.12"]
//! ```
//!
//! The `os` table is read in document order because later matches override
//! earlier ones during evaluation.

use std::collections::BTreeSet;

use regex::Regex;
use toml::Value;

use crate::{ComplianceCategory, Error, Result, VersionRange};

const KNOWN_KEYS: &[&str] = &["type", "family", "os", "requires-non-root", "category"];

/// Whether a descriptor lists the hosts a policy is for or the hosts it
/// excludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListType {
    Allow,
    #[default]
    Deny,
}

impl ListType {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "allow" | "white" => Ok(Self::Allow),
            "deny" | "black" => Ok(Self::Deny),
            other => Err(Error::malformed(format!(
                "type must be \"allow\" or \"deny\", got {other:?}"
            ))),
        }
    }
}

/// An OS type pattern paired with the versions it covers.
#[derive(Debug, Clone)]
pub struct OsMatcher {
    pub pattern: Regex,
    pub range: VersionRange,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicabilityDescriptor {
    pub list_type: ListType,
    pub families: BTreeSet<String>,
    /// Declaration order is kept.
    pub os_matchers: Vec<OsMatcher>,
    pub requires_non_root: bool,
    pub category: Option<ComplianceCategory>,
}

impl ApplicabilityDescriptor {
    /// Build and validate a descriptor from raw policy data.
    pub fn from_value(value: &Value) -> Result<Self> {
        let table = value
            .as_table()
            .ok_or_else(|| Error::malformed("descriptor must be a table"))?;

        if let Some(unknown) = table.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(Error::malformed(format!("unknown key {unknown:?}")));
        }

        let mut descriptor = Self::default();

        if let Some(raw) = table.get("type") {
            let s = raw
                .as_str()
                .ok_or_else(|| Error::malformed("type must be a string"))?;
            descriptor.list_type = ListType::parse(s)?;
        }

        if let Some(raw) = table.get("family") {
            descriptor.families = string_list(raw, "family")?.into_iter().collect();
        }

        if let Some(raw) = table.get("os") {
            let os = raw
                .as_table()
                .ok_or_else(|| Error::malformed("os must be a table of pattern = [versions]"))?;
            for (pattern, versions) in os {
                let spec = string_list(versions, &format!("os.{pattern:?}"))?;
                let range = VersionRange::parse(&spec)?;
                let pattern = Regex::new(pattern).map_err(|source| Error::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                descriptor.os_matchers.push(OsMatcher { pattern, range });
            }
        }

        if let Some(raw) = table.get("requires-non-root") {
            descriptor.requires_non_root = raw
                .as_bool()
                .ok_or_else(|| Error::malformed("requires-non-root must be a boolean"))?;
        }

        if let Some(raw) = table.get("category") {
            let s = raw
                .as_str()
                .ok_or_else(|| Error::malformed("category must be a string"))?;
            descriptor.category = Some(s.parse()?);
        }

        Ok(descriptor)
    }

    /// Parse a descriptor from the body of a TOML table.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let value: Value = toml::from_str(text).map_err(|e| Error::malformed(e.to_string()))?;
        Self::from_value(&value)
    }
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::malformed(format!("{field} must be a list of strings")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::malformed(format!("{field} must be a list of strings")))
        })
        .collect()
}
