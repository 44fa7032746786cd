//! Version ranges over loose versions.
//!
//! Ranges are written as short string lists in policy data:
//!
//! | List | Range |
//! |---|---|
//! | `["10.11", "+"]` | 10.11 and later |
//! | `["10.9", "-"]` | 10.9 and earlier |
//! | `["10.8", "r", "10.6"]` | 10.6 through 10.8, either order |
//! | `["7.1", "7.4"]` | exactly one of the listed versions |

use std::fmt;

use baseline_version::LooseVersion;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    AtLeast(LooseVersion),
    AtMost(LooseVersion),
    /// Endpoints are stored low first and are never equal.
    Inclusive(LooseVersion, LooseVersion),
    ExactSet(Vec<LooseVersion>),
}

impl VersionRange {
    /// Parse a range list. The marker (`+`, `-`, `r`) may sit at any
    /// position; the remaining entries are the versions.
    pub fn parse<S: AsRef<str>>(spec: &[S]) -> Result<Self> {
        let items: Vec<String> = spec.iter().map(|s| s.as_ref().trim().to_string()).collect();
        let err = |reason: &str| Error::RangeSpec {
            spec: items.clone(),
            reason: reason.to_string(),
        };

        if items.is_empty() {
            return Err(err("empty version list"));
        }

        let versions_without = |marker: &str| -> Vec<LooseVersion> {
            items
                .iter()
                .filter(|s| s.as_str() != marker)
                .map(|s| LooseVersion::new(s))
                .collect()
        };

        if items.iter().any(|s| s == "+") {
            if items.len() != 2 {
                return Err(err("'+' takes exactly one version"));
            }
            let mut versions = versions_without("+");
            return match versions.pop() {
                Some(v) if versions.is_empty() => Ok(Self::AtLeast(v)),
                _ => Err(err("'+' takes exactly one version")),
            };
        }

        if items.iter().any(|s| s == "-") {
            if items.len() != 2 {
                return Err(err("'-' takes exactly one version"));
            }
            let mut versions = versions_without("-");
            return match versions.pop() {
                Some(v) if versions.is_empty() => Ok(Self::AtMost(v)),
                _ => Err(err("'-' takes exactly one version")),
            };
        }

        if items.iter().any(|s| s == "r") {
            if items.len() != 3 {
                return Err(err("'r' takes exactly two endpoints"));
            }
            let versions = versions_without("r");
            let [a, b] = <[LooseVersion; 2]>::try_from(versions)
                .map_err(|_| err("'r' takes exactly two endpoints"))?;
            return match a.cmp(&b) {
                std::cmp::Ordering::Less => Ok(Self::Inclusive(a, b)),
                std::cmp::Ordering::Greater => Ok(Self::Inclusive(b, a)),
                std::cmp::Ordering::Equal => Err(err("range endpoints are the same")),
            };
        }

        if items.iter().any(|s| s.is_empty()) {
            return Err(err("empty version entry"));
        }
        Ok(Self::ExactSet(items.iter().map(|s| LooseVersion::new(s)).collect()))
    }

    pub fn contains(&self, version: &LooseVersion) -> bool {
        match self {
            Self::AtLeast(min) => version >= min,
            Self::AtMost(max) => version <= max,
            Self::Inclusive(lo, hi) => lo <= version && version <= hi,
            Self::ExactSet(set) => set.iter().any(|v| v == version),
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(v) => write!(f, ">= {v}"),
            Self::AtMost(v) => write!(f, "<= {v}"),
            Self::Inclusive(lo, hi) => write!(f, "{lo} ..= {hi}"),
            Self::ExactSet(set) => {
                let parts: Vec<&str> = set.iter().map(LooseVersion::as_str).collect();
                write!(f, "one of [{}]", parts.join(", "))
            }
        }
    }
}
