//! Loose dotted-version ordering.
//!
//! Baseline files and host facts carry version strings that are not semver:
//! `10.9`, `10.10.5`, `7.2.1511`, `2.6.32-rc1`. A [`LooseVersion`] splits the
//! string into runs of digits and runs of other characters and compares them
//! component by component, so `10.9 < 10.10` holds numerically.
//!
//! # Examples
//!
//! ```
//! use baseline_version::LooseVersion;
//!
//! let old: LooseVersion = "10.9".parse().unwrap();
//! let new: LooseVersion = "10.10".parse().unwrap();
//! assert!(old < new);
//! assert!(LooseVersion::new("10.11") < LooseVersion::new("10.11.5"));
//! ```

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One component of a loose version.
///
/// Numeric components sort before textual ones when the two meet at the
/// same position, e.g. `1.2.3 < 1.2.a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    Number(u64),
    Text(String),
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Number(a), Component::Number(b)) => a.cmp(b),
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
            (Component::Number(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version string ordered component-wise.
///
/// Equality and ordering look only at the parsed components; the original
/// text is kept for display.
#[derive(Debug, Clone)]
pub struct LooseVersion {
    raw: String,
    components: Vec<Component>,
}

impl LooseVersion {
    /// Parse a version string. Every string is accepted; an empty string has
    /// no components and sorts before everything else.
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            components: split_components(raw),
        }
    }

    /// The original text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

fn split_components(raw: &str) -> Vec<Component> {
    #[derive(PartialEq, Clone, Copy)]
    enum Run {
        Digit,
        Lower,
        Other,
    }

    fn class(c: char) -> Option<Run> {
        if c == '.' {
            None
        } else if c.is_ascii_digit() {
            Some(Run::Digit)
        } else if c.is_ascii_lowercase() {
            Some(Run::Lower)
        } else {
            Some(Run::Other)
        }
    }

    let mut components = Vec::new();
    let mut current = String::new();
    let mut current_class: Option<Run> = None;

    let mut flush = |buf: &mut String, kind: Option<Run>| {
        if buf.is_empty() {
            return;
        }
        let component = match kind {
            Some(Run::Digit) => match buf.parse::<u64>() {
                Ok(n) => Component::Number(n),
                Err(_) => Component::Text(buf.clone()),
            },
            _ => Component::Text(buf.clone()),
        };
        components.push(component);
        buf.clear();
    };

    for c in raw.trim().chars() {
        let kind = class(c);
        if kind != current_class {
            flush(&mut current, current_class);
            current_class = kind;
        }
        if kind.is_some() {
            current.push(c);
        }
    }
    flush(&mut current, current_class);

    components
}

impl FromStr for LooseVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for LooseVersion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LooseVersion {}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for LooseVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for LooseVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}
