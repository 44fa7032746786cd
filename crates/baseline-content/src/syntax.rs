//! Key/value line syntax

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Line};

/// How a key is separated from its value on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Separator {
    /// `key = value`
    OpenEq,
    /// `key=value`
    ClosedEq,
    /// `key value`
    Space,
}

impl Separator {
    /// Split a data line into trimmed key and value.
    ///
    /// Equals syntaxes split on the first `=` and ignore lines without one.
    /// The space syntax splits on the first whitespace run; a bare key has an
    /// empty value.
    pub fn split<'a>(&self, line: &'a Line) -> Option<(&'a str, &'a str)> {
        if !line.is_data() {
            return None;
        }
        match self {
            Self::OpenEq | Self::ClosedEq => line
                .raw()
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim())),
            Self::Space => {
                let trimmed = line.raw().trim();
                match trimmed.split_once(char::is_whitespace) {
                    Some((k, v)) => Some((k, v.trim())),
                    None => Some((trimmed, "")),
                }
            }
        }
    }

    /// Render one key/value line.
    pub fn format(&self, key: &str, value: &str) -> String {
        match self {
            Self::OpenEq => format!("{key} = {value}"),
            Self::ClosedEq => format!("{key}={value}"),
            Self::Space if value.is_empty() => key.to_string(),
            Self::Space => format!("{key} {value}"),
        }
    }

    pub fn is_equals(&self) -> bool {
        matches!(self, Self::OpenEq | Self::ClosedEq)
    }

    /// Guess the syntax from the first data line of a document.
    pub fn detect(doc: &Document) -> Option<Self> {
        let line = doc
            .lines()
            .iter()
            .find(|l| l.is_data() && !l.raw().trim_start().starts_with('['))?;
        let raw = line.raw().trim();
        match raw.split_once('=') {
            Some((k, v)) if k.ends_with(char::is_whitespace) || v.starts_with(char::is_whitespace) => {
                Some(Self::OpenEq)
            }
            Some(_) => Some(Self::ClosedEq),
            None if raw.contains(char::is_whitespace) => Some(Self::Space),
            None => None,
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenEq => "open-eq",
            Self::ClosedEq => "closed-eq",
            Self::Space => "space",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# comment\nPASS_MAX_DAYS = 90\n", Some(Separator::OpenEq))]
    #[case("umask=077\n", Some(Separator::ClosedEq))]
    #[case("\nPermitRootLogin   no\n", Some(Separator::Space))]
    #[case("[section]\nkey=value\n", Some(Separator::ClosedEq))]
    #[case("# only comments\n", None)]
    #[case("lonely\n", None)]
    fn detects_syntax(#[case] text: &str, #[case] expected: Option<Separator>) {
        assert_eq!(Separator::detect(&Document::parse(text)), expected);
    }

    #[test]
    fn space_split_collapses_whitespace() {
        let line = Line::new("  Ciphers \t aes256-ctr,aes128-ctr  ");
        assert_eq!(Separator::Space.split(&line), Some(("Ciphers", "aes256-ctr,aes128-ctr")));
        assert_eq!(Separator::Space.split(&Line::new("install")), Some(("install", "")));
    }

    #[test]
    fn equals_split_uses_first_equals() {
        let line = Line::new("opts = a=b");
        assert_eq!(Separator::OpenEq.split(&line), Some(("opts", "a=b")));
        assert_eq!(Separator::OpenEq.split(&Line::new("no equals here")), None);
        assert_eq!(Separator::OpenEq.split(&Line::new("#k=v")), None);
    }

    #[test]
    fn formats_lines() {
        assert_eq!(Separator::OpenEq.format("k", "v"), "k = v");
        assert_eq!(Separator::ClosedEq.format("k", "v"), "k=v");
        assert_eq!(Separator::Space.format("k", "v"), "k v");
        assert_eq!(Separator::Space.format("k", ""), "k");
    }
}
