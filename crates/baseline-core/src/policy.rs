//! Policy manifests
//!
//! A policy is one TOML file: a name, an optional applicability descriptor,
//! and a list of checks.
//!
//! ```toml
//! name = "ssh-root-login"
//!
//! [applicability]
//! type = "allow"
//! family = ["linux"]
//!
//! [[check]]
//! kind = "conf"
//! path = "/etc/ssh/sshd_config"
//! syntax = "space"
//!
//! [check.values]
//! PermitRootLogin = "no"
//! ```

use std::path::{Path, PathBuf};

use baseline_content::{DesiredState, Intent, Separator};
use baseline_state::DiffMode;
use serde::Deserialize;

use crate::{Error, Result};

/// A key/value file reconciled with the flat or space dialect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfCheck {
    pub path: PathBuf,
    /// Detected from the file when omitted.
    pub syntax: Option<Separator>,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub values: DesiredState,
}

/// One `[tag]` section of a tagged file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Section {
    pub tag: String,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub values: DesiredState,
}

/// Sections of a tagged file, reconciled in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaggedCheck {
    pub path: PathBuf,
    pub syntax: Option<Separator>,
    #[serde(rename = "section")]
    pub sections: Vec<Section>,
}

/// One key in the preference store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultsCheck {
    pub domain: String,
    pub key: String,
    /// Regex the current value must match. Required with `write`.
    #[serde(rename = "match")]
    pub pattern: Option<String>,
    /// Write arguments, e.g. `-bool false`. Omitted means the key must not exist.
    pub write: Option<String>,
    #[serde(default)]
    pub current_host: bool,
    pub program: Option<String>,
}

/// Files that must match a known snapshot state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileStateCheck {
    pub prefix: PathBuf,
    pub state: String,
    /// Snapshot version tried first; defaults to the host OS version.
    pub version: Option<String>,
    /// Defaults to every file in the newest snapshot of `state`.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Overrides the configured diff mode.
    pub mode: Option<DiffMode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Check {
    Conf(ConfCheck),
    Tagged(TaggedCheck),
    Defaults(DefaultsCheck),
    FileState(FileStateCheck),
}

impl Check {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conf(_) => "conf",
            Self::Tagged(_) => "tagged",
            Self::Defaults(_) => "defaults",
            Self::FileState(_) => "file-state",
        }
    }

    /// What the check looks at, for reports.
    pub fn target(&self) -> String {
        match self {
            Self::Conf(c) => c.path.display().to_string(),
            Self::Tagged(c) => c.path.display().to_string(),
            Self::Defaults(c) => format!("{} {}", c.domain, c.key),
            Self::FileState(c) => format!("{} ({})", c.prefix.display(), c.state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Policy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw descriptor, validated when the policy is evaluated.
    pub applicability: Option<toml::Value>,
    #[serde(default, rename = "check")]
    pub checks: Vec<Check>,
}

impl Policy {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a manifest. A missing `name` falls back to the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let content = baseline_fs::read_text(path)?;
        let mut policy: Policy = toml::from_str(&content).map_err(|source| Error::PolicyParse {
            path: path.to_path_buf(),
            source,
        })?;
        if policy.name.is_empty() {
            policy.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(policy)
    }

    /// Expand `paths` into manifest files: files as given, directories to
    /// their `*.toml` entries in name order.
    pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for path in paths {
            if !path.is_dir() {
                found.push(path.clone());
                continue;
            }
            let entries = std::fs::read_dir(path).map_err(|e| baseline_fs::Error::io(path, e))?;
            let mut manifests = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| baseline_fs::Error::io(path, e))?.path();
                if entry.is_file() && entry.extension().is_some_and(|ext| ext == "toml") {
                    manifests.push(entry);
                }
            }
            manifests.sort();
            found.extend(manifests);
        }
        Ok(found)
    }
}
