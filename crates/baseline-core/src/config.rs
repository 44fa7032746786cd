//! Engine configuration
//!
//! Loaded from a TOML file; every section and key is optional.
//!
//! ```toml
//! [host]
//! category = "medium"
//! os-version = "10.15.7"
//!
//! [exec]
//! timeout-secs = 10
//! stderr = "strict"
//!
//! [state]
//! mode = "unified"
//! backup-root = "/var/backups/baseline"
//!
//! [paths]
//! temp-suffix = ".baseline.tmp"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use baseline_applicability::{ComplianceCategory, HostFacts};
use baseline_prefs::StderrPolicy;
use baseline_state::DiffMode;
use baseline_version::LooseVersion;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_timeout_secs() -> u64 {
    30
}

fn default_temp_suffix() -> String {
    ".baseline.tmp".to_string()
}

/// Overrides for detected host facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HostConfig {
    pub family: Option<String>,
    pub os_type: Option<String>,
    pub os_version: Option<String>,
    pub root: Option<bool>,
    #[serde(default)]
    pub category: ComplianceCategory,
}

impl HostConfig {
    /// Apply the overrides on top of detected facts.
    pub fn apply(&self, mut facts: HostFacts) -> HostFacts {
        if let Some(family) = &self.family {
            facts.family = family.clone();
        }
        if let Some(os_type) = &self.os_type {
            facts.os_type = os_type.clone();
        }
        if let Some(version) = &self.os_version {
            facts.os_version = LooseVersion::new(version);
        }
        if let Some(root) = self.root {
            facts.is_root = root;
        }
        facts.category = self.category;
        facts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExecConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub stderr: StderrPolicy,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            stderr: StderrPolicy::default(),
        }
    }
}

impl ExecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StateConfig {
    #[serde(default)]
    pub mode: DiffMode,
    pub backup_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_temp_suffix")]
    pub temp_suffix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            temp_suffix: default_temp_suffix(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl EngineConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = baseline_fs::read_text(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.exec.timeout(), Duration::from_secs(30));
        assert_eq!(config.paths.temp_suffix, ".baseline.tmp");
        assert_eq!(config.state.mode, DiffMode::ByteIdentical);
        assert_eq!(config.host.category, ComplianceCategory::Low);
    }

    #[test]
    fn parses_every_section() {
        let config = EngineConfig::parse(
            r#"
            [host]
            family = "darwin"
            os-version = "10.15.7"
            root = true
            category = "high"

            [exec]
            timeout-secs = 5
            stderr = "strict"

            [state]
            mode = "incremental"
            backup-root = "/var/backups/baseline"

            [paths]
            temp-suffix = ".tmp"
            "#,
        )
        .unwrap();

        assert_eq!(config.exec.stderr, StderrPolicy::Strict);
        assert_eq!(config.state.mode, DiffMode::Incremental);
        assert_eq!(
            config.state.backup_root,
            Some(PathBuf::from("/var/backups/baseline"))
        );

        let facts = config.host.apply(HostFacts::new("linux", "Debian GNU/Linux", "12"));
        assert_eq!(facts.family, "darwin");
        assert_eq!(facts.os_type, "Debian GNU/Linux");
        assert_eq!(facts.os_version.as_str(), "10.15.7");
        assert!(facts.is_root);
        assert_eq!(facts.category, ComplianceCategory::High);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(EngineConfig::parse("[exec]\ntimeout = 5\n").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = EngineConfig::load(Path::new("/nonexistent/baseline.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }
}
