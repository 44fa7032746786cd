//! Facts about the running host

use baseline_version::LooseVersion;
use serde::{Deserialize, Serialize};

use crate::ComplianceCategory;

/// What the resolver knows about the host it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostFacts {
    /// Kernel family, e.g. `linux`, `darwin`, `freebsd`, `solaris`.
    pub family: String,
    /// Free-text product name, e.g. `Red Hat Enterprise Linux` or `Mac OS X`.
    pub os_type: String,
    pub os_version: LooseVersion,
    pub is_root: bool,
    /// Tier the host is held to.
    #[serde(default)]
    pub category: ComplianceCategory,
}

impl HostFacts {
    pub fn new(family: &str, os_type: &str, os_version: &str) -> Self {
        Self {
            family: family.to_string(),
            os_type: os_type.to_string(),
            os_version: LooseVersion::new(os_version),
            is_root: false,
            category: ComplianceCategory::default(),
        }
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    pub fn with_category(mut self, category: ComplianceCategory) -> Self {
        self.category = category;
        self
    }
}
