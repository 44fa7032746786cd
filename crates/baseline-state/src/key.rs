//! Snapshot addressing

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Identifies one snapshot directory: `<prefix>/<version>/<state>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotKey {
    pub prefix: PathBuf,
    pub version: String,
    pub state: String,
}

impl SnapshotKey {
    pub fn new(prefix: impl Into<PathBuf>, version: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
            state: state.into(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.prefix.join(&self.version).join(&self.state)
    }

    /// Where this snapshot keeps its copy of `target`.
    pub fn mirror_of(&self, target: &Path) -> PathBuf {
        let relative: PathBuf = target
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        self.root().join(relative)
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_absolute_path_under_root() {
        let key = SnapshotKey::new("/usr/share/baseline/states", "1.2.3", "after");
        assert_eq!(
            key.mirror_of(Path::new("/etc/hosts")),
            PathBuf::from("/usr/share/baseline/states/1.2.3/after/etc/hosts")
        );
        assert_eq!(key.to_string(), "1.2.3/after");
    }
}
