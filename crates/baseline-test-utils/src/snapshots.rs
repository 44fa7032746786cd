//! [`SnapshotTree`] builder for `prefix/version/state/<path>` layouts.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temp directory holding a snapshot tree under `snapshots/` and a live
/// filesystem stand-in under `live/`.
///
/// ```rust,no_run
/// use baseline_test_utils::SnapshotTree;
///
/// let tree = SnapshotTree::new()
///     .snapshot("1.2.3", "after", "etc/hosts", "127.0.0.1 localhost\n")
///     .live("etc/hosts", "127.0.0.1 localhost\n");
/// assert!(tree.live_path("etc/hosts").exists());
/// ```
pub struct SnapshotTree {
    temp_dir: TempDir,
}

impl Default for SnapshotTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("snapshots")).unwrap();
        fs::create_dir_all(temp_dir.path().join("live")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The snapshot prefix directory.
    pub fn prefix(&self) -> PathBuf {
        self.root().join("snapshots")
    }

    /// Absolute path of a file in the live stand-in.
    pub fn live_path(&self, relative: &str) -> PathBuf {
        self.root().join("live").join(relative)
    }

    /// Add a mirrored file to a snapshot. `relative` is the live path
    /// relative to the `live/` root; the snapshot mirrors the full live path.
    pub fn snapshot(self, version: &str, state: &str, relative: &str, content: &str) -> Self {
        let mirrored = self.mirror_of(version, state, relative);
        write(&mirrored, content);
        self
    }

    /// Create an empty state directory.
    pub fn empty_state(self, version: &str, state: &str) -> Self {
        fs::create_dir_all(self.prefix().join(version).join(state)).unwrap();
        self
    }

    pub fn live(self, relative: &str, content: &str) -> Self {
        write(&self.live_path(relative), content);
        self
    }

    /// Snapshot location of the live file `relative`.
    pub fn mirror_of(&self, version: &str, state: &str, relative: &str) -> PathBuf {
        let live = self.live_path(relative);
        let stripped = live.strip_prefix("/").unwrap_or(&live).to_path_buf();
        self.prefix().join(version).join(state).join(stripped)
    }

    pub fn read_live(&self, relative: &str) -> String {
        fs::read_to_string(self.live_path(relative)).unwrap()
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
