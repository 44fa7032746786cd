//! Matching live files against snapshots and promoting snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::diff::{DiffMode, DiffResult};
use crate::key::SnapshotKey;
use crate::sort::quicksort_versions;
use crate::{Error, Result};

const BACKUP_TIMESTAMP: &str = "%Y%m%d.%H%M%S.%6f";

/// Result of looking a live file up in the snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStateMatch {
    pub matched: bool,
    pub snapshot: Option<SnapshotKey>,
    pub diff: Option<DiffResult>,
}

impl FileStateMatch {
    fn none() -> Self {
        Self {
            matched: false,
            snapshot: None,
            diff: None,
        }
    }
}

/// One file promoted (or left alone) by [`FileStateManager::change_file_state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub snapshot: SnapshotKey,
    pub target: PathBuf,
    /// `false` when the live file already matched the snapshot.
    pub copied: bool,
    /// Copy of the previous live file, if there was one to keep.
    pub backup: Option<PathBuf>,
}

/// Where backups go when none is configured.
pub fn default_backup_root(is_root: bool) -> Option<PathBuf> {
    if is_root {
        Some(PathBuf::from("/var/db/baseline"))
    } else {
        dirs::home_dir().map(|home| home.join(".baseline"))
    }
}

/// Answers "which known state is this file in" for one software version.
#[derive(Debug, Clone)]
pub struct FileStateManager {
    prefix: PathBuf,
    version: String,
    mode: DiffMode,
    backup_root: Option<PathBuf>,
}

impl FileStateManager {
    pub fn new(prefix: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
            mode: DiffMode::default(),
            backup_root: default_backup_root(false),
        }
    }

    pub fn with_mode(mut self, mode: DiffMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_backup_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.backup_root = Some(root.into());
        self
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    pub fn key(&self, state: &str) -> SnapshotKey {
        SnapshotKey::new(&self.prefix, &self.version, state)
    }

    /// Version directories under the prefix, oldest first.
    pub fn versions(&self) -> Result<Vec<String>> {
        if !self.prefix.is_dir() {
            return Err(Error::MissingPrefix {
                path: self.prefix.clone(),
            });
        }
        let entries =
            fs::read_dir(&self.prefix).map_err(|e| baseline_fs::Error::io(&self.prefix, e))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| baseline_fs::Error::io(&self.prefix, e))?;
            if entry.path().is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(quicksort_versions(versions))
    }

    /// Snapshots for `states`, oldest version first.
    ///
    /// With a `target`, only snapshots holding a copy of it are listed;
    /// otherwise every existing state directory is.
    pub fn search_list(&self, states: &[&str], target: Option<&Path>) -> Result<Vec<SnapshotKey>> {
        let mut keys = Vec::new();
        for version in self.versions()? {
            for state in states {
                let key = SnapshotKey::new(&self.prefix, &version, *state);
                let present = match target {
                    Some(target) => key.mirror_of(target).is_file(),
                    None => key.root().is_dir(),
                };
                if present {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    fn check_path(target: &Path) -> Result<()> {
        if baseline_fs::is_sane_path(target) {
            Ok(())
        } else {
            Err(baseline_fs::Error::UnsafePath {
                path: target.to_path_buf(),
            }
            .into())
        }
    }

    /// Compare `target` with its copy in `key`. A missing copy or missing
    /// live file is a non-match.
    pub fn compare(&self, key: &SnapshotKey, target: &Path) -> Result<Option<DiffResult>> {
        let reference = key.mirror_of(target);
        if !reference.is_file() || !target.is_file() {
            return Ok(None);
        }
        self.mode.compare(&reference, target).map(Some)
    }

    /// Find the snapshot of state `label` that `target` matches.
    ///
    /// The current version is tried first; after that every version holding
    /// a copy, oldest first.
    pub fn is_file_in_known_state(&self, label: &str, target: &Path) -> Result<FileStateMatch> {
        self.is_file_in_states(&[label], target)
    }

    /// Like [`Self::is_file_in_known_state`] over several labels. Current
    /// version snapshots of every label are tried before any other version.
    pub fn is_file_in_states(&self, labels: &[&str], target: &Path) -> Result<FileStateMatch> {
        Self::check_path(target)?;

        let current: Vec<SnapshotKey> = labels.iter().map(|l| self.key(l)).collect();
        let others = self
            .search_list(labels, Some(target))?
            .into_iter()
            .filter(|k| k.version != self.version);

        for key in current.into_iter().chain(others) {
            if let Some(diff) = self.compare(&key, target)? {
                if diff.identical {
                    tracing::debug!(target = %target.display(), snapshot = %key, "file matches snapshot");
                    return Ok(FileStateMatch {
                        matched: true,
                        snapshot: Some(key),
                        diff: Some(diff),
                    });
                }
                tracing::debug!(target = %target.display(), snapshot = %key, "file differs from snapshot");
            }
        }

        tracing::debug!(target = %target.display(), ?labels, "file in no known state");
        Ok(FileStateMatch::none())
    }

    /// The first snapshot (current version first, then oldest) that every
    /// target matches.
    pub fn are_files_in_states(&self, labels: &[&str], targets: &[PathBuf]) -> Result<Option<SnapshotKey>> {
        for target in targets {
            Self::check_path(target)?;
        }

        let current: Vec<SnapshotKey> = labels
            .iter()
            .map(|l| self.key(l))
            .filter(|k| k.root().is_dir())
            .collect();
        let others = self
            .search_list(labels, None)?
            .into_iter()
            .filter(|k| k.version != self.version);

        'candidates: for key in current.into_iter().chain(others) {
            for target in targets {
                match self.compare(&key, target)? {
                    Some(diff) if diff.identical => {}
                    _ => continue 'candidates,
                }
            }
            return Ok(Some(key));
        }
        Ok(None)
    }

    /// Newest snapshot of `label` and the live paths it covers.
    pub fn latest_file_set(&self, label: &str) -> Result<Option<(SnapshotKey, Vec<PathBuf>)>> {
        let Some(key) = self.search_list(&[label], None)?.pop() else {
            return Ok(None);
        };

        let root = key.root();
        let mut files = Vec::new();
        collect_files(&root, &mut files)?;

        let mut live: Vec<PathBuf> = files
            .iter()
            .filter_map(|f| f.strip_prefix(&root).ok())
            .map(|rel| Path::new("/").join(rel))
            .collect();
        live.sort();
        Ok(Some((key, live)))
    }

    /// Copy `target` into a timestamped backup directory. Returns `None` when
    /// there is nothing to back up.
    pub fn backup_file(&self, target: &Path) -> Result<Option<PathBuf>> {
        if !target.is_file() {
            return Ok(None);
        }
        let root = self.backup_root.as_ref().ok_or(Error::NoBackupRoot)?;
        let stamp = Local::now().format(BACKUP_TIMESTAMP).to_string();

        let backup = SnapshotKey::new(root, &self.version, stamp).mirror_of(target);
        baseline_fs::copy_file(target, &backup)?;
        tracing::info!(target = %target.display(), backup = %backup.display(), "backed up file");
        Ok(Some(backup))
    }

    /// Put the snapshot copy of `target` in place.
    ///
    /// Nothing happens when the live file is already byte-identical. An
    /// existing live file is backed up first. The copy is not atomic; on
    /// error the live file is in an unknown state.
    pub fn change_file_state(&self, key: &SnapshotKey, target: &Path) -> Result<StateChange> {
        Self::check_path(target)?;

        let reference = key.mirror_of(target);
        if !reference.is_file() {
            return Err(Error::SnapshotMissing {
                key: key.to_string(),
                target: target.to_path_buf(),
            });
        }

        let mut change = StateChange {
            snapshot: key.clone(),
            target: target.to_path_buf(),
            copied: false,
            backup: None,
        };

        if target.exists() {
            if baseline_fs::files_identical(&reference, target)? {
                tracing::debug!(target = %target.display(), snapshot = %key, "already in state");
                return Ok(change);
            }
            change.backup = self.backup_file(target)?;
        }

        baseline_fs::copy_file(&reference, target)?;
        change.copied = true;
        tracing::info!(target = %target.display(), snapshot = %key, "changed file state");
        Ok(change)
    }

    /// Fail with [`Error::SnapshotMissing`] unless `key` holds a copy of
    /// every target.
    pub fn ensure_snapshot_covers(&self, key: &SnapshotKey, targets: &[PathBuf]) -> Result<()> {
        for target in targets {
            Self::check_path(target)?;
            if !key.mirror_of(target).is_file() {
                return Err(Error::SnapshotMissing {
                    key: key.to_string(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    /// [`Self::change_file_state`] for each target.
    ///
    /// Nothing is copied unless the snapshot covers every target. An I/O
    /// error part-way stops at that file; earlier files stay promoted.
    pub fn change_files_state(&self, key: &SnapshotKey, targets: &[PathBuf]) -> Result<Vec<StateChange>> {
        self.ensure_snapshot_covers(key, targets)?;
        targets
            .iter()
            .map(|target| self.change_file_state(key, target))
            .collect()
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| baseline_fs::Error::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| baseline_fs::Error::io(dir, e))?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_prefix_is_an_error() {
        let dir = TempDir::new().unwrap();
        let manager = FileStateManager::new(dir.path().join("nope"), "1.0");
        assert!(matches!(manager.versions(), Err(Error::MissingPrefix { .. })));
    }

    #[test]
    fn unsafe_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = FileStateManager::new(dir.path(), "1.0");
        let err = manager
            .is_file_in_known_state("after", Path::new("/etc/../etc/passwd"))
            .unwrap_err();
        assert!(matches!(err, Error::Fs(baseline_fs::Error::UnsafePath { .. })));
    }

    #[test]
    fn root_backups_go_to_var_db() {
        assert_eq!(
            default_backup_root(true),
            Some(PathBuf::from("/var/db/baseline"))
        );
    }

    #[test]
    fn backup_of_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let manager = FileStateManager::new(dir.path(), "1.0").with_backup_root(dir.path().join("b"));
        assert_eq!(manager.backup_file(&dir.path().join("absent")).unwrap(), None);
    }
}
