use std::path::PathBuf;

use assert_fs::prelude::*;
use baseline_state::{DiffMode, FileStateManager, SnapshotKey};
use baseline_test_utils::SnapshotTree;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

const HOSTS_OLD: &str = "127.0.0.1 localhost\n";
const HOSTS_NEW: &str = "127.0.0.1 localhost\n::1 localhost\n";

fn version_tree() -> SnapshotTree {
    ["1.2.2", "1.2.3", "1.2.4.5", "1.6.3", "2.2.3", "2.8.3"]
        .into_iter()
        .fold(SnapshotTree::new(), |tree, v| {
            tree.snapshot(v, "after", "etc/hosts", &format!("# {v}\n"))
        })
}

#[test]
fn lists_versions_oldest_first() {
    let tree = version_tree();
    let manager = FileStateManager::new(tree.prefix(), "2.2.3");
    assert_eq!(
        manager.versions().unwrap(),
        vec!["1.2.2", "1.2.3", "1.2.4.5", "1.6.3", "2.2.3", "2.8.3"]
    );
}

#[rstest]
#[case(DiffMode::ByteIdentical)]
#[case(DiffMode::Unified)]
#[case(DiffMode::Incremental)]
fn older_snapshot_matches_when_current_does_not(#[case] mode: DiffMode) {
    let tree = SnapshotTree::new()
        .snapshot("1.2.3", "after", "etc/hosts", HOSTS_OLD)
        .snapshot("2.0", "after", "etc/hosts", HOSTS_NEW)
        .live("etc/hosts", HOSTS_OLD);
    let manager = FileStateManager::new(tree.prefix(), "2.0").with_mode(mode);

    let found = manager
        .is_file_in_known_state("after", &tree.live_path("etc/hosts"))
        .unwrap();

    assert!(found.matched);
    assert_eq!(found.snapshot, Some(SnapshotKey::new(tree.prefix(), "1.2.3", "after")));
}

#[test]
fn current_version_wins_over_older_match() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/hosts", HOSTS_NEW)
        .snapshot("2.0", "after", "etc/hosts", HOSTS_NEW)
        .live("etc/hosts", HOSTS_NEW);
    let manager = FileStateManager::new(tree.prefix(), "2.0");

    let found = manager
        .is_file_in_known_state("after", &tree.live_path("etc/hosts"))
        .unwrap();
    assert_eq!(found.snapshot.map(|k| k.version), Some("2.0".to_string()));
}

#[test]
fn search_runs_oldest_to_newest() {
    let tree = version_tree().live("etc/hosts", "# 1.6.3\n");
    let manager = FileStateManager::new(tree.prefix(), "9.9");

    let found = manager
        .is_file_in_known_state("after", &tree.live_path("etc/hosts"))
        .unwrap();
    assert_eq!(found.snapshot.map(|k| k.version), Some("1.6.3".to_string()));
}

#[test]
fn unknown_file_is_not_matched() {
    let tree = version_tree().live("etc/hosts", "edited by hand\n");
    let manager = FileStateManager::new(tree.prefix(), "2.8.3").with_mode(DiffMode::Unified);

    let found = manager
        .is_file_in_known_state("after", &tree.live_path("etc/hosts"))
        .unwrap();
    assert!(!found.matched);
    assert_eq!(found.snapshot, None);
}

#[test]
fn several_labels() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "before", "etc/hosts", HOSTS_OLD)
        .snapshot("1.0", "after", "etc/hosts", HOSTS_NEW)
        .live("etc/hosts", HOSTS_OLD);
    let manager = FileStateManager::new(tree.prefix(), "1.0");

    let found = manager
        .is_file_in_states(&["after", "before"], &tree.live_path("etc/hosts"))
        .unwrap();
    assert_eq!(found.snapshot.map(|k| k.state), Some("before".to_string()));
}

#[test]
fn all_files_must_match_the_same_snapshot() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/a.conf", "a1\n")
        .snapshot("1.0", "after", "etc/b.conf", "b1\n")
        .snapshot("2.0", "after", "etc/a.conf", "a2\n")
        .snapshot("2.0", "after", "etc/b.conf", "b2\n")
        .live("etc/a.conf", "a1\n")
        .live("etc/b.conf", "b1\n");
    let manager = FileStateManager::new(tree.prefix(), "2.0");
    let targets = vec![tree.live_path("etc/a.conf"), tree.live_path("etc/b.conf")];

    let key = manager.are_files_in_states(&["after"], &targets).unwrap();
    assert_eq!(key.map(|k| k.version), Some("1.0".to_string()));

    std::fs::write(tree.live_path("etc/b.conf"), "b2\n").unwrap();
    assert_eq!(manager.are_files_in_states(&["after"], &targets).unwrap(), None);
}

#[test]
fn latest_file_set_maps_back_to_live_paths() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/old.conf", "x\n")
        .snapshot("1.10", "after", "etc/a.conf", "a\n")
        .snapshot("1.10", "after", "etc/ssh/b.conf", "b\n")
        .snapshot("1.9", "after", "etc/c.conf", "c\n");
    let manager = FileStateManager::new(tree.prefix(), "1.0");

    let (key, files) = manager.latest_file_set("after").unwrap().unwrap();
    assert_eq!(key.version, "1.10");
    assert_eq!(
        files,
        vec![tree.live_path("etc/a.conf"), tree.live_path("etc/ssh/b.conf")]
    );
    assert!(manager.latest_file_set("missing").unwrap().is_none());
}

#[test]
fn change_state_backs_up_and_copies() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/hosts", HOSTS_NEW)
        .live("etc/hosts", HOSTS_OLD);
    let backups = assert_fs::TempDir::new().unwrap();
    let manager = FileStateManager::new(tree.prefix(), "1.0").with_backup_root(backups.path());
    let target = tree.live_path("etc/hosts");

    let change = manager.change_file_state(&manager.key("after"), &target).unwrap();

    assert!(change.copied);
    assert_eq!(tree.read_live("etc/hosts"), HOSTS_NEW);
    let backup: PathBuf = change.backup.unwrap();
    assert!(backup.starts_with(backups.path().join("1.0")));
    assert_eq!(std::fs::read_to_string(backup).unwrap(), HOSTS_OLD);
}

#[test]
fn change_state_is_a_noop_when_identical() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/hosts", HOSTS_NEW)
        .live("etc/hosts", HOSTS_NEW);
    let backups = assert_fs::TempDir::new().unwrap();
    let manager = FileStateManager::new(tree.prefix(), "1.0").with_backup_root(backups.path());

    let change = manager
        .change_file_state(&manager.key("after"), &tree.live_path("etc/hosts"))
        .unwrap();

    assert!(!change.copied);
    assert_eq!(change.backup, None);
    backups.child("1.0").assert(predicate::path::missing());
}

#[test]
fn change_state_creates_missing_target() {
    let tree = SnapshotTree::new().snapshot("1.0", "after", "etc/new/file.conf", "x = 1\n");
    let manager = FileStateManager::new(tree.prefix(), "1.0");

    let changes = manager
        .change_files_state(&manager.key("after"), &[tree.live_path("etc/new/file.conf")])
        .unwrap();

    assert_eq!(changes.len(), 1);
    assert!(changes[0].copied);
    assert_eq!(changes[0].backup, None);
    assert_eq!(tree.read_live("etc/new/file.conf"), "x = 1\n");
}

#[test]
fn change_state_without_snapshot_copy_fails() {
    let tree = SnapshotTree::new().empty_state("1.0", "after");
    let manager = FileStateManager::new(tree.prefix(), "1.0");
    let err = manager
        .change_file_state(&manager.key("after"), &tree.live_path("etc/hosts"))
        .unwrap_err();
    assert!(matches!(err, baseline_state::Error::SnapshotMissing { .. }));
}

#[test]
fn change_files_state_checks_coverage_before_copying() {
    let tree = SnapshotTree::new()
        .snapshot("1.0", "after", "etc/issue", "good\n")
        .live("etc/issue", "edited\n")
        .live("etc/motd", "hello\n");
    let manager = FileStateManager::new(tree.prefix(), "1.0");

    let err = manager
        .change_files_state(
            &manager.key("after"),
            &[tree.live_path("etc/issue"), tree.live_path("etc/motd")],
        )
        .unwrap_err();

    assert!(matches!(err, baseline_state::Error::SnapshotMissing { .. }));
    assert_eq!(tree.read_live("etc/issue"), "edited\n");
}
