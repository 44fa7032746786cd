//! Snapshot promotion driven through the engine with a loaded config.

use std::fs;

use baseline_applicability::HostFacts;
use baseline_core::{Change, Engine, EngineConfig, Policy, Status};
use baseline_state::FileStateManager;
use baseline_test_utils::{FakeDefaults, SnapshotTree};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn tree() -> SnapshotTree {
    SnapshotTree::new()
        .snapshot("9.1", "after", "etc/issue", "Authorized use only\n")
        .snapshot("9.1", "after", "etc/motd", "Welcome\n")
        .snapshot("9.3", "after", "etc/issue", "Authorized use only. Activity is logged.\n")
        .snapshot("9.3", "after", "etc/motd", "Welcome\n")
        .snapshot("9.3", "before", "etc/issue", "\\S\nKernel \\r on an \\m\n")
        .live("etc/issue", "Authorized use only\n")
        .live("etc/motd", "Welcome\n")
}

fn policy(tree: &SnapshotTree) -> Policy {
    Policy::parse(&format!(
        r#"
name = "login-banner"

[applicability]
type = "allow"
family = ["linux"]

[[check]]
kind = "file-state"
prefix = '{}'
state = "after"
"#,
        tree.prefix().display()
    ))
    .unwrap()
}

fn config(backups: &TempDir) -> EngineConfig {
    EngineConfig::parse(&format!(
        "[state]\nmode = \"unified\"\nbackup-root = '{}'\n",
        backups.path().display()
    ))
    .unwrap()
}

fn host() -> HostFacts {
    HostFacts::new("linux", "Red Hat Enterprise Linux", "9.3").with_root(true)
}

#[test]
fn older_release_snapshot_is_accepted_for_whole_file_set() {
    let tree = tree();
    let backups = TempDir::new().unwrap();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(config(&backups), host(), &defaults);

    let outcome = engine.check(&policy(&tree));
    assert_eq!(outcome.status, Status::Compliant);
    assert_eq!(outcome.checks[0].details, vec!["matches snapshot 9.1/after"]);
}

#[test]
fn drift_is_promoted_to_current_release_with_backups() {
    let tree = tree().live("etc/issue", "Hello\n");
    let backups = TempDir::new().unwrap();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(config(&backups), host(), &defaults);
    let policy = policy(&tree);

    let checked = engine.check(&policy);
    assert_eq!(checked.status, Status::NonCompliant);
    let details = checked.checks[0].details.join("\n");
    assert!(details.contains("in no known state"), "{details}");
    assert!(details.contains("+Hello"), "{details}");

    let fixed = engine.fix(&policy, false);
    assert_eq!(fixed.status, Status::Compliant);
    assert_eq!(
        tree.read_live("etc/issue"),
        "Authorized use only. Activity is logged.\n"
    );
    assert_eq!(tree.read_live("etc/motd"), "Welcome\n");

    let Change::Snapshot { snapshot, files } = &fixed.changes[0].change else {
        panic!("expected a snapshot change");
    };
    assert_eq!(snapshot.to_string(), "9.3/after");

    let issue = files
        .iter()
        .find(|f| f.target == tree.live_path("etc/issue"))
        .unwrap();
    assert!(issue.copied);
    let backup = issue.backup.as_ref().unwrap();
    assert!(backup.starts_with(backups.path().join("9.3")));
    assert_eq!(fs::read_to_string(backup).unwrap(), "Hello\n");

    let motd = files
        .iter()
        .find(|f| f.target == tree.live_path("etc/motd"))
        .unwrap();
    assert!(!motd.copied);
    assert!(motd.backup.is_none());

    assert_eq!(engine.check(&policy).status, Status::Compliant);
}

#[test]
fn manager_and_engine_agree_on_known_state() {
    let tree = tree();
    let manager = FileStateManager::new(tree.prefix(), "9.3");

    let found = manager
        .is_file_in_known_state("after", &tree.live_path("etc/issue"))
        .unwrap();
    assert!(found.matched);
    assert_eq!(found.snapshot.unwrap().to_string(), "9.1/after");

    let (key, files) = manager.latest_file_set("after").unwrap().unwrap();
    assert_eq!(key.to_string(), "9.3/after");
    assert_eq!(
        files,
        vec![tree.live_path("etc/issue"), tree.live_path("etc/motd")]
    );
}
