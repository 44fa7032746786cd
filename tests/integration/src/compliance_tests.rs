//! End-to-end runs of the fixture policies against fixture config files.

use std::fs;
use std::path::{Path, PathBuf};

use baseline_applicability::{ComplianceCategory, HostFacts};
use baseline_core::{Change, ComplianceReport, Engine, EngineConfig, Policy, Status};
use baseline_prefs::Exec;
use baseline_test_utils::FakeDefaults;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MARKER: &str = "# The following lines were added by baseline";

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// Fixture targets copied into a temp dir, with policies pointing at them.
struct Host {
    dir: TempDir,
    policies: Vec<Policy>,
}

impl Host {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for entry in fs::read_dir(fixtures().join("targets")).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
        }

        let mut files: Vec<PathBuf> = fs::read_dir(fixtures().join("policies"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        let root = dir.path().display().to_string();
        let policies = files
            .iter()
            .map(|f| Policy::parse(&fs::read_to_string(f).unwrap().replace("@ROOT@", &root)).unwrap())
            .collect();

        Self { dir, policies }
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap()
    }
}

fn rhel() -> HostFacts {
    HostFacts::new("linux", "Red Hat Enterprise Linux", "9.3")
        .with_root(true)
        .with_category(ComplianceCategory::Medium)
}

fn macos() -> HostFacts {
    HostFacts::new("darwin", "macOS", "14.4").with_category(ComplianceCategory::Medium)
}

fn statuses(report: &ComplianceReport) -> Vec<(String, String)> {
    report
        .outcomes
        .iter()
        .map(|o| (o.policy.clone(), o.status.label().to_string()))
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn linux_host_check_fix_recheck() {
    let host = Host::new();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(EngineConfig::default(), rhel(), &defaults);

    let before = engine.check_all(&host.policies);
    assert_eq!(
        statuses(&before),
        pairs(&[
            ("guest-login", "not-applicable"),
            ("module-blacklist", "non-compliant"),
            ("password-aging", "non-compliant"),
            ("screensaver", "not-applicable"),
            ("ssh-hardening", "non-compliant"),
            ("sysctl", "non-compliant"),
        ])
    );

    let fixed = engine.fix_all(&host.policies, false);
    assert!(fixed.is_compliant(), "{fixed}");

    assert_eq!(
        host.read("sshd_config"),
        format!(
            "# OpenSSH server configuration\nPort 22\n#PermitEmptyPasswords no\n\
             Subsystem sftp /usr/libexec/openssh/sftp-server\n{MARKER}\n\
             PermitRootLogin no\nX11Forwarding no\n"
        )
    );
    assert_eq!(
        host.read("login.defs"),
        format!("# Password aging controls\nPASS_WARN_AGE\t7\nUMASK 022\n{MARKER}\nPASS_MAX_DAYS 60\nPASS_MIN_DAYS 1\n")
    );
    assert_eq!(
        host.read("libuser.conf"),
        "[import]\nlogin_defs = /etc/login.defs\n\n\
         [defaults]\nmodules = files shadow\ncrypt_style = sha512\n\n\
         [userdefaults]\nLU_USERNAME = %n\nLU_GIDNUMBER = %u\nLU_SHADOWMAX = 60\nLU_SHADOWMIN = 1\n\n\
         [groupdefaults]\nLU_GROUPNAME = %n\n"
    );
    assert_eq!(
        host.read("blacklist.conf"),
        format!(
            "# Modules that must never load\nblacklist usb-storage\ninstall cramfs /bin/true\n\
             {MARKER}\nblacklist firewire-core\nblacklist bluetooth\n"
        )
    );
    assert_eq!(
        host.read("sysctl.conf"),
        format!("# Kernel parameters\nkernel.randomize_va_space = 2\n{MARKER}\nkernel.dmesg_restrict = 1\n")
    );

    let after = engine.check_all(&host.policies);
    assert!(after.is_compliant(), "{after}");

    let again = engine.fix_all(&host.policies, false);
    assert_eq!(again.changes().count(), 0);
}

#[test]
fn change_records_cover_every_file_written() {
    let host = Host::new();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(EngineConfig::default(), rhel(), &defaults);

    let report = engine.fix_all(&host.policies, false);
    let mut paths: Vec<String> = report
        .changes()
        .filter_map(|record| match &record.change {
            Change::File { path, .. } => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    paths.sort();

    assert_eq!(
        paths,
        vec![
            "blacklist.conf",
            "libuser.conf",
            "login.defs",
            "sshd_config",
            "sysctl.conf",
            "sysctl.conf"
        ]
    );
    for record in report.changes() {
        if let Change::File { before, after, .. } = &record.change {
            assert_ne!(before, after);
        }
    }
}

#[test]
fn dry_run_touches_nothing() {
    let host = Host::new();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(EngineConfig::default(), rhel(), &defaults);

    let report = engine.fix_all(&host.policies, true);
    assert_eq!(report.changes().count(), 0);
    for name in ["sshd_config", "login.defs", "libuser.conf", "blacklist.conf", "sysctl.conf"] {
        let original = fs::read_to_string(fixtures().join("targets").join(name)).unwrap();
        assert_eq!(host.read(name), original, "{name} changed");
    }
}

#[test]
fn mac_host_fixes_preferences_and_undo_restores_them() {
    let host = Host::new();
    let defaults = FakeDefaults::new()
        .with_value("/Library/Preferences/com.apple.loginwindow", "GuestEnabled", "1")
        .with_value("com.apple.screensaver", "idleTime", "1200");
    let engine = Engine::new(EngineConfig::default(), macos(), &defaults);

    let before = engine.check_all(&host.policies);
    assert_eq!(
        statuses(&before),
        pairs(&[
            ("guest-login", "non-compliant"),
            ("module-blacklist", "not-applicable"),
            ("password-aging", "not-applicable"),
            ("screensaver", "non-compliant"),
            ("ssh-hardening", "not-applicable"),
            ("sysctl", "not-applicable"),
        ])
    );

    let fixed = engine.fix_all(&host.policies, false);
    assert!(fixed.is_compliant(), "{fixed}");
    assert_eq!(
        defaults.get("/Library/Preferences/com.apple.loginwindow", "GuestEnabled"),
        Some("0".to_string())
    );
    assert_eq!(defaults.get("com.apple.screensaver", "idleTime"), Some("600".to_string()));

    let screensaver_write = defaults
        .commands()
        .into_iter()
        .find(|argv| argv.iter().any(|a| a == "write") && argv.iter().any(|a| a == "idleTime"))
        .unwrap();
    assert_eq!(screensaver_write[1], "-currentHost");

    for record in fixed.changes() {
        let Change::Command(change) = &record.change else {
            panic!("expected only preference changes");
        };
        assert!(defaults.exec(&change.undo).unwrap().success());
    }
    assert_eq!(
        defaults.get("/Library/Preferences/com.apple.loginwindow", "GuestEnabled"),
        Some("1".to_string())
    );
    assert_eq!(defaults.get("com.apple.screensaver", "idleTime"), Some("1200".to_string()));
}

#[test]
fn root_engine_skips_non_root_policies() {
    let host = Host::new();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(EngineConfig::default(), macos().with_root(true), &defaults);

    let report = engine.check_all(&host.policies);
    let screensaver = report
        .outcomes
        .iter()
        .find(|o| o.policy == "screensaver")
        .unwrap();
    assert_eq!(screensaver.status, Status::NotApplicable);
    assert_eq!(screensaver.note.as_deref(), Some("policy does not run as root"));
}

#[test]
fn json_report_round_trips_through_serde() {
    let host = Host::new();
    let defaults = FakeDefaults::new();
    let engine = Engine::new(EngineConfig::default(), rhel(), &defaults);

    let report = engine.check_all(&host.policies);
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["summary"]["non-compliant"], 4);
    assert_eq!(json["summary"]["not-applicable"], 2);
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 6);
}
