//! Host fact detection

use std::path::Path;

use baseline_applicability::HostFacts;
use baseline_prefs::Exec;

use crate::config::HostConfig;

const UNKNOWN: &str = "unknown";

/// Kernel family of the build target, in the names policies use.
fn family() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// `NAME` and `VERSION_ID` from an os-release file.
pub fn parse_os_release(content: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut version = None;
    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        match key {
            "NAME" => name = Some(value),
            "VERSION_ID" => version = Some(value),
            _ => {}
        }
    }
    (name, version)
}

fn command_stdout<E: Exec>(exec: &E, argv: &[&str]) -> Option<String> {
    let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
    match exec.exec(&argv) {
        Ok(output) if output.success() => Some(output.stdout.trim().to_string()),
        Ok(output) => {
            tracing::warn!(?argv, status = ?output.status, "fact probe failed");
            None
        }
        Err(e) => {
            tracing::warn!(?argv, error = %e, "fact probe failed");
            None
        }
    }
}

fn os_identity<E: Exec>(exec: &E, os_release: &Path) -> (String, String) {
    if family() == "darwin" {
        let name = command_stdout(exec, &["sw_vers", "-productName"]);
        let version = command_stdout(exec, &["sw_vers", "-productVersion"]);
        return (
            name.unwrap_or_else(|| UNKNOWN.to_string()),
            version.unwrap_or_else(|| "0".to_string()),
        );
    }

    match baseline_fs::read_text_if_exists(os_release) {
        Ok(Some(content)) => {
            let (name, version) = parse_os_release(&content);
            (
                name.unwrap_or_else(|| UNKNOWN.to_string()),
                version.unwrap_or_else(|| "0".to_string()),
            )
        }
        Ok(None) => (UNKNOWN.to_string(), "0".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "cannot read os-release");
            (UNKNOWN.to_string(), "0".to_string())
        }
    }
}

/// Detect facts about the running host, then apply configured overrides.
///
/// Probes that fail leave a placeholder value and log a warning.
pub fn detect_facts<E: Exec>(exec: &E, os_release: &Path, overrides: &HostConfig) -> HostFacts {
    let (os_type, os_version) = os_identity(exec, os_release);
    let is_root = command_stdout(exec, &["id", "-u"]).is_some_and(|uid| uid == "0");

    let facts = HostFacts::new(family(), &os_type, &os_version).with_root(is_root);
    let facts = overrides.apply(facts);
    tracing::debug!(
        family = %facts.family,
        os_type = %facts.os_type,
        os_version = %facts.os_version,
        is_root = facts.is_root,
        category = %facts.category,
        "host facts"
    );
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use baseline_prefs::{CommandOutput, Result as ExecResult};
    use pretty_assertions::assert_eq;

    struct Uid(&'static str);

    impl Exec for Uid {
        fn exec(&self, argv: &[String]) -> ExecResult<CommandOutput> {
            let stdout = match argv.first().map(String::as_str) {
                Some("id") => self.0,
                Some("sw_vers") if argv[1] == "-productName" => "macOS",
                Some("sw_vers") => "14.4.1",
                _ => "",
            };
            Ok(CommandOutput {
                stdout: format!("{stdout}\n"),
                stderr: String::new(),
                status: Some(0),
            })
        }
    }

    #[test]
    fn parses_os_release() {
        let content = "NAME=\"Red Hat Enterprise Linux\"\nVERSION=\"9.3 (Plow)\"\nVERSION_ID=\"9.3\"\nID=rhel\n";
        assert_eq!(
            parse_os_release(content),
            (
                Some("Red Hat Enterprise Linux".to_string()),
                Some("9.3".to_string())
            )
        );
    }

    #[test]
    fn root_is_detected_from_uid() {
        let dir = tempfile::TempDir::new().unwrap();
        let facts = detect_facts(&Uid("0"), &dir.path().join("os-release"), &HostConfig::default());
        assert!(facts.is_root);
        let facts = detect_facts(&Uid("501"), &dir.path().join("os-release"), &HostConfig::default());
        assert!(!facts.is_root);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn reads_identity_from_os_release() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "NAME=\"Debian GNU/Linux\"\nVERSION_ID=\"12\"\n").unwrap();

        let facts = detect_facts(&Uid("1000"), &path, &HostConfig::default());
        assert_eq!(facts.family, "linux");
        assert_eq!(facts.os_type, "Debian GNU/Linux");
        assert_eq!(facts.os_version.as_str(), "12");
    }

    #[test]
    fn overrides_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let overrides = HostConfig {
            family: Some("solaris".into()),
            os_type: Some("Solaris".into()),
            os_version: Some("11.4".into()),
            root: Some(false),
            ..HostConfig::default()
        };
        let facts = detect_facts(&Uid("0"), &dir.path().join("os-release"), &overrides);
        assert_eq!(facts.family, "solaris");
        assert_eq!(facts.os_version.as_str(), "11.4");
        assert!(!facts.is_root);
    }
}
