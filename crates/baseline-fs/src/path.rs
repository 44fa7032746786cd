//! Path sanity checks for paths read from policy data.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static SANE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9/.][A-Za-z0-9/_.\-]*$").unwrap());

/// A path made only of alphanumerics, `/`, `_`, `.` and `-`, not starting
/// with `_` or `-`, and without `..` components.
pub fn is_sane_path(path: &Path) -> bool {
    let Some(text) = path.to_str() else {
        return false;
    };
    if !SANE_PATH.is_match(text) {
        return false;
    }
    !path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/etc/login.defs", true)]
    #[case("etc/ssh/sshd_config", true)]
    #[case("./relative-name_1.conf", true)]
    #[case("/etc/../root/.ssh", false)]
    #[case("-rf", false)]
    #[case("/etc/with space", false)]
    #[case("/etc/$(reboot)", false)]
    #[case("", false)]
    fn sanity(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_sane_path(Path::new(input)), expected);
    }
}
