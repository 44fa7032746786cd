//! Check and fix policies against one host.

use std::path::Path;

use baseline_applicability::{Applicability, HostFacts, Resolver};
use baseline_content::{
    ConfigReconciler, FlatDialect, ReconcileResult, Separator, SpaceDialect, TaggedDialect,
};
use baseline_prefs::{CurrentValue, Exec, PreferenceSpec, PreferenceStore};
use baseline_state::{FileStateManager, SnapshotKey, default_backup_root};

use crate::change::{Change, ChangeRecord};
use crate::config::EngineConfig;
use crate::policy::{Check, ConfCheck, DefaultsCheck, FileStateCheck, Policy, TaggedCheck};
use crate::report::{CheckOutcome, ComplianceReport, PolicyOutcome, Status};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix { dry_run: bool },
}

/// Evaluates policies for one host.
///
/// Policies run one after another; nothing here locks target files, so two
/// engines must not work on the same files at once.
pub struct Engine<E: Exec> {
    config: EngineConfig,
    facts: HostFacts,
    exec: E,
    resolver: Resolver,
}

impl<E: Exec> Engine<E> {
    pub fn new(config: EngineConfig, facts: HostFacts, exec: E) -> Self {
        Self {
            config,
            facts,
            exec,
            resolver: Resolver::new(),
        }
    }

    pub fn facts(&self) -> &HostFacts {
        &self.facts
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `policy` runs on this host. A policy without a descriptor
    /// applies everywhere.
    pub fn applicability(&self, policy: &Policy) -> Applicability {
        match &policy.applicability {
            Some(raw) => self.resolver.evaluate(raw, &self.facts),
            None => Applicability::Applies,
        }
    }

    pub fn check(&self, policy: &Policy) -> PolicyOutcome {
        self.run(policy, Mode::Check)
    }

    /// Remediate drift. With `dry_run` nothing is written; the outcome lists
    /// what would change.
    pub fn fix(&self, policy: &Policy, dry_run: bool) -> PolicyOutcome {
        self.run(policy, Mode::Fix { dry_run })
    }

    pub fn check_all<'a>(&self, policies: impl IntoIterator<Item = &'a Policy>) -> ComplianceReport {
        let mut report = ComplianceReport::new(self.facts.clone());
        for policy in policies {
            report.push(self.check(policy));
        }
        report
    }

    pub fn fix_all<'a>(
        &self,
        policies: impl IntoIterator<Item = &'a Policy>,
        dry_run: bool,
    ) -> ComplianceReport {
        let mut report = ComplianceReport::new(self.facts.clone());
        for policy in policies {
            report.push(self.fix(policy, dry_run));
        }
        report
    }

    fn run(&self, policy: &Policy, mode: Mode) -> PolicyOutcome {
        match self.applicability(policy) {
            Applicability::Applies => {}
            Applicability::NotApplicable(exclusion) => {
                tracing::debug!(policy = %policy.name, reason = %exclusion, "policy does not apply");
                return PolicyOutcome::new(&policy.name, Status::NotApplicable)
                    .with_note(exclusion.to_string());
            }
            Applicability::Invalid(reason) => {
                return PolicyOutcome::new(&policy.name, Status::Invalid(reason));
            }
        }

        if policy.checks.is_empty() {
            return PolicyOutcome::new(&policy.name, Status::Invalid("policy has no checks".into()));
        }

        let mut outcome = PolicyOutcome::new(&policy.name, Status::Compliant);
        for check in &policy.checks {
            let mut changes = Vec::new();
            let result = match check {
                Check::Conf(c) => self.conf(c, mode, &mut changes),
                Check::Tagged(c) => self.tagged(c, mode, &mut changes),
                Check::Defaults(c) => self.defaults(c, mode, &mut changes),
                Check::FileState(c) => self.file_state(c, mode, &mut changes),
            };

            let checked = result.unwrap_or_else(|e| {
                tracing::warn!(policy = %policy.name, check = check.kind(), error = %e, "check did not complete");
                let status = if e.is_invalid_input() {
                    Status::Invalid(e.to_string())
                } else {
                    Status::Failed(e.to_string())
                };
                CheckOutcome::new(check.kind(), check.target(), status)
            });
            outcome.push(checked);
            outcome
                .changes
                .extend(changes.into_iter().map(|c| ChangeRecord::new(&policy.name, c)));
        }

        tracing::info!(policy = %policy.name, status = %outcome.status, "policy evaluated");
        outcome
    }

    fn ensure_sane(path: &Path) -> Result<()> {
        if baseline_fs::is_sane_path(path) {
            Ok(())
        } else {
            Err(baseline_fs::Error::UnsafePath {
                path: path.to_path_buf(),
            }
            .into())
        }
    }

    fn conf(&self, check: &ConfCheck, mode: Mode, changes: &mut Vec<Change>) -> Result<CheckOutcome> {
        Self::ensure_sane(&check.path)?;
        let target = check.path.display().to_string();

        let mut reconciler = ConfigReconciler::open(&check.path, SpaceDialect::new())?;
        let syntax = match check.syntax {
            Some(syntax) => syntax,
            None => Separator::detect(reconciler.document()).ok_or_else(|| {
                baseline_content::Error::UnknownSyntax {
                    path: check.path.clone(),
                }
            })?,
        };
        match syntax {
            Separator::Space => {}
            Separator::OpenEq => reconciler.set_dialect(FlatDialect::open()),
            Separator::ClosedEq => reconciler.set_dialect(FlatDialect::closed()),
        }

        let result = reconciler.reconcile(&check.values, check.intent)?;
        let details = drift_details(&result, None);
        self.finish_file(reconciler, result.compliant, details, mode, changes, "conf", target)
    }

    fn tagged(&self, check: &TaggedCheck, mode: Mode, changes: &mut Vec<Change>) -> Result<CheckOutcome> {
        Self::ensure_sane(&check.path)?;
        let target = check.path.display().to_string();

        let mut reconciler = ConfigReconciler::open(&check.path, SpaceDialect::new())?;
        let syntax = check
            .syntax
            .or_else(|| Separator::detect(reconciler.document()))
            .unwrap_or(Separator::OpenEq);

        let mut compliant = true;
        let mut details = Vec::new();
        for section in &check.sections {
            reconciler.set_dialect(TaggedDialect::new(&section.tag, syntax));
            let result = reconciler.reconcile(&section.values, section.intent)?;
            compliant &= result.compliant;
            details.extend(drift_details(&result, Some(&section.tag)));
        }

        self.finish_file(reconciler, compliant, details, mode, changes, "tagged", target)
    }

    /// Report or commit the working document of a file check.
    #[allow(clippy::too_many_arguments)]
    fn finish_file(
        &self,
        reconciler: ConfigReconciler,
        compliant: bool,
        mut details: Vec<String>,
        mode: Mode,
        changes: &mut Vec<Change>,
        kind: &str,
        target: String,
    ) -> Result<CheckOutcome> {
        if compliant {
            return Ok(CheckOutcome::new(kind, target, Status::Compliant));
        }

        let status = match mode {
            Mode::Check => Status::NonCompliant,
            Mode::Fix { dry_run: true } => {
                let pending = reconciler.pending_change(reconciler.path());
                details.push(pending.unified_diff());
                Status::NonCompliant
            }
            Mode::Fix { dry_run: false } => {
                changes.push(self.commit(&reconciler)?);
                details.insert(0, "fixed".to_string());
                Status::Compliant
            }
        };
        Ok(CheckOutcome::new(kind, target, status).with_details(details))
    }

    /// Write the working document through a temp file and rename it over
    /// the target.
    fn commit(&self, reconciler: &ConfigReconciler) -> Result<Change> {
        let path = reconciler.path();
        let temp = baseline_fs::temp_path_for(path, &self.config.paths.temp_suffix);
        let written = reconciler.commit(&temp)?;

        if let Err(e) = baseline_fs::replace(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }

        Ok(Change::File {
            path: path.to_path_buf(),
            existed: written.existed,
            diff: written.unified_diff(),
            before: written.before,
            after: written.after,
        })
    }

    fn defaults(&self, check: &DefaultsCheck, mode: Mode, changes: &mut Vec<Change>) -> Result<CheckOutcome> {
        let target = format!("{} {}", check.domain, check.key);
        let spec = match (&check.write, &check.pattern) {
            (None, _) => PreferenceSpec::absent(),
            (Some(write), Some(pattern)) => PreferenceSpec::new(pattern, Some(write))?,
            (Some(_), None) => {
                return Err(Error::InvalidCheck {
                    reason: format!("{target}: `write` needs a `match` pattern"),
                });
            }
        };

        let mut store = PreferenceStore::new(&self.exec, &check.domain)
            .with_current_host(check.current_host)
            .with_stderr_policy(self.config.exec.stderr);
        if let Some(program) = &check.program {
            store = store.with_program(program);
        }

        let validation = store.validate(&check.key, &spec)?;
        let current = match &validation.current {
            CurrentValue::Missing => "current: not set".to_string(),
            CurrentValue::Value(v) => format!("current: {v}"),
        };
        if validation.compliant {
            return Ok(CheckOutcome::new("defaults", target, Status::Compliant).with_details(vec![current]));
        }

        let wanted = match &spec.write {
            Some(_) => format!("wanted: {}", spec.pattern()),
            None => "wanted: not set".to_string(),
        };
        let mut details = vec![current, wanted];

        let status = match mode {
            Mode::Check => Status::NonCompliant,
            Mode::Fix { dry_run: true } => {
                let argv = store.build_write_command(&check.key, &spec)?;
                details.push(format!("would run: {}", argv.join(" ")));
                Status::NonCompliant
            }
            Mode::Fix { dry_run: false } => {
                if let Some(change) = store.apply(&check.key, &spec)? {
                    details.insert(0, "fixed".to_string());
                    changes.push(Change::Command(change));
                }
                Status::Compliant
            }
        };
        Ok(CheckOutcome::new("defaults", target, status).with_details(details))
    }

    fn state_manager(&self, check: &FileStateCheck) -> FileStateManager {
        let version = check
            .version
            .clone()
            .unwrap_or_else(|| self.facts.os_version.to_string());
        let mut manager = FileStateManager::new(&check.prefix, version)
            .with_mode(check.mode.unwrap_or(self.config.state.mode));

        let backup_root = self
            .config
            .state
            .backup_root
            .clone()
            .or_else(|| default_backup_root(self.facts.is_root));
        if let Some(root) = backup_root {
            manager = manager.with_backup_root(root);
        }
        manager
    }

    /// Snapshot to promote: the current version's, else the newest.
    fn promotion_key(manager: &FileStateManager, state: &str) -> Result<SnapshotKey> {
        let current = manager.key(state);
        if current.root().is_dir() {
            return Ok(current);
        }
        manager
            .search_list(&[state], None)?
            .pop()
            .ok_or_else(|| Error::NoSnapshot {
                state: state.to_string(),
                prefix: manager.prefix().to_path_buf(),
            })
    }

    fn file_state(&self, check: &FileStateCheck, mode: Mode, changes: &mut Vec<Change>) -> Result<CheckOutcome> {
        let target = format!("{} ({})", check.prefix.display(), check.state);
        let manager = self.state_manager(check);
        let key = Self::promotion_key(&manager, &check.state)?;

        let files = if check.files.is_empty() {
            manager
                .latest_file_set(&check.state)?
                .map(|(_, files)| files)
                .unwrap_or_default()
        } else {
            check.files.clone()
        };

        if let Some(matched) = manager.are_files_in_states(&[&check.state], &files)? {
            return Ok(CheckOutcome::new("file-state", target, Status::Compliant)
                .with_details(vec![format!("matches snapshot {matched}")]));
        }

        let mut details = Vec::new();
        for file in &files {
            let found = manager.is_file_in_known_state(&check.state, file)?;
            match found.snapshot {
                Some(snapshot) => details.push(format!("{}: matches {snapshot}", file.display())),
                None => details.push(format!("{}: in no known state", file.display())),
            }
            if let Some(diff) = manager.compare(&key, file)? {
                if !diff.text.is_empty() {
                    details.push(diff.text);
                }
            }
        }

        let status = match mode {
            Mode::Check => Status::NonCompliant,
            Mode::Fix { dry_run: true } => {
                details.push(format!("would copy snapshot {key}"));
                Status::NonCompliant
            }
            Mode::Fix { dry_run: false } => {
                manager.ensure_snapshot_covers(&key, &files)?;

                // Files already overwritten are recorded even when a later one fails.
                let mut promoted = Vec::new();
                let mut failure = None;
                for file in &files {
                    match manager.change_file_state(&key, file) {
                        Ok(change) => promoted.push(change),
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                if failure.is_none() || promoted.iter().any(|c| c.copied) {
                    changes.push(Change::Snapshot {
                        snapshot: key.clone(),
                        files: promoted,
                    });
                }
                if let Some(e) = failure {
                    return Err(e.into());
                }
                details.insert(0, format!("copied snapshot {key}"));
                Status::Compliant
            }
        };
        Ok(CheckOutcome::new("file-state", target, status).with_details(details))
    }
}

fn drift_details(result: &ReconcileResult, section: Option<&str>) -> Vec<String> {
    let scope = section.map(|s| format!("[{s}] ")).unwrap_or_default();
    let fixables = result
        .fixables
        .iter()
        .map(|(key, value)| format!("{scope}{key}: expected {value}"));
    let removeables = result
        .removeables
        .iter()
        .map(|(key, value)| format!("{scope}{key}: unwanted {value}"));
    fixables.chain(removeables).collect()
}
