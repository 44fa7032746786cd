//! Compliance report types

use std::fmt;
use std::path::PathBuf;

use baseline_applicability::HostFacts;
use serde::Serialize;

use crate::change::ChangeRecord;
use crate::Result;

/// Outcome of a check or policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum Status {
    Compliant,
    NonCompliant,
    NotApplicable,
    /// The policy data is malformed.
    Invalid(String),
    /// Evaluation or remediation hit a host error.
    Failed(String),
}

impl Status {
    fn rank(&self) -> u8 {
        match self {
            Self::NotApplicable => 0,
            Self::Compliant => 1,
            Self::NonCompliant => 2,
            Self::Invalid(_) => 3,
            Self::Failed(_) => 4,
        }
    }

    /// The worse of two statuses:
    /// Failed > Invalid > NonCompliant > Compliant > NotApplicable
    pub fn merge(self, other: Status) -> Status {
        if other.rank() > self.rank() { other } else { self }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
            Self::NotApplicable => "not-applicable",
            Self::Invalid(_) => "invalid",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(reason) | Self::Failed(reason) => write!(f, "{}: {reason}", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub kind: String,
    pub target: String,
    #[serde(flatten)]
    pub status: Status,
    /// Human-readable findings, e.g. drifted keys or a diff.
    pub details: Vec<String>,
}

impl CheckOutcome {
    pub fn new(kind: impl Into<String>, target: impl Into<String>, status: Status) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            status,
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyOutcome {
    pub policy: String,
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub status: Status,
    /// Why the policy was skipped, when it was.
    pub note: Option<String>,
    pub checks: Vec<CheckOutcome>,
    pub changes: Vec<ChangeRecord>,
}

impl PolicyOutcome {
    pub fn new(policy: impl Into<String>, status: Status) -> Self {
        Self {
            policy: policy.into(),
            source: None,
            status,
            note: None,
            checks: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Add a check and fold its status into the policy's.
    pub fn push(&mut self, check: CheckOutcome) {
        self.status = std::mem::replace(&mut self.status, Status::NotApplicable)
            .merge(check.status.clone());
        self.checks.push(check);
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
    pub invalid: usize,
    pub failed: usize,
}

/// Outcomes of a run over several policies on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub facts: HostFacts,
    pub outcomes: Vec<PolicyOutcome>,
}

impl ComplianceReport {
    pub fn new(facts: HostFacts) -> Self {
        Self {
            facts,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: PolicyOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                Status::Compliant => summary.compliant += 1,
                Status::NonCompliant => summary.non_compliant += 1,
                Status::NotApplicable => summary.not_applicable += 1,
                Status::Invalid(_) => summary.invalid += 1,
                Status::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// True when no policy is non-compliant, invalid, or failed.
    pub fn is_compliant(&self) -> bool {
        let s = self.summary();
        s.non_compliant == 0 && s.invalid == 0 && s.failed == 0
    }

    pub fn changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.outcomes.iter().flat_map(|o| o.changes.iter())
    }

    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Json<'a> {
            summary: Summary,
            #[serde(flatten)]
            report: &'a ComplianceReport,
        }
        Ok(serde_json::to_string_pretty(&Json {
            summary: self.summary(),
            report: self,
        })?)
    }
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "[{}] {}", outcome.status, outcome.policy)?;
            if let Some(note) = &outcome.note {
                writeln!(f, "    {note}")?;
            }
            for check in &outcome.checks {
                writeln!(f, "  - {} {}: {}", check.kind, check.target, check.status)?;
                for detail in &check.details {
                    for line in detail.lines() {
                        writeln!(f, "      {line}")?;
                    }
                }
            }
        }
        let s = self.summary();
        write!(
            f,
            "{} compliant, {} non-compliant, {} not applicable, {} invalid, {} failed",
            s.compliant, s.non_compliant, s.not_applicable, s.invalid, s.failed
        )
    }
}
