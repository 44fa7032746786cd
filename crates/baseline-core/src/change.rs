//! Change records handed back to the caller after a fix.

use std::path::PathBuf;

use baseline_prefs::PreferenceChange;
use baseline_state::{SnapshotKey, StateChange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What one fix did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Change {
    /// A config file was rewritten.
    File {
        path: PathBuf,
        existed: bool,
        before: String,
        after: String,
        diff: String,
    },
    /// A preference was written; `undo` restores the previous value.
    Command(PreferenceChange),
    /// Snapshot copies were put in place.
    Snapshot {
        snapshot: SnapshotKey,
        files: Vec<StateChange>,
    },
}

/// One entry for an undo ledger. Recording it durably is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub policy: String,
    pub change: Change,
}

impl ChangeRecord {
    pub fn new(policy: impl Into<String>, change: Change) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            policy: policy.into(),
            change,
        }
    }
}
