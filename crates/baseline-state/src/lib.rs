//! Versioned file-state snapshots.
//!
//! A snapshot tree ships known-good copies of files laid out as
//! `<prefix>/<version>/<state>/<absolute path of the live file>`. The
//! [`FileStateManager`] answers which snapshot a live file currently matches
//! and can copy a snapshot's files over the live ones.

pub mod diff;
pub mod error;
pub mod key;
pub mod manager;
pub mod sort;

pub use diff::{DiffMode, DiffResult};
pub use error::{Error, Result};
pub use key::SnapshotKey;
pub use manager::{FileStateManager, FileStateMatch, StateChange, default_backup_root};
pub use sort::quicksort_versions;
