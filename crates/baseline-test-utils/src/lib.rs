//! Shared test utilities for the baseline workspace.
//!
//! Dev-dependency only.
//!
//! - [`defaults`]: [`FakeDefaults`], an in-memory preference store
//! - [`snapshots`]: [`SnapshotTree`] builder for snapshot directory layouts

pub mod defaults;
pub mod snapshots;

pub use defaults::FakeDefaults;
pub use snapshots::SnapshotTree;
