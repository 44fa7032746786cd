//! Preference-store reconciliation.
//!
//! Some settings live in an OS preference store rather than a text file and
//! are read and written through an external command (`defaults` on macOS).
//! This crate only builds argument vectors and interprets command output; the
//! process itself runs behind the [`Exec`] trait.

pub mod error;
pub mod exec;
pub mod plist;
pub mod store;
pub mod tokenize;

pub use error::{Error, Result};
pub use exec::{CommandOutput, Exec, StderrPolicy, SystemExec};
pub use store::{CurrentValue, PreferenceChange, PreferenceSpec, PreferenceStore, Validation};
pub use tokenize::tokenize;
