//! Policy engine for baseline
//!
//! `baseline-core` sits above the single-purpose crates and turns declarative
//! policy manifests into checks and fixes:
//!
//! ```text
//!                  baseline-cli
//!                       |
//!                 baseline-core
//!                       |
//!     +-----------+-----+------+-----------+
//!     |           |            |           |
//! applicability content      prefs       state
//! ```
//!
//! - [`Policy`]: a TOML manifest with an applicability descriptor and checks
//! - [`Engine`]: evaluates and remediates policies against one host
//! - [`ComplianceReport`]: aggregated outcome, text or JSON
//! - [`ChangeRecord`]: what a fix changed, for the caller's undo ledger

pub mod change;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod policy;
pub mod report;

pub use change::{Change, ChangeRecord};
pub use config::{EngineConfig, ExecConfig, HostConfig, PathsConfig, StateConfig};
pub use engine::Engine;
pub use error::{Error, Result};
pub use host::{detect_facts, parse_os_release};
pub use policy::{Check, ConfCheck, DefaultsCheck, FileStateCheck, Policy, Section, TaggedCheck};
pub use report::{CheckOutcome, ComplianceReport, PolicyOutcome, Status, Summary};
