//! Applicability resolution for baseline policies.
//!
//! A policy carries an [`ApplicabilityDescriptor`] describing the hosts it is
//! meant for. The [`Resolver`] compares it against [`HostFacts`] and decides
//! whether the policy runs at all.

pub mod category;
pub mod descriptor;
pub mod error;
pub mod facts;
pub mod range;
pub mod resolver;

pub use category::ComplianceCategory;
pub use descriptor::{ApplicabilityDescriptor, ListType, OsMatcher};
pub use error::{Error, Result};
pub use facts::HostFacts;
pub use range::VersionRange;
pub use resolver::{Applicability, Exclusion, Resolver};
