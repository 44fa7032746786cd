//! Applicability evaluation

use std::fmt;

use crate::{ApplicabilityDescriptor, ComplianceCategory, HostFacts, ListType};

/// Why a policy does not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Allow-list that nothing on this host matched.
    NotListed,
    /// Deny-list entry matched this host.
    Denied,
    /// Policy must not run as root, and the engine is root.
    RootExcluded,
    /// Policy tier is above the host's tier.
    Category {
        policy: ComplianceCategory,
        host: ComplianceCategory,
    },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotListed => f.write_str("host is not on the allow list"),
            Self::Denied => f.write_str("host is on the deny list"),
            Self::RootExcluded => f.write_str("policy does not run as root"),
            Self::Category { policy, host } => {
                write!(f, "policy category {policy} exceeds host category {host}")
            }
        }
    }
}

/// Outcome of evaluating a raw descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Applies,
    NotApplicable(Exclusion),
    /// The descriptor itself is malformed. Distinct from "not applicable" so
    /// callers can report it.
    Invalid(String),
}

impl Applicability {
    pub fn applies(&self) -> bool {
        matches!(self, Self::Applies)
    }
}

/// Decides whether a policy applies to a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// `true` when the descriptor applies to the host.
    pub fn applies(&self, descriptor: &ApplicabilityDescriptor, facts: &HostFacts) -> bool {
        self.explain(descriptor, facts).is_ok()
    }

    /// Structural validation of raw descriptor data.
    pub fn is_descriptor_valid(&self, raw: &toml::Value) -> bool {
        ApplicabilityDescriptor::from_value(raw).is_ok()
    }

    /// Validate and evaluate raw descriptor data. Never fails; a malformed
    /// descriptor yields [`Applicability::Invalid`].
    pub fn evaluate(&self, raw: &toml::Value, facts: &HostFacts) -> Applicability {
        match ApplicabilityDescriptor::from_value(raw) {
            Ok(descriptor) => match self.explain(&descriptor, facts) {
                Ok(()) => Applicability::Applies,
                Err(exclusion) => Applicability::NotApplicable(exclusion),
            },
            Err(e) => {
                tracing::warn!(error = %e, "invalid applicability descriptor");
                Applicability::Invalid(e.to_string())
            }
        }
    }

    /// Evaluate a parsed descriptor, returning the reason on exclusion.
    pub fn explain(
        &self,
        descriptor: &ApplicabilityDescriptor,
        facts: &HostFacts,
    ) -> Result<(), Exclusion> {
        let allow = descriptor.list_type == ListType::Allow;
        let mut applies = !allow;

        if descriptor.families.contains(&facts.family) {
            applies = allow;
        }

        // Every matching pattern may flip the result; the last one wins.
        for matcher in &descriptor.os_matchers {
            if matcher.pattern.is_match(&facts.os_type) && matcher.range.contains(&facts.os_version) {
                tracing::trace!(pattern = %matcher.pattern, range = %matcher.range, "os matcher fired");
                applies = allow;
            }
        }

        if !applies {
            return Err(if allow {
                Exclusion::NotListed
            } else {
                Exclusion::Denied
            });
        }

        if descriptor.requires_non_root && facts.is_root {
            return Err(Exclusion::RootExcluded);
        }

        if let Some(policy) = descriptor.category {
            if policy > facts.category {
                return Err(Exclusion::Category {
                    policy,
                    host: facts.category,
                });
            }
        }

        Ok(())
    }
}
