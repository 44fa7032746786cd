//! Compliance categories

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Sensitivity tier of a policy or a host.
///
/// Ordered `Low < Medium < High`. A host rated at some tier runs every policy
/// at or below that tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceCategory {
    #[default]
    Low,
    #[serde(alias = "med")]
    Medium,
    High,
}

impl ComplianceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ComplianceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "med" | "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::malformed(format!(
                "category must be low, medium or high, got {other:?}"
            ))),
        }
    }
}
