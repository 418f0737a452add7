//! Subscription tier definitions.
//!
//! Represents the subscription levels available in Baseline.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription tier.
///
/// Totally ordered by entitlement breadth, declaration order is the order:
/// `Free < Connect < Baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free tier - one wearable, core tracking only.
    Free,

    /// Connect tier.
    /// - Unlimited wearable connections
    /// - Blood test PDF upload
    /// - Advanced insights, priority support
    Connect,

    /// Baseline tier - everything in Connect plus:
    /// - Annual health baseline assessment
    /// - Personalized wellness plans
    /// - Direct expert consultations
    /// - Premium marketplace access
    Baseline,
}

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Connect, Tier::Baseline];

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Connect => "Connect",
            Tier::Baseline => "Baseline",
        }
    }

    /// Returns the wire identifier used by the account API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Connect => "connect",
            Tier::Baseline => "baseline",
        }
    }

    /// Returns the numeric rank of this tier, used to index the catalog.
    pub fn rank(&self) -> usize {
        match self {
            Tier::Free => 0,
            Tier::Connect => 1,
            Tier::Baseline => 2,
        }
    }

    /// Tiers strictly above this one, lowest first.
    pub fn upgrades(&self) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL.into_iter().filter(move |t| t > self)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Tier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "connect" => Ok(Tier::Connect),
            "baseline" => Ok(Tier::Baseline),
            other => Err(ValidationError::unknown_value("tier", other)),
        }
    }
}
