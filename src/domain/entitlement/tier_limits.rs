//! Tier-based entitlement limits.
//!
//! Defines what features and limits are available for each tier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{FeatureFlag, Tier, TierCatalog};

/// Ceiling on a count-limited resource.
///
/// Ordering treats `Unbounded` as greater than every bounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionLimit {
    Bounded(u32),
    Unbounded,
}

impl ConnectionLimit {
    /// Whether one more resource may be added on top of `current`.
    pub fn admits_another(&self, current: u32) -> bool {
        match self {
            ConnectionLimit::Bounded(max) => current < *max,
            ConnectionLimit::Unbounded => true,
        }
    }
}

impl std::fmt::Display for ConnectionLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionLimit::Bounded(max) => write!(f, "{}", max),
            ConnectionLimit::Unbounded => write!(f, "unlimited"),
        }
    }
}

/// Entitlements granted by one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// The tier these limits apply to.
    pub tier: Tier,
    /// Maximum simultaneously connected wearables.
    pub max_wearable_connections: ConnectionLimit,
    /// Capabilities granted at this tier.
    pub feature_flags: BTreeSet<FeatureFlag>,
}

impl TierLimits {
    pub fn new(
        tier: Tier,
        max_wearable_connections: ConnectionLimit,
        feature_flags: impl IntoIterator<Item = FeatureFlag>,
    ) -> Self {
        Self {
            tier,
            max_wearable_connections,
            feature_flags: feature_flags.into_iter().collect(),
        }
    }

    /// Get the limits for a tier from the built-in catalog.
    pub fn for_tier(tier: Tier) -> Self {
        TierCatalog::standard().limits_for(tier).clone()
    }

    /// Whether `flag` is granted at this tier.
    pub fn includes(&self, flag: FeatureFlag) -> bool {
        self.feature_flags.contains(&flag)
    }

    /// Whether a new device may be connected with `connected` already active.
    pub fn can_connect_device(&self, connected: u32) -> bool {
        self.max_wearable_connections.admits_another(connected)
    }

    /// True when these limits grant everything `lower` grants.
    pub fn covers(&self, lower: &TierLimits) -> bool {
        self.max_wearable_connections >= lower.max_wearable_connections
            && self.feature_flags.is_superset(&lower.feature_flags)
    }
}
