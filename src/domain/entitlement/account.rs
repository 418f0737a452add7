//! Account, usage and the consistent pair the policy engine reads.

use serde::{Deserialize, Serialize};

use super::Tier;
use crate::domain::foundation::{AccountId, Timestamp};

/// The authenticated account whose entitlements are being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub tier: Tier,
}

impl Account {
    pub fn new(id: AccountId, tier: Tier) -> Self {
        Self { id, tier }
    }
}

/// Counts of tier-limited resources, as confirmed by the account service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Active wearable connections.
    pub connected_device_count: u32,
}

impl ResourceUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(connected_device_count: u32) -> Self {
        Self {
            connected_device_count,
        }
    }
}

/// Account and usage read together, so a stale count is never evaluated
/// against a new tier or the other way round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub account: Account,
    pub usage: ResourceUsage,
    /// When the account service last confirmed this state.
    pub synced_at: Timestamp,
}

impl EntitlementSnapshot {
    pub fn new(account: Account, usage: ResourceUsage) -> Self {
        Self {
            account,
            usage,
            synced_at: Timestamp::now(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.account.tier
    }
}
