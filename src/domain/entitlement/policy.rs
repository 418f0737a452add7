//! Entitlement policy engine.
//!
//! A pure function of (tier, usage, action). It never touches the network or
//! session state, so the same inputs always give the same decision.
//!
//! Usage above the tier's ceiling (possible after an unmodelled downgrade or a
//! data inconsistency) still denies further additions; nothing already
//! connected is revoked here.

use super::{Action, EntitlementDecision, ResourceUsage, Tier, TierCatalog};

#[derive(Debug, Clone, Copy)]
pub struct PolicyEngine {
    catalog: &'static TierCatalog,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(TierCatalog::standard())
    }
}

impl PolicyEngine {
    pub fn new(catalog: &'static TierCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static TierCatalog {
        self.catalog
    }

    pub fn evaluate(&self, tier: Tier, usage: &ResourceUsage, action: Action) -> EntitlementDecision {
        let limits = self.catalog.limits_for(tier);
        match action {
            Action::ConnectDevice => {
                if limits.can_connect_device(usage.connected_device_count) {
                    EntitlementDecision::allow()
                } else {
                    EntitlementDecision::limit_reached(
                        self.catalog.lowest_tier_admitting(usage.connected_device_count),
                    )
                }
            }
            Action::RequireFeature(flag) => {
                if limits.includes(flag) {
                    EntitlementDecision::allow()
                } else {
                    EntitlementDecision::feature_not_in_tier(self.catalog.lowest_tier_with_feature(flag))
                }
            }
        }
    }
}

/// Evaluate against the built-in catalog.
pub fn evaluate(tier: Tier, usage: &ResourceUsage, action: Action) -> EntitlementDecision {
    PolicyEngine::default().evaluate(tier, usage, action)
}
