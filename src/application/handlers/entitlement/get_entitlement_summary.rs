//! GetEntitlementSummaryHandler - Query handler for the profile screen.

use serde::Serialize;
use std::sync::Arc;

use crate::application::entitlement_state::AccountEntitlementState;
use crate::domain::entitlement::{ConnectionLimit, EntitlementError, FeatureFlag, PolicyEngine, Tier};
use crate::domain::foundation::{AccountId, Timestamp};

#[derive(Debug, Clone, Copy, Default)]
pub struct GetEntitlementSummaryQuery;

/// Everything the profile screen shows about a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementSummary {
    pub account_id: AccountId,
    pub tier: Tier,
    pub tier_name: &'static str,
    pub connected_device_count: u32,
    pub max_wearable_connections: ConnectionLimit,
    pub features: Vec<FeatureFlag>,
    /// Tiers the account could still move to.
    pub available_upgrades: Vec<Tier>,
    pub synced_at: Timestamp,
}

pub struct GetEntitlementSummaryHandler {
    state: Arc<AccountEntitlementState>,
    policy: PolicyEngine,
}

impl GetEntitlementSummaryHandler {
    pub fn new(state: Arc<AccountEntitlementState>, policy: PolicyEngine) -> Self {
        Self { state, policy }
    }

    pub fn handle(&self, _query: GetEntitlementSummaryQuery) -> Result<EntitlementSummary, EntitlementError> {
        let snapshot = self.state.snapshot()?;
        let tier = snapshot.tier();
        let limits = self.policy.catalog().limits_for(tier);

        Ok(EntitlementSummary {
            account_id: snapshot.account.id.clone(),
            tier,
            tier_name: tier.display_name(),
            connected_device_count: snapshot.usage.connected_device_count,
            max_wearable_connections: limits.max_wearable_connections,
            features: limits.feature_flags.iter().copied().collect(),
            available_upgrades: tier.upgrades().collect(),
            synced_at: snapshot.synced_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AccountRecord;

    fn handler(tier: Tier, devices: u32) -> GetEntitlementSummaryHandler {
        let state = Arc::new(AccountEntitlementState::new(AccountId::new("acct-sum").unwrap()));
        state
            .reconcile(AccountRecord {
                tier,
                connected_device_count: devices,
            })
            .unwrap();
        GetEntitlementSummaryHandler::new(state, PolicyEngine::default())
    }

    #[test]
    fn free_summary_lists_limit_and_upgrades() {
        let summary = handler(Tier::Free, 1).handle(GetEntitlementSummaryQuery).unwrap();

        assert_eq!(summary.tier_name, "Free");
        assert_eq!(summary.connected_device_count, 1);
        assert_eq!(summary.max_wearable_connections, ConnectionLimit::Bounded(1));
        assert!(summary.features.is_empty());
        assert_eq!(summary.available_upgrades, vec![Tier::Connect, Tier::Baseline]);
    }

    #[test]
    fn baseline_summary_has_every_feature() {
        let summary = handler(Tier::Baseline, 4).handle(GetEntitlementSummaryQuery).unwrap();

        assert_eq!(summary.max_wearable_connections, ConnectionLimit::Unbounded);
        assert_eq!(summary.features.len(), FeatureFlag::ALL.len());
        assert!(summary.available_upgrades.is_empty());
    }

    #[test]
    fn summary_serializes_for_display() {
        let summary = handler(Tier::Connect, 2).handle(GetEntitlementSummaryQuery).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["tier"], "connect");
        assert_eq!(json["connected_device_count"], 2);
        assert!(json["features"].as_array().unwrap().contains(&"pdf_upload".into()));
    }

    #[test]
    fn fails_closed_before_sync() {
        let state = Arc::new(AccountEntitlementState::new(AccountId::new("acct-sum").unwrap()));
        let handler = GetEntitlementSummaryHandler::new(state, PolicyEngine::default());
        assert_eq!(
            handler.handle(GetEntitlementSummaryQuery).unwrap_err(),
            EntitlementError::Unknown
        );
    }
}
