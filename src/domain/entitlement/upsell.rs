//! Upsell trigger payload.
//!
//! Built straight from a denied [`EntitlementDecision`]; the required tier is
//! copied, never recomputed, so the upsell always matches the policy engine.

use serde::{Deserialize, Serialize};

use super::{Action, DecisionReason, EntitlementDecision, Tier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellTrigger {
    /// Identifier of the denied action, e.g. `connect_device` or `pdf_upload`.
    pub feature_name: String,
    pub required_tier: Tier,
    pub reason: DecisionReason,
    pub current_tier: Tier,
    /// Plans worth presenting: the required tier and everything above it.
    pub offered_tiers: Vec<Tier>,
}

impl UpsellTrigger {
    /// Returns `None` for allowed decisions and for denials no tier can lift.
    pub fn from_decision(
        action: Action,
        decision: &EntitlementDecision,
        current_tier: Tier,
    ) -> Option<Self> {
        if decision.allowed {
            return None;
        }
        let required_tier = decision.required_tier?;

        Some(Self {
            feature_name: action.feature_name().to_string(),
            required_tier,
            reason: decision.reason,
            current_tier,
            offered_tiers: Tier::ALL
                .into_iter()
                .filter(|tier| *tier >= required_tier)
                .collect(),
        })
    }

    /// User-facing message for the upgrade prompt.
    pub fn user_message(&self) -> String {
        match self.reason {
            DecisionReason::LimitReached => format!(
                "Your {} plan has reached its limit for {}. Upgrade to {} for more.",
                self.current_tier.display_name(),
                self.feature_name,
                self.required_tier.display_name()
            ),
            _ => format!(
                "{} requires a {} membership or higher.",
                self.feature_name,
                self.required_tier.display_name()
            ),
        }
    }
}
