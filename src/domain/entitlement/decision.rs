//! Result of a policy check.

use serde::{Deserialize, Serialize};

use super::{Action, EntitlementError, Tier};

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Ok,
    LimitReached,
    FeatureNotInTier,
}

/// Outcome of evaluating one action against a tier and usage.
///
/// Local denials and denials issued by the account service share this shape,
/// so callers handle both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
    /// Lowest tier that would satisfy the request; `None` when already
    /// satisfied or when no tier would.
    pub required_tier: Option<Tier>,
}

impl EntitlementDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Ok,
            required_tier: None,
        }
    }

    pub fn limit_reached(required_tier: Option<Tier>) -> Self {
        Self {
            allowed: false,
            reason: DecisionReason::LimitReached,
            required_tier,
        }
    }

    pub fn feature_not_in_tier(required_tier: Option<Tier>) -> Self {
        Self {
            allowed: false,
            reason: DecisionReason::FeatureNotInTier,
            required_tier,
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }

    /// Converts the decision to a Result, with a denial becoming an error.
    pub fn into_result(self, action: Action) -> Result<(), EntitlementError> {
        if self.allowed {
            return Ok(());
        }

        let feature = action.feature_name().to_string();
        let required_tier = self.required_tier;
        match self.reason {
            DecisionReason::LimitReached => Err(EntitlementError::LimitReached {
                feature,
                required_tier,
            }),
            DecisionReason::FeatureNotInTier | DecisionReason::Ok => {
                Err(EntitlementError::FeatureNotInTier {
                    feature,
                    required_tier,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::FeatureFlag;

    #[test]
    fn allow_has_no_required_tier() {
        let decision = EntitlementDecision::allow();
        assert!(decision.allowed);
        assert_eq!(decision.reason, DecisionReason::Ok);
        assert_eq!(decision.required_tier, None);
    }

    #[test]
    fn allowed_decision_into_result_is_ok() {
        assert!(EntitlementDecision::allow()
            .into_result(Action::ConnectDevice)
            .is_ok());
    }

    #[test]
    fn limit_denial_into_result_keeps_required_tier() {
        let err = EntitlementDecision::limit_reached(Some(Tier::Connect))
            .into_result(Action::ConnectDevice)
            .unwrap_err();
        assert_eq!(
            err,
            EntitlementError::LimitReached {
                feature: "connect_device".to_string(),
                required_tier: Some(Tier::Connect),
            }
        );
    }

    #[test]
    fn feature_denial_into_result_names_flag() {
        let err = EntitlementDecision::feature_not_in_tier(Some(Tier::Baseline))
            .into_result(Action::RequireFeature(FeatureFlag::ExpertConsult))
            .unwrap_err();
        assert!(matches!(
            err,
            EntitlementError::FeatureNotInTier { ref feature, required_tier: Some(Tier::Baseline) }
                if feature == "expert_consult"
        ));
    }

    #[test]
    fn decision_serializes_snake_case_reason() {
        let json = serde_json::to_string(&EntitlementDecision::limit_reached(Some(Tier::Connect))).unwrap();
        assert!(json.contains("\"reason\":\"limit_reached\""));
        assert!(json.contains("\"required_tier\":\"connect\""));
    }
}
