//! Entitlement error taxonomy.
//!
//! | Error | Kind |
//! |-------|------|
//! | Unknown | state not yet synced, fail closed |
//! | LimitReached / FeatureNotInTier | expected denial, routed to upsell |
//! | InvalidTransition / TransactionInProgress / TransactionNotFound | caller misuse |
//! | StaleTransition | confirmation raced with a newer tier |
//! | SessionEnded | session logged out mid-flight |
//! | SyncFailure | account service unreachable, cached state untouched |

use thiserror::Error;

use super::Tier;
use crate::domain::foundation::{ErrorCode, TransactionId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("Entitlements are not synced yet for this session")]
    Unknown,

    #[error("{feature} limit reached for the current tier")]
    LimitReached {
        feature: String,
        required_tier: Option<Tier>,
    },

    #[error("{feature} is not included in the current tier")]
    FeatureNotInTier {
        feature: String,
        required_tier: Option<Tier>,
    },

    #[error("Cannot move from {from} to {to}: tiers only increase")]
    InvalidTransition { from: Tier, to: Tier },

    #[error("Upgrade {0} is still pending")]
    TransactionInProgress(TransactionId),

    #[error("Upgrade {0} is not pending")]
    TransactionNotFound(TransactionId),

    #[error("Upgrade to {target} is stale: account is already on {current}")]
    StaleTransition { target: Tier, current: Tier },

    #[error("Entitlement session has ended")]
    SessionEnded,

    #[error("Account service unavailable: {0}")]
    SyncFailure(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EntitlementError {
    pub fn sync_failure(reason: impl Into<String>) -> Self {
        EntitlementError::SyncFailure(reason.into())
    }

    /// Stable code for the presentation layer.
    pub fn code(&self) -> ErrorCode {
        match self {
            EntitlementError::Unknown => ErrorCode::EntitlementUnknown,
            EntitlementError::LimitReached { .. } => ErrorCode::LimitReached,
            EntitlementError::FeatureNotInTier { .. } => ErrorCode::FeatureNotInTier,
            EntitlementError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            EntitlementError::TransactionInProgress(_) => ErrorCode::TransactionInProgress,
            EntitlementError::TransactionNotFound(_) => ErrorCode::TransactionNotFound,
            EntitlementError::StaleTransition { .. } => ErrorCode::StaleTransition,
            EntitlementError::SessionEnded => ErrorCode::SessionEnded,
            EntitlementError::SyncFailure(_) => ErrorCode::SyncFailure,
            EntitlementError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    /// True for expected policy denials that belong in the upsell flow.
    pub fn is_policy_denial(&self) -> bool {
        matches!(
            self,
            EntitlementError::LimitReached { .. } | EntitlementError::FeatureNotInTier { .. }
        )
    }

    /// Tier that would lift a policy denial.
    pub fn required_tier(&self) -> Option<Tier> {
        match self {
            EntitlementError::LimitReached { required_tier, .. }
            | EntitlementError::FeatureNotInTier { required_tier, .. } => *required_tier,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_denials_are_flagged() {
        let denial = EntitlementError::LimitReached {
            feature: "connect_device".to_string(),
            required_tier: Some(Tier::Connect),
        };
        assert!(denial.is_policy_denial());
        assert_eq!(denial.required_tier(), Some(Tier::Connect));
        assert!(!EntitlementError::Unknown.is_policy_denial());
    }

    #[test]
    fn codes_map_one_to_one() {
        assert_eq!(EntitlementError::Unknown.code(), ErrorCode::EntitlementUnknown);
        assert_eq!(
            EntitlementError::sync_failure("timeout").code(),
            ErrorCode::SyncFailure
        );
        assert_eq!(
            EntitlementError::TransactionInProgress(TransactionId::new()).code(),
            ErrorCode::TransactionInProgress
        );
    }

    #[test]
    fn invalid_transition_names_both_tiers() {
        let err = EntitlementError::InvalidTransition {
            from: Tier::Baseline,
            to: Tier::Connect,
        };
        let msg = err.to_string();
        assert!(msg.contains("Baseline"));
        assert!(msg.contains("Connect"));
    }

    #[test]
    fn validation_errors_convert() {
        let err: EntitlementError = ValidationError::empty_field("filename").into();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
