//! Upgrade transaction value object.
//!
//! Lives from the moment a user starts an upgrade until the payment authority
//! reports back and the result has been applied or reported.

use serde::{Deserialize, Serialize};

use super::{EntitlementError, Tier};
use crate::domain::foundation::{StateMachine, Timestamp, TransactionId};

/// Lifecycle status of an upgrade transaction.
///
/// `Pending -> Confirmed` or `Pending -> Failed`; both are terminal and are
/// never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStatus {
    Pending,
    Confirmed,
    Failed,
}

impl StateMachine for UpgradeStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use UpgradeStatus::*;
        matches!((self, target), (Pending, Confirmed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use UpgradeStatus::*;
        match self {
            Pending => vec![Confirmed, Failed],
            Confirmed | Failed => vec![],
        }
    }
}

/// Why an upgrade did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpgradeFailure {
    /// The payment authority refused the upgrade.
    Declined { reason: String },
    /// The account had already reached or passed the target tier.
    StaleTransition { current: Tier },
    /// The authority could not be reached; nothing was applied.
    SyncFailure { reason: String },
    /// The session ended while the upgrade was pending.
    SessionEnded,
}

impl std::fmt::Display for UpgradeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpgradeFailure::Declined { reason } => write!(f, "declined: {}", reason),
            UpgradeFailure::StaleTransition { current } => {
                write!(f, "stale: account already on {}", current)
            }
            UpgradeFailure::SyncFailure { reason } => write!(f, "authority unreachable: {}", reason),
            UpgradeFailure::SessionEnded => write!(f, "session ended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTransaction {
    pub id: TransactionId,
    /// Tier the account was on when the transaction started.
    pub from_tier: Tier,
    pub target_tier: Tier,
    pub status: UpgradeStatus,
    pub failure: Option<UpgradeFailure>,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl UpgradeTransaction {
    /// Start a pending transaction.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless `target_tier` is strictly above `from_tier`.
    pub fn start(from_tier: Tier, target_tier: Tier) -> Result<Self, EntitlementError> {
        if target_tier <= from_tier {
            return Err(EntitlementError::InvalidTransition {
                from: from_tier,
                to: target_tier,
            });
        }

        Ok(Self {
            id: TransactionId::new(),
            from_tier,
            target_tier,
            status: UpgradeStatus::Pending,
            failure: None,
            created_at: Timestamp::now(),
            resolved_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == UpgradeStatus::Pending
    }

    pub fn confirm(&mut self) -> Result<(), EntitlementError> {
        self.transition_to(UpgradeStatus::Confirmed)
    }

    pub fn fail(&mut self, failure: UpgradeFailure) -> Result<(), EntitlementError> {
        self.transition_to(UpgradeStatus::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }

    fn transition_to(&mut self, target: UpgradeStatus) -> Result<(), EntitlementError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| EntitlementError::TransactionNotFound(self.id))?;
        self.resolved_at = Some(Timestamp::now());
        Ok(())
    }
}
