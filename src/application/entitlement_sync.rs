//! EntitlementSync - keeps [`AccountEntitlementState`] in line with the
//! account service.
//!
//! The account service is the authority. Local checks are only a pre-check;
//! every mutation goes to the service and is followed by a refresh, and the
//! service's forbidden responses are mapped onto [`EntitlementDecision`] so
//! callers handle local and remote denials the same way.
//!
//! Refreshes are serialized. A fetch that finishes late can never overwrite
//! the result of one that started after it, and a refresh dropped mid-fetch
//! leaves state untouched since the write happens after the fetch returns.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::entitlement_state::AccountEntitlementState;
use crate::domain::entitlement::{
    Action, EntitlementDecision, EntitlementError, EntitlementSnapshot, PolicyEngine, Tier,
};
use crate::ports::{AccountDataSource, ForbiddenReason, MutationOutcome, ResourceMutation};

/// What the account service did with a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationResult {
    Applied,
    /// Denied on entitlement grounds, by the local pre-check or the service.
    Denied(EntitlementDecision),
    /// Refused for a reason unrelated to tier.
    Rejected { message: String },
}

impl MutationResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationResult::Applied)
    }
}

pub struct EntitlementSync {
    source: Arc<dyn AccountDataSource>,
    state: Arc<AccountEntitlementState>,
    policy: PolicyEngine,
    refresh_lock: Mutex<()>,
}

impl EntitlementSync {
    pub fn new(
        source: Arc<dyn AccountDataSource>,
        state: Arc<AccountEntitlementState>,
        policy: PolicyEngine,
    ) -> Self {
        Self {
            source,
            state,
            policy,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &Arc<AccountEntitlementState> {
        &self.state
    }

    /// First fetch of the session. On failure state stays unknown and every
    /// check keeps failing closed until a later refresh succeeds.
    pub async fn initial_load(&self) -> Result<EntitlementSnapshot, EntitlementError> {
        let snapshot = self.refresh_after_mutation().await?;
        tracing::info!(
            account_id = %self.state.account_id(),
            tier = %snapshot.tier(),
            connected_devices = snapshot.usage.connected_device_count,
            "Entitlements loaded"
        );
        Ok(snapshot)
    }

    /// Re-fetch tier and usage and fold them into state.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` once the session is over
    /// - `SyncFailure` when the service is unreachable; state is untouched
    pub async fn refresh_after_mutation(&self) -> Result<EntitlementSnapshot, EntitlementError> {
        let _guard = self.refresh_lock.lock().await;
        if self.state.is_ended() {
            return Err(EntitlementError::SessionEnded);
        }

        let account_id = self.state.account_id();
        let record = self
            .source
            .get_account_and_usage(account_id)
            .await
            .map_err(|e| {
                tracing::warn!(account_id = %account_id, error = %e, "Entitlement refresh failed");
                EntitlementError::from(e)
            })?;

        let reconciled = self.state.reconcile(record)?;
        if let Some(server_tier) = reconciled.ignored_downgrade {
            tracing::warn!(
                account_id = %account_id,
                local_tier = %reconciled.snapshot.tier(),
                server_tier = %server_tier,
                "Account service reported a lower tier; keeping local tier"
            );
        }
        tracing::debug!(
            account_id = %account_id,
            tier = %reconciled.snapshot.tier(),
            connected_devices = reconciled.snapshot.usage.connected_device_count,
            "Entitlements refreshed"
        );
        Ok(reconciled.snapshot)
    }

    /// Send a mutation to the service, then refresh.
    ///
    /// The service's answer wins over the refresh: if the mutation was
    /// answered but the refresh failed, the answer is returned and state is
    /// left as it was.
    pub async fn attempt_mutation(
        &self,
        mutation: &ResourceMutation,
    ) -> Result<MutationResult, EntitlementError> {
        if self.state.is_ended() {
            return Err(EntitlementError::SessionEnded);
        }
        let account_id = self.state.account_id();

        let outcome = self
            .source
            .attempt_resource_mutation(account_id, mutation)
            .await;
        let refreshed = self.refresh_after_mutation().await;

        let outcome = outcome.map_err(|e| {
            tracing::warn!(
                account_id = %account_id,
                mutation = mutation.kind(),
                error = %e,
                "Resource mutation failed"
            );
            EntitlementError::from(e)
        })?;

        if let Err(e) = &refreshed {
            tracing::warn!(
                account_id = %account_id,
                mutation = mutation.kind(),
                error = %e,
                "Refresh after mutation failed; cached usage may be stale"
            );
        }

        let result = match outcome {
            MutationOutcome::Applied => MutationResult::Applied,
            MutationOutcome::Rejected { message } => MutationResult::Rejected { message },
            MutationOutcome::Forbidden {
                reason,
                required_tier,
                message,
            } => {
                let required_tier = required_tier.or_else(|| {
                    let snapshot = refreshed.ok().or_else(|| self.state.snapshot().ok())?;
                    self.derive_required_tier(mutation.gated_action()?, &snapshot)
                });
                let decision = match reason {
                    ForbiddenReason::LimitReached => EntitlementDecision::limit_reached(required_tier),
                    ForbiddenReason::FeatureNotInTier => {
                        EntitlementDecision::feature_not_in_tier(required_tier)
                    }
                };
                tracing::debug!(
                    account_id = %account_id,
                    mutation = mutation.kind(),
                    reason = ?decision.reason,
                    required_tier = ?decision.required_tier,
                    message = message.as_deref().unwrap_or(""),
                    "Account service denied mutation"
                );
                MutationResult::Denied(decision)
            }
        };

        Ok(result)
    }

    /// Lowest tier above the current one that would admit the action.
    fn derive_required_tier(&self, action: Action, snapshot: &EntitlementSnapshot) -> Option<Tier> {
        let catalog = self.policy.catalog();
        let candidate = match action {
            Action::ConnectDevice => {
                catalog.lowest_tier_admitting(snapshot.usage.connected_device_count)
            }
            Action::RequireFeature(flag) => catalog.lowest_tier_with_feature(flag),
        }?;
        if candidate > snapshot.tier() {
            Some(candidate)
        } else {
            snapshot.tier().upgrades().next()
        }
    }
}
