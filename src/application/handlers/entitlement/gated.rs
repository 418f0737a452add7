//! Shared path for mutations behind an entitlement gate.

use crate::application::entitlement_sync::{EntitlementSync, MutationResult};
use crate::domain::entitlement::{Action, EntitlementError, PolicyEngine, UpsellTrigger};
use crate::ports::{ResourceMutation, UpgradeFlow};

pub(super) struct GatedOutcome {
    pub outcome: MutationResult,
    pub upsell: Option<UpsellTrigger>,
}

/// Local pre-check, then the authoritative mutation.
///
/// A denial from either side is handed to the upgrade flow. Before the
/// first sync this fails closed with `Unknown` and nothing is sent.
pub(super) async fn run_gated(
    sync: &EntitlementSync,
    policy: &PolicyEngine,
    upgrade_flow: &dyn UpgradeFlow,
    action: Action,
    mutation: &ResourceMutation,
) -> Result<GatedOutcome, EntitlementError> {
    let state = sync.state();
    let snapshot = state.snapshot()?;
    let decision = policy.evaluate(snapshot.tier(), &snapshot.usage, action);

    let outcome = if decision.is_denied() {
        tracing::debug!(
            account_id = %state.account_id(),
            action = action.feature_name(),
            reason = ?decision.reason,
            required_tier = ?decision.required_tier,
            "Entitlement pre-check denied"
        );
        MutationResult::Denied(decision)
    } else {
        sync.attempt_mutation(mutation).await?
    };

    let upsell = match &outcome {
        MutationResult::Denied(decision) => {
            let current_tier = state.snapshot().map(|s| s.tier()).unwrap_or(snapshot.tier());
            let trigger = UpsellTrigger::from_decision(action, decision, current_tier);
            if let Some(trigger) = &trigger {
                upgrade_flow.present(trigger.clone()).await;
            }
            trigger
        }
        _ => None,
    };

    Ok(GatedOutcome { outcome, upsell })
}
