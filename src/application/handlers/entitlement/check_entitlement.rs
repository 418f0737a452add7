//! CheckEntitlementHandler - Query handler for gated actions.

use std::sync::Arc;

use crate::application::entitlement_state::AccountEntitlementState;
use crate::domain::entitlement::{
    Action, EntitlementDecision, EntitlementError, PolicyEngine, UpsellTrigger,
};

/// Query whether an action is currently permitted.
#[derive(Debug, Clone, Copy)]
pub struct CheckEntitlementQuery {
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct CheckEntitlementResult {
    pub decision: EntitlementDecision,
    /// Ready-made upsell for a denial. Not presented; that is up to the caller.
    pub upsell: Option<UpsellTrigger>,
}

/// Evaluates the cached snapshot against the tier catalog.
///
/// Called on every render of a gated control, so it never touches the
/// network. Fails closed with `Unknown` before the first sync.
pub struct CheckEntitlementHandler {
    state: Arc<AccountEntitlementState>,
    policy: PolicyEngine,
}

impl CheckEntitlementHandler {
    pub fn new(state: Arc<AccountEntitlementState>, policy: PolicyEngine) -> Self {
        Self { state, policy }
    }

    pub fn handle(&self, query: CheckEntitlementQuery) -> Result<CheckEntitlementResult, EntitlementError> {
        let snapshot = self.state.snapshot()?;
        let decision = self.policy.evaluate(snapshot.tier(), &snapshot.usage, query.action);
        let upsell = UpsellTrigger::from_decision(query.action, &decision, snapshot.tier());

        Ok(CheckEntitlementResult { decision, upsell })
    }
}
