//! Wiring shared by the entitlement handler tests.

use std::sync::Arc;

use crate::adapters::{InMemoryAccountDataSource, RecordingUpgradeFlow};
use crate::application::entitlement_state::AccountEntitlementState;
use crate::application::entitlement_sync::EntitlementSync;
use crate::domain::entitlement::{DeviceKind, PolicyEngine, Tier};
use crate::domain::foundation::AccountId;

pub struct Harness {
    pub account_id: AccountId,
    pub source: Arc<InMemoryAccountDataSource>,
    pub flow: Arc<RecordingUpgradeFlow>,
    pub sync: Arc<EntitlementSync>,
}

pub fn account_id() -> AccountId {
    AccountId::new("acct-handler").unwrap()
}

/// A harness whose state has already been loaded from the source.
pub async fn loaded(tier: Tier, devices: &[DeviceKind]) -> Harness {
    let harness = unloaded(tier, devices);
    harness.sync.initial_load().await.unwrap();
    harness
}

pub fn unloaded(tier: Tier, devices: &[DeviceKind]) -> Harness {
    let account_id = account_id();
    let source = Arc::new(
        InMemoryAccountDataSource::new()
            .with_account(account_id.clone(), tier)
            .with_devices(&account_id, devices.iter().copied()),
    );
    let state = Arc::new(AccountEntitlementState::new(account_id.clone()));
    let sync = Arc::new(EntitlementSync::new(source.clone(), state, PolicyEngine::default()));

    Harness {
        account_id,
        source,
        flow: Arc::new(RecordingUpgradeFlow::new()),
        sync,
    }
}
