//! End-to-end: a free account hits the wearable limit, upgrades, retries.

use std::sync::Arc;

use baseline_entitlements::adapters::{ChannelUpgradeFlow, InMemoryAccountDataSource};
use baseline_entitlements::application::{EntitlementSession, MutationResult};
use baseline_entitlements::domain::entitlement::{
    Action, DecisionReason, DeviceKind, EntitlementDecision, FeatureFlag, Tier, UpgradeStatus,
};
use baseline_entitlements::domain::foundation::AccountId;

fn account_id() -> AccountId {
    AccountId::new("acct-scenario").unwrap()
}

#[tokio::test]
async fn free_account_upgrades_to_connect_and_retries() {
    let source = Arc::new(
        InMemoryAccountDataSource::new()
            .with_account(account_id(), Tier::Free)
            .with_devices(&account_id(), [DeviceKind::AppleHealth]),
    );
    let (flow, mut triggers) = ChannelUpgradeFlow::new();
    let session = EntitlementSession::open(account_id(), source.clone(), Arc::new(flow));
    session.initial_load().await.unwrap();

    // Second wearable is denied with connect as the way out.
    let decision = session.check(Action::ConnectDevice).unwrap();
    assert_eq!(decision, EntitlementDecision::limit_reached(Some(Tier::Connect)));

    let denied = session.connect_device(DeviceKind::Oura).await.unwrap();
    assert!(matches!(
        denied.outcome,
        MutationResult::Denied(EntitlementDecision {
            reason: DecisionReason::LimitReached,
            ..
        })
    ));

    let trigger = triggers.recv().await.unwrap();
    assert_eq!(trigger.feature_name, "connect_device");
    assert_eq!(trigger.required_tier, Tier::Connect);
    assert_eq!(trigger.current_tier, Tier::Free);

    // The user proceeds with the upgrade.
    let handle = session.request_upgrade(trigger.required_tier).unwrap();
    let transaction = handle.wait().await;
    assert_eq!(transaction.status, UpgradeStatus::Confirmed);
    assert_eq!(handle.status(), UpgradeStatus::Confirmed);

    assert_eq!(session.current_tier().unwrap(), Tier::Connect);
    assert_eq!(session.current_usage().unwrap().connected_device_count, 1);
    assert!(session
        .check(Action::RequireFeature(FeatureFlag::PdfUpload))
        .unwrap()
        .allowed);

    // Retried connect now goes through.
    assert!(session.check(Action::ConnectDevice).unwrap().allowed);
    let retried = session.connect_device(DeviceKind::Oura).await.unwrap();
    assert_eq!(retried.outcome, MutationResult::Applied);
    assert_eq!(session.current_usage().unwrap().connected_device_count, 2);
    assert_eq!(source.devices_of(&account_id()).len(), 2);
}

#[tokio::test]
async fn second_upgrade_while_pending_is_rejected() {
    let source = Arc::new(InMemoryAccountDataSource::new().with_account(account_id(), Tier::Free));
    let (flow, _triggers) = ChannelUpgradeFlow::new();
    let session = EntitlementSession::open(account_id(), source, Arc::new(flow));
    session.initial_load().await.unwrap();

    let first = session.request_upgrade(Tier::Connect).unwrap();
    // The background task has not run yet on this single-threaded runtime.
    let err = session.request_upgrade(Tier::Baseline).unwrap_err();
    assert_eq!(err.code().to_string(), "TRANSACTION_IN_PROGRESS");

    first.wait().await;
    assert!(session.pending_upgrade().is_none());
    let next = session.upgrade(Tier::Baseline).await.unwrap();
    assert_eq!(next.status, UpgradeStatus::Confirmed);
    assert_eq!(session.summary().unwrap().available_upgrades, Vec::<Tier>::new());
}

#[tokio::test]
async fn declined_upgrade_changes_nothing() {
    let source = Arc::new(InMemoryAccountDataSource::new().with_account(account_id(), Tier::Free));
    source.set_decline_upgrades(Some("card declined".to_string()));
    let (flow, _triggers) = ChannelUpgradeFlow::new();
    let session = EntitlementSession::open(account_id(), source.clone(), Arc::new(flow));
    session.initial_load().await.unwrap();

    let transaction = session.upgrade(Tier::Connect).await.unwrap();

    assert_eq!(transaction.status, UpgradeStatus::Failed);
    assert_eq!(session.current_tier().unwrap(), Tier::Free);
    assert_eq!(source.tier_of(&account_id()), Some(Tier::Free));
    assert!(session.pending_upgrade().is_none());
}
