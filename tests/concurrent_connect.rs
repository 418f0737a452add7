//! Concurrent connects from several clients reconcile to the service's count.

use futures::future::join_all;
use std::sync::Arc;

use baseline_entitlements::adapters::{InMemoryAccountDataSource, RecordingUpgradeFlow};
use baseline_entitlements::application::{EntitlementSession, MutationResult};
use baseline_entitlements::domain::entitlement::{Action, DeviceKind, Tier};
use baseline_entitlements::domain::foundation::AccountId;

fn account_id() -> AccountId {
    AccountId::new("acct-race").unwrap()
}

async fn client(source: &Arc<InMemoryAccountDataSource>) -> (EntitlementSession, Arc<RecordingUpgradeFlow>) {
    let flow = Arc::new(RecordingUpgradeFlow::new());
    let session = EntitlementSession::open(account_id(), source.clone(), flow.clone());
    session.initial_load().await.unwrap();
    (session, flow)
}

#[tokio::test]
async fn two_clients_racing_on_free_admit_exactly_one() {
    let source = Arc::new(InMemoryAccountDataSource::new().with_account(account_id(), Tier::Free));
    let (phone, phone_flow) = client(&source).await;
    let (tablet, tablet_flow) = client(&source).await;

    // Both pre-checks pass on the stale count of zero.
    assert!(phone.check(Action::ConnectDevice).unwrap().allowed);
    assert!(tablet.check(Action::ConnectDevice).unwrap().allowed);

    let (a, b) = tokio::join!(
        phone.connect_device(DeviceKind::Oura),
        tablet.connect_device(DeviceKind::Garmin)
    );
    let outcomes = [a.unwrap().outcome, b.unwrap().outcome];

    let applied = outcomes.iter().filter(|o| o.is_applied()).count();
    let denied = outcomes
        .iter()
        .filter(|o| matches!(o, MutationResult::Denied(_)))
        .count();
    assert_eq!(applied, 1);
    assert_eq!(denied, 1);
    assert_eq!(phone_flow.count() + tablet_flow.count(), 1);

    assert_eq!(source.devices_of(&account_id()).len(), 1);
    assert_eq!(phone.current_usage().unwrap().connected_device_count, 1);
    assert_eq!(tablet.current_usage().unwrap().connected_device_count, 1);
}

#[tokio::test]
async fn same_device_from_two_clients_is_connected_once() {
    let source = Arc::new(InMemoryAccountDataSource::new().with_account(account_id(), Tier::Connect));
    let (phone, _) = client(&source).await;
    let (tablet, _) = client(&source).await;

    let (a, b) = tokio::join!(
        phone.connect_device(DeviceKind::Whoop),
        tablet.connect_device(DeviceKind::Whoop)
    );
    let outcomes = [a.unwrap().outcome, b.unwrap().outcome];

    assert_eq!(outcomes.iter().filter(|o| o.is_applied()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, MutationResult::Rejected { .. })));
    assert_eq!(source.devices_of(&account_id()), vec![DeviceKind::Whoop]);
}

#[tokio::test]
async fn parallel_connects_on_one_session_end_at_server_count() {
    let source = Arc::new(InMemoryAccountDataSource::new().with_account(account_id(), Tier::Baseline));
    let (session, _) = client(&source).await;

    let results = join_all(DeviceKind::ALL.iter().map(|d| session.connect_device(*d))).await;

    assert!(results.iter().all(|r| r.as_ref().unwrap().outcome.is_applied()));
    assert_eq!(
        session.current_usage().unwrap().connected_device_count,
        DeviceKind::ALL.len() as u32
    );
}
