//! UpgradeCoordinator - the single path by which an account changes tier.
//!
//! ```text
//! start ──► pending ──► submit_upgrade ──► confirm ──► confirmed
//!                                    └───► fail ─────► failed
//! ```
//!
//! At most one transaction is pending per session. `confirm` applies the
//! tier under the pending lock, refreshes from the account service, then
//! marks the transaction confirmed. Once the tier has been applied the
//! transaction can only end confirmed: `fail`, `abandon` and a second
//! `confirm` are refused, and a dropped `confirm` future still confirms.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::entitlement_state::AccountEntitlementState;
use super::entitlement_sync::EntitlementSync;
use crate::domain::entitlement::{
    EntitlementError, Tier, UpgradeFailure, UpgradeStatus, UpgradeTransaction,
};
use crate::domain::foundation::TransactionId;
use crate::ports::{AccountDataSource, UpgradeOutcome};

/// Observer for one upgrade transaction.
#[derive(Debug, Clone)]
pub struct UpgradeHandle {
    id: TransactionId,
    target_tier: Tier,
    receiver: watch::Receiver<UpgradeTransaction>,
}

impl UpgradeHandle {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn target_tier(&self) -> Tier {
        self.target_tier
    }

    pub fn status(&self) -> UpgradeStatus {
        self.receiver.borrow().status
    }

    pub fn transaction(&self) -> UpgradeTransaction {
        self.receiver.borrow().clone()
    }

    /// Wait until the transaction leaves `pending`.
    ///
    /// Returns the last known state if the coordinator goes away first.
    pub async fn wait(&self) -> UpgradeTransaction {
        let mut receiver = self.receiver.clone();
        loop {
            {
                let current = receiver.borrow_and_update();
                if !current.is_pending() {
                    return current.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return receiver.borrow().clone();
            }
        }
    }
}

struct PendingUpgrade {
    transaction: UpgradeTransaction,
    notifier: watch::Sender<UpgradeTransaction>,
    /// Set once the target tier is applied. From then on only confirmation
    /// may resolve the transaction.
    applied: bool,
}

enum Resolution {
    Confirmed,
    Failed(UpgradeFailure),
}

pub struct UpgradeCoordinator {
    source: Arc<dyn AccountDataSource>,
    state: Arc<AccountEntitlementState>,
    sync: Arc<EntitlementSync>,
    pending: Mutex<Option<PendingUpgrade>>,
}

impl UpgradeCoordinator {
    pub fn new(
        source: Arc<dyn AccountDataSource>,
        state: Arc<AccountEntitlementState>,
        sync: Arc<EntitlementSync>,
    ) -> Self {
        Self {
            source,
            state,
            sync,
            pending: Mutex::new(None),
        }
    }

    /// The transaction currently pending, if any.
    pub fn pending(&self) -> Option<UpgradeTransaction> {
        self.pending
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.transaction.clone())
    }

    /// Open a pending transaction towards `target_tier`.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` / `Unknown` when there is no synced state
    /// - `TransactionInProgress` while another transaction is pending
    /// - `InvalidTransition` unless `target_tier` is above the current tier
    pub fn start(&self, target_tier: Tier) -> Result<UpgradeHandle, EntitlementError> {
        if self.state.is_ended() {
            return Err(EntitlementError::SessionEnded);
        }
        let current = self.state.snapshot()?.tier();

        let mut pending = self.pending.lock().unwrap();
        if let Some(existing) = pending.as_ref() {
            return Err(EntitlementError::TransactionInProgress(existing.transaction.id));
        }

        let transaction = UpgradeTransaction::start(current, target_tier)?;
        let (notifier, receiver) = watch::channel(transaction.clone());
        let handle = UpgradeHandle {
            id: transaction.id,
            target_tier,
            receiver,
        };

        tracing::info!(
            account_id = %self.state.account_id(),
            transaction_id = %transaction.id,
            from_tier = %current,
            target_tier = %target_tier,
            "Upgrade started"
        );
        *pending = Some(PendingUpgrade {
            transaction,
            notifier,
            applied: false,
        });
        Ok(handle)
    }

    /// Apply the target tier, refresh, and mark the transaction confirmed.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` unless `id` is the pending transaction
    /// - `TransactionInProgress` if another `confirm` already applied the tier
    /// - `StaleTransition` if the account is already at or above the target;
    ///   the transaction is marked failed
    /// - `SyncFailure` if the refresh failed; the transaction is still
    ///   confirmed and the caller may refresh again
    pub async fn confirm(&self, id: TransactionId) -> Result<UpgradeTransaction, EntitlementError> {
        let target_tier = self.apply_pending(id)?;

        let guard = ConfirmGuard {
            coordinator: self,
            id,
            armed: true,
        };
        let refreshed = self.sync.refresh_after_mutation().await;
        let transaction = guard.finish()?;

        tracing::info!(
            account_id = %self.state.account_id(),
            transaction_id = %id,
            tier = %target_tier,
            "Upgrade confirmed"
        );
        refreshed?;
        Ok(transaction)
    }

    /// Mark the pending transaction failed. State is not touched.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` unless `id` is the pending transaction
    /// - `TransactionInProgress` once its tier has been applied
    pub fn fail(
        &self,
        id: TransactionId,
        failure: UpgradeFailure,
    ) -> Result<UpgradeTransaction, EntitlementError> {
        let description = failure.to_string();
        let transaction = self.resolve(id, Resolution::Failed(failure))?;
        tracing::warn!(
            account_id = %self.state.account_id(),
            transaction_id = %id,
            failure = %description,
            "Upgrade failed"
        );
        Ok(transaction)
    }

    /// Start, ask the payment authority, then confirm or fail.
    ///
    /// Returns the resolved transaction. Outcomes of the upgrade itself
    /// (declined, stale, unreachable) are reported in the transaction; only
    /// failures to start are errors.
    pub async fn execute(&self, target_tier: Tier) -> Result<UpgradeTransaction, EntitlementError> {
        let handle = self.start(target_tier)?;
        Ok(self.drive(&handle).await)
    }

    /// Resolve a started transaction against the payment authority.
    pub async fn drive(&self, handle: &UpgradeHandle) -> UpgradeTransaction {
        let id = handle.id();
        let outcome = self
            .source
            .submit_upgrade(self.state.account_id(), handle.target_tier())
            .await;

        let resolved = match outcome {
            Ok(UpgradeOutcome::Succeeded) => self.confirm(id).await,
            Ok(UpgradeOutcome::Failed { reason }) => self.fail(id, UpgradeFailure::Declined { reason }),
            Err(e) => self.fail(
                id,
                UpgradeFailure::SyncFailure {
                    reason: e.to_string(),
                },
            ),
        };

        match resolved {
            Ok(transaction) => transaction,
            Err(e) => {
                tracing::debug!(transaction_id = %id, error = %e, "Upgrade resolved with error");
                handle.transaction()
            }
        }
    }

    /// Fail whatever is pending because the session is going away.
    ///
    /// A transaction whose tier is already applied is left to its `confirm`.
    pub fn abandon(&self) -> Option<UpgradeTransaction> {
        let id = self.pending()?.id;
        self.fail(id, UpgradeFailure::SessionEnded).ok()
    }

    /// Apply the pending transaction's tier and mark it applied, in one step
    /// under the pending lock.
    fn apply_pending(&self, id: TransactionId) -> Result<Tier, EntitlementError> {
        let mut slot = self.pending.lock().unwrap();
        let target_tier = match slot.as_ref() {
            Some(p) if p.transaction.id == id && p.applied => {
                return Err(EntitlementError::TransactionInProgress(id))
            }
            Some(p) if p.transaction.id == id => p.transaction.target_tier,
            _ => return Err(EntitlementError::TransactionNotFound(id)),
        };

        match self.state.apply_tier(target_tier) {
            Ok(_) => {
                if let Some(p) = slot.as_mut() {
                    p.applied = true;
                }
                Ok(target_tier)
            }
            Err(e) => {
                let failure = match &e {
                    EntitlementError::InvalidTransition { from, .. } => {
                        UpgradeFailure::StaleTransition { current: *from }
                    }
                    EntitlementError::SessionEnded => UpgradeFailure::SessionEnded,
                    other => UpgradeFailure::SyncFailure {
                        reason: other.to_string(),
                    },
                };
                tracing::warn!(
                    account_id = %self.state.account_id(),
                    transaction_id = %id,
                    failure = %failure,
                    "Upgrade could not be applied"
                );
                let error = match &failure {
                    UpgradeFailure::StaleTransition { current } => EntitlementError::StaleTransition {
                        target: target_tier,
                        current: *current,
                    },
                    _ => e,
                };
                if let Some(pending) = slot.take() {
                    settle(pending, Resolution::Failed(failure));
                }
                Err(error)
            }
        }
    }

    fn resolve(&self, id: TransactionId, resolution: Resolution) -> Result<UpgradeTransaction, EntitlementError> {
        let mut slot = self.pending.lock().unwrap();
        match slot.as_ref() {
            Some(p) if p.transaction.id == id => {
                if p.applied && matches!(resolution, Resolution::Failed(_)) {
                    return Err(EntitlementError::TransactionInProgress(id));
                }
            }
            _ => return Err(EntitlementError::TransactionNotFound(id)),
        }
        let pending = slot.take().ok_or(EntitlementError::TransactionNotFound(id))?;
        Ok(settle(pending, resolution))
    }
}

/// Move a taken transaction to its terminal status and notify its handles.
fn settle(pending: PendingUpgrade, resolution: Resolution) -> UpgradeTransaction {
    let PendingUpgrade {
        mut transaction,
        notifier,
        ..
    } = pending;

    let transitioned = match resolution {
        Resolution::Confirmed => transaction.confirm(),
        Resolution::Failed(failure) => transaction.fail(failure),
    };
    if let Err(e) = transitioned {
        tracing::warn!(transaction_id = %transaction.id, error = %e, "Upgrade transaction already resolved");
    }
    notifier.send_replace(transaction.clone());
    transaction
}

/// Confirms the transaction when dropped, so a cancelled `confirm` after the
/// tier was applied cannot leave it pending.
struct ConfirmGuard<'a> {
    coordinator: &'a UpgradeCoordinator,
    id: TransactionId,
    armed: bool,
}

impl ConfirmGuard<'_> {
    fn finish(mut self) -> Result<UpgradeTransaction, EntitlementError> {
        self.armed = false;
        self.coordinator.resolve(self.id, Resolution::Confirmed)
    }
}

impl Drop for ConfirmGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.coordinator.resolve(self.id, Resolution::Confirmed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::{Action, FeatureFlag, PolicyEngine};
    use crate::domain::foundation::AccountId;
    use crate::ports::{AccountRecord, DataSourceError, MutationOutcome, ResourceMutation};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementation
    // ════════════════════════════════════════════════════════════════════════════

    struct MockAuthority {
        record: StdMutex<Result<AccountRecord, DataSourceError>>,
        upgrade: StdMutex<Result<UpgradeOutcome, DataSourceError>>,
        /// When set, fetches wait for a notification before answering.
        gate: Option<Arc<Notify>>,
    }

    impl MockAuthority {
        fn new(tier: Tier, devices: u32) -> Self {
            Self {
                record: StdMutex::new(Ok(AccountRecord {
                    tier,
                    connected_device_count: devices,
                })),
                upgrade: StdMutex::new(Ok(UpgradeOutcome::Succeeded)),
                gate: None,
            }
        }

        fn declining(self, reason: &str) -> Self {
            *self.upgrade.lock().unwrap() = Ok(UpgradeOutcome::Failed {
                reason: reason.to_string(),
            });
            self
        }

        fn unreachable_upgrades(self) -> Self {
            *self.upgrade.lock().unwrap() = Err(DataSourceError::Unreachable("offline".to_string()));
            self
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn set_tier(&self, tier: Tier) {
            if let Ok(record) = self.record.lock().unwrap().as_mut() {
                record.tier = tier;
            }
        }

        fn go_offline(&self) {
            *self.record.lock().unwrap() = Err(DataSourceError::Unreachable("offline".to_string()));
        }
    }

    #[async_trait]
    impl AccountDataSource for MockAuthority {
        async fn get_account_and_usage(&self, _account_id: &AccountId) -> Result<AccountRecord, DataSourceError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.record.lock().unwrap().clone()
        }

        async fn attempt_resource_mutation(
            &self,
            _account_id: &AccountId,
            _mutation: &ResourceMutation,
        ) -> Result<MutationOutcome, DataSourceError> {
            Ok(MutationOutcome::Applied)
        }

        async fn submit_upgrade(&self, _account_id: &AccountId, target: Tier) -> Result<UpgradeOutcome, DataSourceError> {
            let outcome = self.upgrade.lock().unwrap().clone();
            if let Ok(UpgradeOutcome::Succeeded) = outcome {
                self.set_tier(target);
            }
            outcome
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        authority: Arc<MockAuthority>,
        state: Arc<AccountEntitlementState>,
        coordinator: UpgradeCoordinator,
    }

    async fn fixture(authority: MockAuthority) -> Fixture {
        let authority = Arc::new(authority);
        let state = Arc::new(AccountEntitlementState::new(AccountId::new("acct-upg").unwrap()));
        let sync = Arc::new(EntitlementSync::new(
            authority.clone(),
            state.clone(),
            PolicyEngine::default(),
        ));
        sync.initial_load().await.unwrap();
        let coordinator = UpgradeCoordinator::new(authority.clone(), state.clone(), sync);
        Fixture {
            authority,
            state,
            coordinator,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Start
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn start_requires_higher_tier() {
        let f = fixture(MockAuthority::new(Tier::Connect, 0)).await;

        assert!(matches!(
            f.coordinator.start(Tier::Connect),
            Err(EntitlementError::InvalidTransition { .. })
        ));
        assert!(matches!(
            f.coordinator.start(Tier::Free),
            Err(EntitlementError::InvalidTransition { .. })
        ));
        assert!(f.coordinator.pending().is_none());
    }

    #[tokio::test]
    async fn second_start_while_pending_is_rejected() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;

        let handle = f.coordinator.start(Tier::Connect).unwrap();
        let err = f.coordinator.start(Tier::Baseline).unwrap_err();
        assert_eq!(err, EntitlementError::TransactionInProgress(handle.id()));
    }

    #[tokio::test]
    async fn start_succeeds_again_after_resolution() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;

        let handle = f.coordinator.start(Tier::Connect).unwrap();
        f.coordinator
            .fail(handle.id(), UpgradeFailure::Declined { reason: "card".into() })
            .unwrap();

        assert!(f.coordinator.start(Tier::Connect).is_ok());
    }

    #[tokio::test]
    async fn start_before_sync_is_unknown() {
        let authority = Arc::new(MockAuthority::new(Tier::Free, 0));
        let state = Arc::new(AccountEntitlementState::new(AccountId::new("acct-upg").unwrap()));
        let sync = Arc::new(EntitlementSync::new(authority.clone(), state.clone(), PolicyEngine::default()));
        let coordinator = UpgradeCoordinator::new(authority, state, sync);

        assert_eq!(
            coordinator.start(Tier::Connect).unwrap_err(),
            EntitlementError::Unknown
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Confirm & Fail
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn confirm_applies_tier_and_grants_features() {
        let f = fixture(MockAuthority::new(Tier::Free, 1)).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();
        f.authority.set_tier(Tier::Connect);

        let transaction = f.coordinator.confirm(handle.id()).await.unwrap();
        assert_eq!(transaction.status, UpgradeStatus::Confirmed);
        assert_eq!(handle.status(), UpgradeStatus::Confirmed);

        let snapshot = f.state.snapshot().unwrap();
        assert_eq!(snapshot.tier(), Tier::Connect);
        assert_eq!(snapshot.usage.connected_device_count, 1);
        let decision = PolicyEngine::default().evaluate(
            snapshot.tier(),
            &snapshot.usage,
            Action::RequireFeature(FeatureFlag::PdfUpload),
        );
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn confirm_of_unknown_transaction_is_not_found() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let id = TransactionId::new();
        assert_eq!(
            f.coordinator.confirm(id).await.unwrap_err(),
            EntitlementError::TransactionNotFound(id)
        );
    }

    #[tokio::test]
    async fn stale_confirm_marks_failed() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        // Tier moved past the target through another path.
        f.state.apply_tier(Tier::Baseline).unwrap();

        let err = f.coordinator.confirm(handle.id()).await.unwrap_err();
        assert_eq!(
            err,
            EntitlementError::StaleTransition {
                target: Tier::Connect,
                current: Tier::Baseline
            }
        );
        let transaction = handle.transaction();
        assert_eq!(transaction.status, UpgradeStatus::Failed);
        assert_eq!(
            transaction.failure,
            Some(UpgradeFailure::StaleTransition {
                current: Tier::Baseline
            })
        );
        assert!(f.coordinator.pending().is_none());
    }

    #[tokio::test]
    async fn confirm_with_failed_refresh_is_still_confirmed() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();
        f.authority.go_offline();

        let err = f.coordinator.confirm(handle.id()).await.unwrap_err();
        assert!(matches!(err, EntitlementError::SyncFailure(_)));
        assert_eq!(handle.status(), UpgradeStatus::Confirmed);
        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Connect);
    }

    #[tokio::test]
    async fn fail_leaves_state_untouched() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let handle = f.coordinator.start(Tier::Baseline).unwrap();

        let transaction = f
            .coordinator
            .fail(handle.id(), UpgradeFailure::Declined { reason: "card".into() })
            .unwrap();
        assert_eq!(transaction.status, UpgradeStatus::Failed);
        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Free);

        // Terminal states are not retried.
        assert!(f.coordinator.confirm(handle.id()).await.is_err());
    }

    #[tokio::test]
    async fn dropped_confirm_still_resolves_as_confirmed() {
        let gate = Arc::new(Notify::new());
        // One permit for the initial load; the refresh inside confirm parks.
        gate.notify_one();
        let f = fixture(MockAuthority::new(Tier::Free, 0).gated(gate.clone())).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        {
            let confirm = f.coordinator.confirm(handle.id());
            tokio::pin!(confirm);
            let polled = futures::poll!(confirm.as_mut());
            assert!(polled.is_pending());
        }

        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Connect);
        assert_eq!(handle.status(), UpgradeStatus::Confirmed);
        assert!(f.coordinator.pending().is_none());
    }

    /// A fixture whose next refresh parks until `gate` is notified.
    async fn parked_refresh_fixture() -> (Fixture, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        gate.notify_one();
        let f = fixture(MockAuthority::new(Tier::Free, 0).gated(gate.clone())).await;
        (f, gate)
    }

    #[tokio::test]
    async fn second_confirm_during_refresh_is_in_progress() {
        let (f, gate) = parked_refresh_fixture().await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        let first = f.coordinator.confirm(handle.id());
        tokio::pin!(first);
        assert!(futures::poll!(first.as_mut()).is_pending());

        assert_eq!(
            f.coordinator.confirm(handle.id()).await.unwrap_err(),
            EntitlementError::TransactionInProgress(handle.id())
        );
        assert_eq!(handle.status(), UpgradeStatus::Pending);

        gate.notify_one();
        let transaction = first.await.unwrap();
        assert_eq!(transaction.status, UpgradeStatus::Confirmed);
        assert_eq!(handle.transaction().failure, None);
        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Connect);
    }

    #[tokio::test]
    async fn fail_during_refresh_is_refused() {
        let (f, gate) = parked_refresh_fixture().await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        let confirm = f.coordinator.confirm(handle.id());
        tokio::pin!(confirm);
        assert!(futures::poll!(confirm.as_mut()).is_pending());

        let err = f
            .coordinator
            .fail(handle.id(), UpgradeFailure::Declined { reason: "late".into() })
            .unwrap_err();
        assert_eq!(err, EntitlementError::TransactionInProgress(handle.id()));

        gate.notify_one();
        confirm.await.unwrap();
        assert_eq!(handle.status(), UpgradeStatus::Confirmed);
    }

    #[tokio::test]
    async fn abandon_during_refresh_leaves_confirmation() {
        let (f, gate) = parked_refresh_fixture().await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        let confirm = f.coordinator.confirm(handle.id());
        tokio::pin!(confirm);
        assert!(futures::poll!(confirm.as_mut()).is_pending());

        assert!(f.coordinator.abandon().is_none());

        gate.notify_one();
        confirm.await.unwrap();
        let transaction = handle.wait().await;
        assert_eq!(transaction.status, UpgradeStatus::Confirmed);
        assert_eq!(transaction.failure, None);
        assert!(f.coordinator.pending().is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Execute & Handles
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn execute_confirms_on_success() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;

        let transaction = f.coordinator.execute(Tier::Baseline).await.unwrap();
        assert_eq!(transaction.status, UpgradeStatus::Confirmed);
        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Baseline);
    }

    #[tokio::test]
    async fn execute_reports_decline() {
        let f = fixture(MockAuthority::new(Tier::Free, 0).declining("card declined")).await;

        let transaction = f.coordinator.execute(Tier::Connect).await.unwrap();
        assert_eq!(transaction.status, UpgradeStatus::Failed);
        assert_eq!(
            transaction.failure,
            Some(UpgradeFailure::Declined {
                reason: "card declined".to_string()
            })
        );
        assert_eq!(f.state.snapshot().unwrap().tier(), Tier::Free);
    }

    #[tokio::test]
    async fn execute_reports_unreachable_authority() {
        let f = fixture(MockAuthority::new(Tier::Free, 0).unreachable_upgrades()).await;

        let transaction = f.coordinator.execute(Tier::Connect).await.unwrap();
        assert!(matches!(
            transaction.failure,
            Some(UpgradeFailure::SyncFailure { .. })
        ));
    }

    #[tokio::test]
    async fn wait_returns_once_resolved() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait().await })
        };
        f.coordinator.confirm(handle.id()).await.unwrap();

        let resolved = waiter.await.unwrap();
        assert_eq!(resolved.status, UpgradeStatus::Confirmed);
    }

    #[tokio::test]
    async fn abandon_fails_pending_with_session_ended() {
        let f = fixture(MockAuthority::new(Tier::Free, 0)).await;
        let handle = f.coordinator.start(Tier::Connect).unwrap();

        let abandoned = f.coordinator.abandon().unwrap();
        assert_eq!(abandoned.failure, Some(UpgradeFailure::SessionEnded));
        assert_eq!(handle.wait().await.status, UpgradeStatus::Failed);
        assert!(f.coordinator.abandon().is_none());
    }
}
