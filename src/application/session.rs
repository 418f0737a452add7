//! EntitlementSession - what the presentation layer holds for one login.
//!
//! Owns the account's entitlement state and everything that writes to it.
//! Open one per authenticated session, load it, and `end()` it at logout.
//!
//! ```ignore
//! let session = EntitlementSession::open(account_id, source, upgrade_flow);
//! session.initial_load().await?;
//!
//! let decision = session.check(Action::ConnectDevice)?;
//! if !decision.allowed {
//!     let handle = session.request_upgrade(Tier::Connect)?;
//!     handle.wait().await;
//! }
//! ```

use std::sync::Arc;
use tokio::sync::watch;

use super::entitlement_state::{AccountEntitlementState, EntitlementView};
use super::entitlement_sync::EntitlementSync;
use super::handlers::entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, ConnectDeviceCommand, ConnectDeviceHandler,
    ConnectDeviceResult, DisconnectDeviceCommand, DisconnectDeviceHandler, DisconnectDeviceResult,
    EntitlementSummary, GetEntitlementSummaryHandler, GetEntitlementSummaryQuery,
    RequestUpgradeCommand, RequestUpgradeHandler, UploadDocumentCommand, UploadDocumentHandler,
    UploadDocumentResult,
};
use super::upgrade_coordinator::{UpgradeCoordinator, UpgradeHandle};
use crate::domain::entitlement::{
    Action, DeviceKind, EntitlementDecision, EntitlementError, EntitlementSnapshot, PolicyEngine,
    ResourceUsage, Tier, UpgradeTransaction,
};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountDataSource, UpgradeFlow};

pub struct EntitlementSession {
    state: Arc<AccountEntitlementState>,
    sync: Arc<EntitlementSync>,
    coordinator: Arc<UpgradeCoordinator>,
    check: CheckEntitlementHandler,
    connect: ConnectDeviceHandler,
    disconnect: DisconnectDeviceHandler,
    upload: UploadDocumentHandler,
    upgrade: RequestUpgradeHandler,
    summary: GetEntitlementSummaryHandler,
}

impl EntitlementSession {
    /// Open a session with the standard tier catalog. State starts unknown.
    pub fn open(
        account_id: AccountId,
        source: Arc<dyn AccountDataSource>,
        upgrade_flow: Arc<dyn UpgradeFlow>,
    ) -> Self {
        Self::with_policy(account_id, source, upgrade_flow, PolicyEngine::default())
    }

    pub fn with_policy(
        account_id: AccountId,
        source: Arc<dyn AccountDataSource>,
        upgrade_flow: Arc<dyn UpgradeFlow>,
        policy: PolicyEngine,
    ) -> Self {
        let state = Arc::new(AccountEntitlementState::new(account_id));
        let sync = Arc::new(EntitlementSync::new(source.clone(), state.clone(), policy));
        let coordinator = Arc::new(UpgradeCoordinator::new(source, state.clone(), sync.clone()));

        Self {
            check: CheckEntitlementHandler::new(state.clone(), policy),
            connect: ConnectDeviceHandler::new(sync.clone(), policy, upgrade_flow.clone()),
            disconnect: DisconnectDeviceHandler::new(sync.clone()),
            upload: UploadDocumentHandler::new(sync.clone(), policy, upgrade_flow),
            upgrade: RequestUpgradeHandler::new(coordinator.clone()),
            summary: GetEntitlementSummaryHandler::new(state.clone(), policy),
            state,
            sync,
            coordinator,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        self.state.account_id()
    }

    pub async fn initial_load(&self) -> Result<EntitlementSnapshot, EntitlementError> {
        self.sync.initial_load().await
    }

    /// Re-fetch from the account service, e.g. after a failed load.
    pub async fn refresh(&self) -> Result<EntitlementSnapshot, EntitlementError> {
        self.sync.refresh_after_mutation().await
    }

    /// Evaluate an action against cached state. `Unknown` before sync.
    pub fn check(&self, action: Action) -> Result<EntitlementDecision, EntitlementError> {
        Ok(self.check.handle(CheckEntitlementQuery { action })?.decision)
    }

    pub fn current_tier(&self) -> Result<Tier, EntitlementError> {
        Ok(self.state.snapshot()?.tier())
    }

    pub fn current_usage(&self) -> Result<ResourceUsage, EntitlementError> {
        Ok(self.state.snapshot()?.usage)
    }

    pub fn summary(&self) -> Result<EntitlementSummary, EntitlementError> {
        self.summary.handle(GetEntitlementSummaryQuery)
    }

    /// Start an upgrade that resolves in the background.
    pub fn request_upgrade(&self, target_tier: Tier) -> Result<UpgradeHandle, EntitlementError> {
        self.upgrade.handle(RequestUpgradeCommand { target_tier })
    }

    /// Run an upgrade to completion on the current task.
    pub async fn upgrade(&self, target_tier: Tier) -> Result<UpgradeTransaction, EntitlementError> {
        self.coordinator.execute(target_tier).await
    }

    pub fn pending_upgrade(&self) -> Option<UpgradeTransaction> {
        self.coordinator.pending()
    }

    pub async fn connect_device(&self, device: DeviceKind) -> Result<ConnectDeviceResult, EntitlementError> {
        self.connect.handle(ConnectDeviceCommand { device }).await
    }

    pub async fn disconnect_device(&self, device: DeviceKind) -> Result<DisconnectDeviceResult, EntitlementError> {
        self.disconnect.handle(DisconnectDeviceCommand { device }).await
    }

    pub async fn upload_document(
        &self,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Result<UploadDocumentResult, EntitlementError> {
        self.upload
            .handle(UploadDocumentCommand {
                filename: filename.into(),
                content,
            })
            .await
    }

    pub fn subscribe(&self) -> watch::Receiver<EntitlementView> {
        self.state.subscribe()
    }

    /// Logout. Pending upgrades fail with `SessionEnded` and cached state
    /// is discarded.
    pub fn end(&self) {
        if let Some(abandoned) = self.coordinator.abandon() {
            tracing::info!(
                account_id = %self.state.account_id(),
                transaction_id = %abandoned.id,
                "Pending upgrade abandoned at logout"
            );
        }
        self.state.end();
        tracing::info!(account_id = %self.state.account_id(), "Entitlement session ended");
    }
}
