//! RequestUpgradeHandler - Command handler for tier upgrades.

use std::sync::Arc;

use crate::application::upgrade_coordinator::{UpgradeCoordinator, UpgradeHandle};
use crate::domain::entitlement::{EntitlementError, Tier};

#[derive(Debug, Clone, Copy)]
pub struct RequestUpgradeCommand {
    pub target_tier: Tier,
}

/// Starts an upgrade and resolves it in the background.
///
/// Returns as soon as the transaction is pending; the handle reports the
/// outcome. Must be called from within a tokio runtime.
pub struct RequestUpgradeHandler {
    coordinator: Arc<UpgradeCoordinator>,
}

impl RequestUpgradeHandler {
    pub fn new(coordinator: Arc<UpgradeCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn handle(&self, cmd: RequestUpgradeCommand) -> Result<UpgradeHandle, EntitlementError> {
        let handle = self.coordinator.start(cmd.target_tier)?;

        let coordinator = Arc::clone(&self.coordinator);
        let task_handle = handle.clone();
        tokio::spawn(async move {
            coordinator.drive(&task_handle).await;
        });

        Ok(handle)
    }
}
