//! DisconnectDeviceHandler - Command handler for removing a wearable.

use std::sync::Arc;

use crate::application::entitlement_sync::{EntitlementSync, MutationResult};
use crate::domain::entitlement::{DeviceKind, EntitlementError};
use crate::ports::ResourceMutation;

#[derive(Debug, Clone, Copy)]
pub struct DisconnectDeviceCommand {
    pub device: DeviceKind,
}

#[derive(Debug, Clone)]
pub struct DisconnectDeviceResult {
    pub outcome: MutationResult,
}

/// Disconnecting is never gated, but still goes through the service and a
/// refresh so the freed slot is confirmed before the next check.
pub struct DisconnectDeviceHandler {
    sync: Arc<EntitlementSync>,
}

impl DisconnectDeviceHandler {
    pub fn new(sync: Arc<EntitlementSync>) -> Self {
        Self { sync }
    }

    pub async fn handle(&self, cmd: DisconnectDeviceCommand) -> Result<DisconnectDeviceResult, EntitlementError> {
        self.sync.state().snapshot()?;
        let outcome = self
            .sync
            .attempt_mutation(&ResourceMutation::DisconnectDevice(cmd.device))
            .await?;

        if outcome.is_applied() {
            tracing::info!(
                account_id = %self.sync.state().account_id(),
                device = cmd.device.as_str(),
                "Wearable disconnected"
            );
        }
        Ok(DisconnectDeviceResult { outcome })
    }
}
