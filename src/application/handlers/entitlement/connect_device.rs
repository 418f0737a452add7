//! ConnectDeviceHandler - Command handler for connecting a wearable.

use std::sync::Arc;

use super::gated::run_gated;
use crate::application::entitlement_sync::{EntitlementSync, MutationResult};
use crate::domain::entitlement::{Action, DeviceKind, EntitlementError, PolicyEngine, UpsellTrigger};
use crate::ports::{ResourceMutation, UpgradeFlow};

/// Command to connect one more wearable.
#[derive(Debug, Clone, Copy)]
pub struct ConnectDeviceCommand {
    pub device: DeviceKind,
}

#[derive(Debug, Clone)]
pub struct ConnectDeviceResult {
    pub outcome: MutationResult,
    /// Upsell that was presented, when the connection was denied.
    pub upsell: Option<UpsellTrigger>,
}

/// Handler for connecting wearables.
///
/// The local check only short-circuits denials. An allowed connect always
/// goes to the account service, which may still refuse it if another client
/// connected a device in the meantime.
pub struct ConnectDeviceHandler {
    sync: Arc<EntitlementSync>,
    policy: PolicyEngine,
    upgrade_flow: Arc<dyn UpgradeFlow>,
}

impl ConnectDeviceHandler {
    pub fn new(sync: Arc<EntitlementSync>, policy: PolicyEngine, upgrade_flow: Arc<dyn UpgradeFlow>) -> Self {
        Self {
            sync,
            policy,
            upgrade_flow,
        }
    }

    pub async fn handle(&self, cmd: ConnectDeviceCommand) -> Result<ConnectDeviceResult, EntitlementError> {
        let mutation = ResourceMutation::ConnectDevice(cmd.device);
        let gated = run_gated(
            &self.sync,
            &self.policy,
            self.upgrade_flow.as_ref(),
            Action::ConnectDevice,
            &mutation,
        )
        .await?;

        if gated.outcome.is_applied() {
            tracing::info!(
                account_id = %self.sync.state().account_id(),
                device = cmd.device.as_str(),
                "Wearable connected"
            );
        }

        Ok(ConnectDeviceResult {
            outcome: gated.outcome,
            upsell: gated.upsell,
        })
    }
}
