//! Channel-backed upgrade flow.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::entitlement::UpsellTrigger;
use crate::ports::UpgradeFlow;

/// Default buffer for pending triggers.
const DEFAULT_CAPACITY: usize = 16;

/// Sends triggers to whoever holds the receiver.
///
/// Never waits on the receiver. A full buffer or a closed receiver drops
/// the trigger with a warning.
#[derive(Debug, Clone)]
pub struct ChannelUpgradeFlow {
    sender: mpsc::Sender<UpsellTrigger>,
}

impl ChannelUpgradeFlow {
    pub fn new() -> (Self, mpsc::Receiver<UpsellTrigger>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<UpsellTrigger>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl UpgradeFlow for ChannelUpgradeFlow {
    async fn present(&self, trigger: UpsellTrigger) {
        if let Err(e) = self.sender.try_send(trigger) {
            tracing::warn!(error = %e, "Dropping upsell trigger");
        }
    }
}
