//! Upgrade flow port - where upsell triggers are handed to the UI.

use async_trait::async_trait;

use crate::domain::entitlement::UpsellTrigger;

/// Receives upsell triggers built from denied decisions.
///
/// Presenting is fire-and-forget: a slow or closed UI never affects
/// entitlement state.
#[async_trait]
pub trait UpgradeFlow: Send + Sync {
    async fn present(&self, trigger: UpsellTrigger);
}
