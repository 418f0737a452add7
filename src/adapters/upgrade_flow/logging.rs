use async_trait::async_trait;

use crate::domain::entitlement::UpsellTrigger;
use crate::ports::UpgradeFlow;

/// Logs each trigger at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingUpgradeFlow;

#[async_trait]
impl UpgradeFlow for LoggingUpgradeFlow {
    async fn present(&self, trigger: UpsellTrigger) {
        tracing::info!(
            feature = %trigger.feature_name,
            required_tier = %trigger.required_tier,
            current_tier = %trigger.current_tier,
            "{}",
            trigger.user_message()
        );
    }
}
