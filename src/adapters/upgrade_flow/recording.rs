//! Recording upgrade flow for tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::entitlement::UpsellTrigger;
use crate::ports::UpgradeFlow;

/// Records every presented trigger in order.
#[derive(Debug, Default)]
pub struct RecordingUpgradeFlow {
    presented: Mutex<Vec<UpsellTrigger>>,
}

impl RecordingUpgradeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> Vec<UpsellTrigger> {
        self.presented.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.presented.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<UpsellTrigger> {
        self.presented.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.presented.lock().unwrap().clear();
    }
}

#[async_trait]
impl UpgradeFlow for RecordingUpgradeFlow {
    async fn present(&self, trigger: UpsellTrigger) {
        self.presented.lock().unwrap().push(trigger);
    }
}
