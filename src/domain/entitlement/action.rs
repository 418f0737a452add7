//! Actions the policy engine can be asked about.

use serde::{Deserialize, Serialize};

use super::FeatureFlag;

/// A feature-gated action requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "feature", rename_all = "snake_case")]
pub enum Action {
    /// Connect one more wearable device (count-limited).
    ConnectDevice,
    /// Use a capability that is present only at some tiers (flag-gated).
    RequireFeature(FeatureFlag),
}

impl Action {
    /// Name carried by upsell triggers for this action.
    pub fn feature_name(&self) -> &'static str {
        match self {
            Action::ConnectDevice => "connect_device",
            Action::RequireFeature(flag) => flag.as_str(),
        }
    }

    /// Human-readable label for upsell copy.
    pub fn display_name(&self) -> &'static str {
        match self {
            Action::ConnectDevice => "Connecting another wearable",
            Action::RequireFeature(flag) => flag.display_name(),
        }
    }
}

impl From<FeatureFlag> for Action {
    fn from(flag: FeatureFlag) -> Self {
        Action::RequireFeature(flag)
    }
}
