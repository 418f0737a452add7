//! Wearable device kinds that can be connected to an account.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    AppleHealth,
    GoogleFit,
    Oura,
    Garmin,
    Whoop,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::AppleHealth,
        DeviceKind::GoogleFit,
        DeviceKind::Oura,
        DeviceKind::Garmin,
        DeviceKind::Whoop,
    ];

    /// Wire identifier (`wearable_type`) used by the account API.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::AppleHealth => "apple_health",
            DeviceKind::GoogleFit => "google_fit",
            DeviceKind::Oura => "oura",
            DeviceKind::Garmin => "garmin",
            DeviceKind::Whoop => "whoop",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceKind::AppleHealth => "Apple Health",
            DeviceKind::GoogleFit => "Google Fit",
            DeviceKind::Oura => "Oura Ring",
            DeviceKind::Garmin => "Garmin",
            DeviceKind::Whoop => "WHOOP",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_value("wearable_type", s))
    }
}
