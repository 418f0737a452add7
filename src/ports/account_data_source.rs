//! Account data source port - the authoritative record of tier and usage.
//!
//! Local policy checks are advisory. The implementation behind this port
//! decides whether a limited action really happens, and whether an upgrade
//! really went through.
//!
//! # Example
//!
//! ```ignore
//! match source.attempt_resource_mutation(&account_id, &mutation).await? {
//!     MutationOutcome::Applied => { /* refresh, then show success */ }
//!     MutationOutcome::Forbidden { reason, required_tier, .. } => { /* upsell */ }
//!     MutationOutcome::Rejected { message } => { /* show message */ }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entitlement::{Action, DeviceKind, EntitlementError, FeatureFlag, Tier};
use crate::domain::foundation::AccountId;

#[async_trait]
pub trait AccountDataSource: Send + Sync {
    /// Current tier and resource counts as of the last write.
    async fn get_account_and_usage(&self, account_id: &AccountId) -> Result<AccountRecord, DataSourceError>;

    /// Perform a limited action. The response is the final admission decision.
    async fn attempt_resource_mutation(
        &self,
        account_id: &AccountId,
        mutation: &ResourceMutation,
    ) -> Result<MutationOutcome, DataSourceError>;

    /// Ask the payment authority to move the account to `target_tier`.
    async fn submit_upgrade(
        &self,
        account_id: &AccountId,
        target_tier: Tier,
    ) -> Result<UpgradeOutcome, DataSourceError>;
}

/// Server-side view of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub tier: Tier,
    pub connected_device_count: u32,
}

/// A change to tier-limited resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMutation {
    ConnectDevice(DeviceKind),
    DisconnectDevice(DeviceKind),
    UploadDocument { filename: String, content: Vec<u8> },
}

impl ResourceMutation {
    /// The gated action this mutation needs, if any. Disconnecting is never gated.
    pub fn gated_action(&self) -> Option<Action> {
        match self {
            ResourceMutation::ConnectDevice(_) => Some(Action::ConnectDevice),
            ResourceMutation::DisconnectDevice(_) => None,
            ResourceMutation::UploadDocument { .. } => {
                Some(Action::RequireFeature(FeatureFlag::PdfUpload))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceMutation::ConnectDevice(_) => "connect_device",
            ResourceMutation::DisconnectDevice(_) => "disconnect_device",
            ResourceMutation::UploadDocument { .. } => "upload_document",
        }
    }
}

/// Entitlement reason attached to a forbidden response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    LimitReached,
    FeatureNotInTier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Denied on entitlement grounds.
    Forbidden {
        reason: ForbiddenReason,
        /// Tier the service says would lift the denial, when it says.
        required_tier: Option<Tier>,
        message: Option<String>,
    },
    /// Refused for a reason unrelated to tier, e.g. the device is already connected.
    Rejected { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Succeeded,
    Failed { reason: String },
}

/// Transport-level failures talking to the account service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    #[error("account service unreachable: {0}")]
    Unreachable(String),

    #[error("account service rejected the credentials")]
    Unauthorized,

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("unexpected response from account service: {0}")]
    Malformed(String),

    #[error("{0} is not supported by this account service")]
    Unsupported(&'static str),
}

impl From<DataSourceError> for EntitlementError {
    fn from(err: DataSourceError) -> Self {
        EntitlementError::SyncFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn account_data_source_is_object_safe() {
        fn _accepts_dyn(_source: &dyn AccountDataSource) {}
    }

    #[test]
    fn connect_is_count_gated() {
        let mutation = ResourceMutation::ConnectDevice(DeviceKind::Oura);
        assert_eq!(mutation.gated_action(), Some(Action::ConnectDevice));
    }

    #[test]
    fn upload_is_flag_gated() {
        let mutation = ResourceMutation::UploadDocument {
            filename: "blood.pdf".to_string(),
            content: vec![],
        };
        assert_eq!(
            mutation.gated_action(),
            Some(Action::RequireFeature(FeatureFlag::PdfUpload))
        );
    }

    #[test]
    fn disconnect_is_not_gated() {
        assert_eq!(
            ResourceMutation::DisconnectDevice(DeviceKind::Garmin).gated_action(),
            None
        );
    }

    #[test]
    fn transport_errors_become_sync_failures() {
        let err: EntitlementError = DataSourceError::Unreachable("connection refused".into()).into();
        assert_eq!(err.code(), ErrorCode::SyncFailure);
        assert!(err.to_string().contains("connection refused"));
    }
}
