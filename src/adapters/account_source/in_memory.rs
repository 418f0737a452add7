//! In-memory account data source.
//!
//! Plays the role of the account service inside one process, applying the
//! same admission rules the service does:
//! - the wearable ceiling comes from the tier catalog (free = 1)
//! - the ceiling is checked before the duplicate check, as the service does
//! - a repeat connect of an active device is rejected, not forbidden
//! - PDF upload needs `pdf_upload` and a `.pdf` filename
//! - upgrades only move up
//!
//! Useful for development, tests, and demos. Data does not persist.
//!
//! # Usage
//!
//! ```ignore
//! let source = InMemoryAccountDataSource::new()
//!     .with_account(account_id.clone(), Tier::Free)
//!     .with_devices(&account_id, [DeviceKind::AppleHealth]);
//! ```

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, RwLock};

use crate::domain::entitlement::{DeviceKind, FeatureFlag, Tier, TierCatalog};
use crate::domain::foundation::AccountId;
use crate::ports::{
    AccountDataSource, AccountRecord, DataSourceError, ForbiddenReason, MutationOutcome,
    ResourceMutation, UpgradeOutcome,
};

#[derive(Debug, Clone)]
struct AccountRow {
    tier: Tier,
    devices: BTreeSet<DeviceKind>,
    documents: Vec<String>,
}

impl AccountRow {
    fn new(tier: Tier) -> Self {
        Self {
            tier,
            devices: BTreeSet::new(),
            documents: Vec::new(),
        }
    }

    fn record(&self) -> Result<AccountRecord, DataSourceError> {
        Ok(AccountRecord {
            tier: self.tier,
            connected_device_count: super::device_count(self.devices.len())?,
        })
    }
}

/// Thread-safe via internal locks. Locks are never held across an await.
#[derive(Debug)]
pub struct InMemoryAccountDataSource {
    accounts: Mutex<HashMap<AccountId, AccountRow>>,
    catalog: &'static TierCatalog,
    /// Unknown accounts are created on the free tier instead of erroring.
    auto_provision: bool,
    /// Error returned by every call while set (for failure-path tests).
    force_error: RwLock<Option<DataSourceError>>,
    /// When set, every upgrade is declined with this reason.
    decline_upgrades: RwLock<Option<String>>,
}

impl Default for InMemoryAccountDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountDataSource {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            catalog: TierCatalog::standard(),
            auto_provision: false,
            force_error: RwLock::new(None),
            decline_upgrades: RwLock::new(None),
        }
    }

    /// A source that registers unknown accounts on the free tier.
    pub fn auto_provisioning() -> Self {
        Self {
            auto_provision: true,
            ..Self::new()
        }
    }

    pub fn with_account(self, account_id: AccountId, tier: Tier) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(account_id, AccountRow::new(tier));
        self
    }

    pub fn with_devices(
        self,
        account_id: &AccountId,
        devices: impl IntoIterator<Item = DeviceKind>,
    ) -> Self {
        if let Some(row) = self.accounts.lock().unwrap().get_mut(account_id) {
            row.devices.extend(devices);
        }
        self
    }

    /// Forces all calls to return the specified error.
    pub fn fail_with(&self, error: DataSourceError) {
        *self.force_error.write().unwrap() = Some(error);
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    /// Declines every upgrade until cleared with `None`.
    pub fn set_decline_upgrades(&self, reason: Option<String>) {
        *self.decline_upgrades.write().unwrap() = reason;
    }

    /// Connect a device behind the session's back, as another client would.
    pub fn connect_externally(&self, account_id: &AccountId, device: DeviceKind) {
        if let Some(row) = self.accounts.lock().unwrap().get_mut(account_id) {
            row.devices.insert(device);
        }
    }

    /// Overwrite the tier behind the session's back.
    pub fn set_tier(&self, account_id: &AccountId, tier: Tier) {
        if let Some(row) = self.accounts.lock().unwrap().get_mut(account_id) {
            row.tier = tier;
        }
    }

    pub fn tier_of(&self, account_id: &AccountId) -> Option<Tier> {
        self.accounts.lock().unwrap().get(account_id).map(|row| row.tier)
    }

    pub fn devices_of(&self, account_id: &AccountId) -> Vec<DeviceKind> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .map(|row| row.devices.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn documents_of(&self, account_id: &AccountId) -> Vec<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .map(|row| row.documents.clone())
            .unwrap_or_default()
    }

    fn check_forced_error(&self) -> Result<(), DataSourceError> {
        match self.force_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_row<T>(
        &self,
        account_id: &AccountId,
        f: impl FnOnce(&mut AccountRow) -> T,
    ) -> Result<T, DataSourceError> {
        self.check_forced_error()?;
        let mut accounts = self.accounts.lock().unwrap();
        if self.auto_provision {
            let row = accounts
                .entry(account_id.clone())
                .or_insert_with(|| AccountRow::new(Tier::Free));
            return Ok(f(row));
        }
        accounts
            .get_mut(account_id)
            .map(f)
            .ok_or_else(|| DataSourceError::AccountNotFound(account_id.clone()))
    }

    fn connect(&self, row: &mut AccountRow, device: DeviceKind) -> Result<MutationOutcome, DataSourceError> {
        let connected = super::device_count(row.devices.len())?;
        let limits = self.catalog.limits_for(row.tier);
        if !limits.can_connect_device(connected) {
            return Ok(MutationOutcome::Forbidden {
                reason: ForbiddenReason::LimitReached,
                required_tier: self.catalog.lowest_tier_admitting(connected),
                message: Some(format!(
                    "{} tier allows only {} wearable connection(s).",
                    row.tier.display_name(),
                    limits.max_wearable_connections
                )),
            });
        }
        if !row.devices.insert(device) {
            return Ok(MutationOutcome::Rejected {
                message: "This wearable is already connected".to_string(),
            });
        }
        Ok(MutationOutcome::Applied)
    }

    fn upload(&self, row: &mut AccountRow, filename: &str) -> MutationOutcome {
        if !self.catalog.limits_for(row.tier).includes(FeatureFlag::PdfUpload) {
            return MutationOutcome::Forbidden {
                reason: ForbiddenReason::FeatureNotInTier,
                required_tier: self.catalog.lowest_tier_with_feature(FeatureFlag::PdfUpload),
                message: Some("PDF upload is only available for paid tiers.".to_string()),
            };
        }
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            return MutationOutcome::Rejected {
                message: "Only PDF files are allowed".to_string(),
            };
        }
        row.documents.push(filename.to_string());
        MutationOutcome::Applied
    }
}

#[async_trait]
impl AccountDataSource for InMemoryAccountDataSource {
    async fn get_account_and_usage(&self, account_id: &AccountId) -> Result<AccountRecord, DataSourceError> {
        self.with_row(account_id, |row| row.record())?
    }

    async fn attempt_resource_mutation(
        &self,
        account_id: &AccountId,
        mutation: &ResourceMutation,
    ) -> Result<MutationOutcome, DataSourceError> {
        self.with_row(account_id, |row| match mutation {
            ResourceMutation::ConnectDevice(device) => self.connect(row, *device),
            ResourceMutation::DisconnectDevice(device) => {
                if row.devices.remove(device) {
                    Ok(MutationOutcome::Applied)
                } else {
                    Ok(MutationOutcome::Rejected {
                        message: "Wearable not connected".to_string(),
                    })
                }
            }
            ResourceMutation::UploadDocument { filename, .. } => Ok(self.upload(row, filename)),
        })?
    }

    async fn submit_upgrade(
        &self,
        account_id: &AccountId,
        target_tier: Tier,
    ) -> Result<UpgradeOutcome, DataSourceError> {
        let declined = self.decline_upgrades.read().unwrap().clone();
        self.with_row(account_id, |row| {
            if let Some(reason) = declined {
                return UpgradeOutcome::Failed { reason };
            }
            if target_tier <= row.tier {
                return UpgradeOutcome::Failed {
                    reason: format!("Account is already on {}", row.tier.display_name()),
                };
            }
            row.tier = target_tier;
            UpgradeOutcome::Succeeded
        })
    }
}
