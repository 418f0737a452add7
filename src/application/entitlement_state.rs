//! AccountEntitlementState - session-scoped cache of one account's entitlements.
//!
//! Holds tier and usage as a single snapshot inside a `watch` cell. Every
//! write is one check-and-set on that cell, so readers always see a
//! consistent (tier, usage) pair and concurrent writers cannot interleave.
//!
//! Lifecycle: empty at session start, filled by the first successful sync,
//! emptied for good by [`AccountEntitlementState::end`] at logout.

use tokio::sync::watch;

use crate::domain::entitlement::{
    Account, EntitlementError, EntitlementSnapshot, ResourceUsage, Tier,
};
use crate::domain::foundation::{AccountId, Timestamp};
use crate::ports::AccountRecord;

/// What subscribers observe on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitlementView {
    /// `None` until the first sync, and again after the session ended.
    pub snapshot: Option<EntitlementSnapshot>,
    pub ended: bool,
}

/// Result of folding an authoritative record into local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub snapshot: EntitlementSnapshot,
    /// Set when the service reported a tier below the local one. The local
    /// tier is kept since tiers only move up here.
    pub ignored_downgrade: Option<Tier>,
}

pub struct AccountEntitlementState {
    account_id: AccountId,
    cell: watch::Sender<EntitlementView>,
}

impl AccountEntitlementState {
    pub fn new(account_id: AccountId) -> Self {
        let (cell, _) = watch::channel(EntitlementView::default());
        Self { account_id, cell }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Tier and usage read together.
    ///
    /// # Errors
    ///
    /// `Unknown` before the first sync and after the session ended.
    pub fn snapshot(&self) -> Result<EntitlementSnapshot, EntitlementError> {
        self.cell.borrow().snapshot.clone().ok_or(EntitlementError::Unknown)
    }

    pub fn is_synced(&self) -> bool {
        self.cell.borrow().snapshot.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.cell.borrow().ended
    }

    pub fn subscribe(&self) -> watch::Receiver<EntitlementView> {
        self.cell.subscribe()
    }

    /// Move to a strictly higher tier. The only way tier changes.
    ///
    /// # Errors
    ///
    /// - `SessionEnded` after [`end`](Self::end)
    /// - `Unknown` before the first sync
    /// - `InvalidTransition` unless `new_tier` is above the current tier
    pub fn apply_tier(&self, new_tier: Tier) -> Result<EntitlementSnapshot, EntitlementError> {
        self.write(|snapshot| {
            let current = snapshot.account.tier;
            if new_tier <= current {
                return Err(EntitlementError::InvalidTransition {
                    from: current,
                    to: new_tier,
                });
            }
            snapshot.account.tier = new_tier;
            Ok(())
        })
    }

    /// Overwrite usage with a count the account service confirmed.
    pub fn apply_usage(&self, usage: ResourceUsage) -> Result<EntitlementSnapshot, EntitlementError> {
        self.write(|snapshot| {
            snapshot.usage = usage;
            Ok(())
        })
    }

    /// Fold an authoritative record into state in one step.
    ///
    /// Installs the first snapshot, applies a higher server tier, and always
    /// takes the server's usage.
    pub fn reconcile(&self, record: AccountRecord) -> Result<Reconciled, EntitlementError> {
        let usage = ResourceUsage::with_devices(record.connected_device_count);
        let mut result = Err(EntitlementError::SessionEnded);

        self.cell.send_if_modified(|view| {
            if view.ended {
                return false;
            }
            let mut ignored_downgrade = None;
            let snapshot = match view.snapshot.take() {
                None => EntitlementSnapshot::new(Account::new(self.account_id.clone(), record.tier), usage),
                Some(mut snapshot) => {
                    if record.tier > snapshot.account.tier {
                        snapshot.account.tier = record.tier;
                    } else if record.tier < snapshot.account.tier {
                        ignored_downgrade = Some(record.tier);
                    }
                    snapshot.usage = usage;
                    snapshot.synced_at = Timestamp::now();
                    snapshot
                }
            };
            view.snapshot = Some(snapshot.clone());
            result = Ok(Reconciled {
                snapshot,
                ignored_downgrade,
            });
            true
        });

        result
    }

    /// Drop cached state at logout. Later writes fail with `SessionEnded`.
    pub fn end(&self) {
        self.cell.send_if_modified(|view| {
            if view.ended {
                return false;
            }
            view.ended = true;
            view.snapshot = None;
            true
        });
    }

    fn write(
        &self,
        f: impl FnOnce(&mut EntitlementSnapshot) -> Result<(), EntitlementError>,
    ) -> Result<EntitlementSnapshot, EntitlementError> {
        let mut result = Err(EntitlementError::Unknown);

        self.cell.send_if_modified(|view| {
            if view.ended {
                result = Err(EntitlementError::SessionEnded);
                return false;
            }
            let Some(snapshot) = view.snapshot.as_mut() else {
                return false;
            };
            match f(snapshot) {
                Ok(()) => {
                    result = Ok(snapshot.clone());
                    true
                }
                Err(e) => {
                    result = Err(e);
                    false
                }
            }
        });

        result
    }
}
