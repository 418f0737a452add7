//! Entitlement domain module.
//!
//! Decides what an account may do at its subscription tier.
//!
//! # Module Structure
//!
//! - `tier` - Tier subscription levels
//! - `feature` / `device` - Gated capabilities and wearable kinds
//! - `tier_limits` / `catalog` - What each tier grants, verified monotonic
//! - `policy` - Pure allow/deny evaluation
//! - `decision` / `upsell` - Policy results and the upgrade prompt built from them
//! - `account` - Account, usage and the snapshot pair
//! - `upgrade` - Upgrade transaction state machine
//! - `errors` - Entitlement error taxonomy

mod account;
mod action;
mod catalog;
mod decision;
mod device;
mod errors;
mod feature;
mod policy;
mod tier;
mod tier_limits;
mod upgrade;
mod upsell;

pub use account::{Account, EntitlementSnapshot, ResourceUsage};
pub use action::Action;
pub use catalog::{CatalogError, TierCatalog};
pub use decision::{DecisionReason, EntitlementDecision};
pub use device::DeviceKind;
pub use errors::EntitlementError;
pub use feature::FeatureFlag;
pub use policy::{evaluate, PolicyEngine};
pub use tier::Tier;
pub use tier_limits::{ConnectionLimit, TierLimits};
pub use upgrade::{UpgradeFailure, UpgradeStatus, UpgradeTransaction};
pub use upsell::UpsellTrigger;
