//! Application layer - Session state, synchronization and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//!
//! - `entitlement_state` - Session-scoped cache of tier and usage
//! - `entitlement_sync` - Reconciles the cache with the account service
//! - `upgrade_coordinator` - Drives upgrade transactions
//! - `handlers` - Command and query handlers
//! - `session` - Facade handed to the presentation layer

pub mod entitlement_state;
pub mod entitlement_sync;
pub mod handlers;
pub mod session;
pub mod upgrade_coordinator;

pub use entitlement_state::{AccountEntitlementState, EntitlementView, Reconciled};
pub use entitlement_sync::{EntitlementSync, MutationResult};
pub use session::EntitlementSession;
pub use upgrade_coordinator::{UpgradeCoordinator, UpgradeHandle};
