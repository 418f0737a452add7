//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AccountDataSource` - Authoritative account record, resource mutations, upgrades
//! - `UpgradeFlow` - Presentation-side receiver of upsell triggers

mod account_data_source;
mod upgrade_flow;

pub use account_data_source::{
    AccountDataSource, AccountRecord, DataSourceError, ForbiddenReason, MutationOutcome,
    ResourceMutation, UpgradeOutcome,
};
pub use upgrade_flow::UpgradeFlow;
