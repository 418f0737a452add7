//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `account_source` - Account data sources (in-memory, HTTP)
//! - `upgrade_flow` - Upsell presentation sinks (channel, logging, recording)

pub mod account_source;
pub mod upgrade_flow;

pub use account_source::{build_account_source, HttpAccountDataSource, InMemoryAccountDataSource};
pub use upgrade_flow::{ChannelUpgradeFlow, LoggingUpgradeFlow, RecordingUpgradeFlow};
