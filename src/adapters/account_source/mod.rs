//! Account source adapters - implementations of `AccountDataSource`.
//!
//! - `InMemoryAccountDataSource` - In-process account service for development and tests
//! - `HttpAccountDataSource` - REST client for the account service

mod http;
mod in_memory;

pub use http::HttpAccountDataSource;
pub use in_memory::InMemoryAccountDataSource;

use std::sync::Arc;

use crate::config::{AccountSourceConfig, AccountSourceKind};
use crate::ports::{AccountDataSource, DataSourceError};

/// Builds the configured account source.
pub fn build_account_source(
    config: &AccountSourceConfig,
) -> Result<Arc<dyn AccountDataSource>, DataSourceError> {
    match config.kind {
        AccountSourceKind::InMemory => Ok(Arc::new(InMemoryAccountDataSource::auto_provisioning())),
        AccountSourceKind::Http => Ok(Arc::new(HttpAccountDataSource::from_config(config)?)),
    }
}

/// Connected-device count as carried on the wire.
fn device_count(connected: usize) -> Result<u32, DataSourceError> {
    u32::try_from(connected)
        .map_err(|_| DataSourceError::Malformed(format!("{} connected devices", connected)))
}
