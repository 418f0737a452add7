//! Loads one account's entitlements and logs the summary.
//!
//! Usage: `baseline-entitlements <account-id> [config-file]`

use std::sync::Arc;
use thiserror::Error;

use baseline_entitlements::adapters::{build_account_source, LoggingUpgradeFlow};
use baseline_entitlements::application::EntitlementSession;
use baseline_entitlements::config::{AppConfig, ConfigError, ValidationError};
use baseline_entitlements::domain::entitlement::EntitlementError;
use baseline_entitlements::domain::foundation::AccountId;
use baseline_entitlements::ports::DataSourceError;

#[derive(Debug, Error)]
enum StartupError {
    #[error("usage: baseline-entitlements <account-id> [config-file]")]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("failed to install logging: {0}")]
    Logging(String),

    #[error("invalid account id: {0}")]
    AccountId(String),

    #[error(transparent)]
    Source(#[from] DataSourceError),

    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let mut args = std::env::args().skip(1);
    let account_id = args.next().ok_or(StartupError::Usage)?;
    let config = match args.next() {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    config
        .logging
        .init()
        .map_err(|e| StartupError::Logging(e.to_string()))?;

    tracing::info!(
        environment = %config.environment,
        account_source = ?config.account_source.kind,
        "Starting entitlement session"
    );

    let account_id = AccountId::new(account_id).map_err(|e| StartupError::AccountId(e.to_string()))?;
    let source = build_account_source(&config.account_source)?;
    let session = EntitlementSession::open(account_id, source, Arc::new(LoggingUpgradeFlow));

    let result = session.initial_load().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, code = %e.code(), "Initial entitlement load failed");
    }
    result?;

    let summary = session.summary()?;
    tracing::info!(
        account_id = %summary.account_id,
        tier = %summary.tier,
        connected_devices = summary.connected_device_count,
        max_wearables = %summary.max_wearable_connections,
        features = ?summary.features,
        available_upgrades = ?summary.available_upgrades,
        "Entitlement summary"
    );

    session.end();
    Ok(())
}
