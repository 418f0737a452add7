//! Account source configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::Environment;

/// Which account data source the application talks to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountSourceKind {
    /// In-process store, for development and demos
    #[default]
    InMemory,
    /// Account service REST API
    Http,
}

/// Account source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSourceConfig {
    #[serde(default)]
    pub kind: AccountSourceKind,

    /// Base URL of the account service (required for `http`)
    #[serde(default)]
    pub base_url: String,

    /// Bearer token sent with every request
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl AccountSourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate account source configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.kind == AccountSourceKind::Http {
            if self.base_url.is_empty() {
                return Err(ValidationError::MissingRequired("account_source.base_url"));
            }
            if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
                return Err(ValidationError::InvalidBaseUrl);
            }
            if *environment == Environment::Production && !self.base_url.starts_with("https://") {
                return Err(ValidationError::BaseUrlMustBeHttps);
            }
        }
        Ok(())
    }
}

impl Default for AccountSourceConfig {
    fn default() -> Self {
        Self {
            kind: AccountSourceKind::default(),
            base_url: String::new(),
            api_token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    15
}
