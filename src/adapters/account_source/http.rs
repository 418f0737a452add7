//! HTTP account data source - talks to the account service REST API.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | account record | `GET /api/auth/me`, `GET /api/v1/wearable/connections` |
//! | connect device | `POST /api/v1/wearable/connect` `{"wearable_type": ..}` |
//! | upload document | `POST /api/v1/upload/pdf` (multipart field `file`) |
//! | upgrade | `POST /api/tier/upgrade` `{"new_tier": ..}` |
//!
//! The service has no disconnect endpoint, so disconnects report
//! [`DataSourceError::Unsupported`].
//!
//! Entitlement denials come back as `403` with a `{"detail": ..}` body and
//! no tier hint. The required tier is left for the caller to derive.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AccountSourceConfig;
use crate::domain::entitlement::{Action, Tier};
use crate::domain::foundation::AccountId;
use crate::ports::{
    AccountDataSource, AccountRecord, DataSourceError, ForbiddenReason, MutationOutcome,
    ResourceMutation, UpgradeOutcome,
};

const PDF_MIME: &str = "application/pdf";

pub struct HttpAccountDataSource {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl std::fmt::Debug for HttpAccountDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAccountDataSource")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpAccountDataSource {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::Unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn from_config(config: &AccountSourceConfig) -> Result<Self, DataSourceError> {
        Self::new(
            config.base_url.clone(),
            config.api_token.clone(),
            config.request_timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DataSourceError> {
        self.authorized(request).send().await.map_err(transport_error)
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, DataSourceError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        let status = response.status();
        if !status.is_success() {
            let detail = read_detail(response).await;
            return Err(read_failure(status, detail));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| DataSourceError::Malformed(format!("failed to parse {}: {}", path, e)))
    }

    fn mutation_request(&self, mutation: &ResourceMutation) -> Result<RequestBuilder, DataSourceError> {
        match mutation {
            ResourceMutation::ConnectDevice(device) => Ok(self
                .client
                .post(self.url("/api/v1/wearable/connect"))
                .json(&ConnectRequest {
                    wearable_type: device.as_str(),
                })),
            ResourceMutation::DisconnectDevice(_) => Err(DataSourceError::Unsupported("disconnect_device")),
            ResourceMutation::UploadDocument { filename, content } => {
                let part = Part::bytes(content.clone())
                    .file_name(filename.clone())
                    .mime_str(PDF_MIME)
                    .map_err(|e| DataSourceError::Malformed(e.to_string()))?;
                Ok(self
                    .client
                    .post(self.url("/api/v1/upload/pdf"))
                    .multipart(Form::new().part("file", part)))
            }
        }
    }
}

#[async_trait]
impl AccountDataSource for HttpAccountDataSource {
    async fn get_account_and_usage(&self, account_id: &AccountId) -> Result<AccountRecord, DataSourceError> {
        let me: MeResponse = self.fetch_json("/api/auth/me").await?;
        if me.id != account_id.as_str() {
            return Err(DataSourceError::AccountNotFound(account_id.clone()));
        }
        let tier: Tier = me
            .tier
            .parse()
            .map_err(|_| DataSourceError::Malformed(format!("unknown tier '{}'", me.tier)))?;

        let connections: Vec<WearableConnectionDto> =
            self.fetch_json("/api/v1/wearable/connections").await?;

        Ok(AccountRecord {
            tier,
            connected_device_count: super::device_count(connections.len())?,
        })
    }

    async fn attempt_resource_mutation(
        &self,
        _account_id: &AccountId,
        mutation: &ResourceMutation,
    ) -> Result<MutationOutcome, DataSourceError> {
        let request = self.mutation_request(mutation)?;
        let response = self.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(MutationOutcome::Applied);
        }
        let detail = read_detail(response).await;
        mutation_outcome(status, detail, mutation)
    }

    async fn submit_upgrade(
        &self,
        _account_id: &AccountId,
        target_tier: Tier,
    ) -> Result<UpgradeOutcome, DataSourceError> {
        let request = self.client.post(self.url("/api/tier/upgrade")).json(&UpgradeRequest {
            new_tier: target_tier.as_str(),
        });
        let response = self.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(UpgradeOutcome::Succeeded);
        }
        let detail = read_detail(response).await;
        upgrade_outcome(status, detail)
    }
}

// =============================================================================
// Response mapping
// =============================================================================

fn transport_error(e: reqwest::Error) -> DataSourceError {
    if e.is_timeout() {
        DataSourceError::Unreachable(format!("request timed out: {}", e))
    } else if e.is_connect() {
        DataSourceError::Unreachable(format!("connection failed: {}", e))
    } else {
        DataSourceError::Unreachable(e.to_string())
    }
}

async fn read_detail(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    parse_detail(&body)
}

fn parse_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => Some(parsed.detail),
        Err(_) if body.trim().is_empty() => None,
        Err(_) => Some(body.trim().to_string()),
    }
}

fn read_failure(status: StatusCode, detail: Option<String>) -> DataSourceError {
    match status {
        StatusCode::UNAUTHORIZED => DataSourceError::Unauthorized,
        s if s.is_server_error() => {
            DataSourceError::Unreachable(format!("account service returned {}", s))
        }
        s => DataSourceError::Malformed(format!(
            "unexpected status {}: {}",
            s,
            detail.unwrap_or_default()
        )),
    }
}

fn mutation_outcome(
    status: StatusCode,
    detail: Option<String>,
    mutation: &ResourceMutation,
) -> Result<MutationOutcome, DataSourceError> {
    match status {
        StatusCode::FORBIDDEN => {
            let reason = match mutation.gated_action() {
                Some(Action::ConnectDevice) => ForbiddenReason::LimitReached,
                _ => ForbiddenReason::FeatureNotInTier,
            };
            Ok(MutationOutcome::Forbidden {
                reason,
                required_tier: None,
                message: detail,
            })
        }
        StatusCode::BAD_REQUEST
        | StatusCode::NOT_FOUND
        | StatusCode::CONFLICT
        | StatusCode::UNPROCESSABLE_ENTITY => Ok(MutationOutcome::Rejected {
            message: detail.unwrap_or_else(|| format!("request rejected with {}", status)),
        }),
        s => Err(read_failure(s, detail)),
    }
}

fn upgrade_outcome(status: StatusCode, detail: Option<String>) -> Result<UpgradeOutcome, DataSourceError> {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::PAYMENT_REQUIRED | StatusCode::FORBIDDEN => {
            Ok(UpgradeOutcome::Failed {
                reason: detail.unwrap_or_else(|| format!("upgrade refused with {}", status)),
            })
        }
        s => Err(read_failure(s, detail)),
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    tier: String,
}

#[derive(Debug, Deserialize)]
struct WearableConnectionDto {
    #[allow(dead_code)]
    wearable_type: String,
}

#[derive(Debug, Serialize)]
struct ConnectRequest {
    wearable_type: &'static str,
}

#[derive(Debug, Serialize)]
struct UpgradeRequest {
    new_tier: &'static str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}
