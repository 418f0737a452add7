//! UploadDocumentHandler - Command handler for blood test PDF uploads.

use std::sync::Arc;

use super::gated::run_gated;
use crate::application::entitlement_sync::{EntitlementSync, MutationResult};
use crate::domain::entitlement::{Action, EntitlementError, FeatureFlag, PolicyEngine, UpsellTrigger};
use crate::domain::foundation::ValidationError;
use crate::ports::{ResourceMutation, UpgradeFlow};

#[derive(Debug, Clone)]
pub struct UploadDocumentCommand {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadDocumentCommand {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::empty_field("filename"));
        }
        if !self.filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ValidationError::invalid_format("filename", "only PDF files are allowed"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UploadDocumentResult {
    pub outcome: MutationResult,
    pub upsell: Option<UpsellTrigger>,
}

/// Handler for PDF uploads, gated on `pdf_upload`.
pub struct UploadDocumentHandler {
    sync: Arc<EntitlementSync>,
    policy: PolicyEngine,
    upgrade_flow: Arc<dyn UpgradeFlow>,
}

impl UploadDocumentHandler {
    pub fn new(sync: Arc<EntitlementSync>, policy: PolicyEngine, upgrade_flow: Arc<dyn UpgradeFlow>) -> Self {
        Self {
            sync,
            policy,
            upgrade_flow,
        }
    }

    pub async fn handle(&self, cmd: UploadDocumentCommand) -> Result<UploadDocumentResult, EntitlementError> {
        cmd.validate()?;

        let filename = cmd.filename.clone();
        let mutation = ResourceMutation::UploadDocument {
            filename: cmd.filename,
            content: cmd.content,
        };
        let gated = run_gated(
            &self.sync,
            &self.policy,
            self.upgrade_flow.as_ref(),
            Action::RequireFeature(FeatureFlag::PdfUpload),
            &mutation,
        )
        .await?;

        if gated.outcome.is_applied() {
            tracing::info!(
                account_id = %self.sync.state().account_id(),
                filename = %filename,
                "Document uploaded"
            );
        }

        Ok(UploadDocumentResult {
            outcome: gated.outcome,
            upsell: gated.upsell,
        })
    }
}
