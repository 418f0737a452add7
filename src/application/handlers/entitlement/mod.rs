//! Entitlement handlers.
//!
//! Command and query handlers for tier-gated operations:
//!
//! ## Commands
//! - Connecting and disconnecting wearables
//! - Uploading blood test PDFs
//! - Requesting a tier upgrade
//!
//! ## Queries
//! - Check whether an action is permitted
//! - Entitlement summary for the profile screen

mod check_entitlement;
mod connect_device;
mod disconnect_device;
mod gated;
mod get_entitlement_summary;
mod request_upgrade;
mod upload_document;

#[cfg(test)]
mod test_support;

// Commands
pub use connect_device::{ConnectDeviceCommand, ConnectDeviceHandler, ConnectDeviceResult};
pub use disconnect_device::{DisconnectDeviceCommand, DisconnectDeviceHandler, DisconnectDeviceResult};
pub use request_upgrade::{RequestUpgradeCommand, RequestUpgradeHandler};
pub use upload_document::{UploadDocumentCommand, UploadDocumentHandler, UploadDocumentResult};

// Queries
pub use check_entitlement::{CheckEntitlementHandler, CheckEntitlementQuery, CheckEntitlementResult};
pub use get_entitlement_summary::{
    EntitlementSummary, GetEntitlementSummaryHandler, GetEntitlementSummaryQuery,
};
