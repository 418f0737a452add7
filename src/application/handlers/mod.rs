//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod entitlement;

pub use entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, CheckEntitlementResult, ConnectDeviceCommand,
    ConnectDeviceHandler, ConnectDeviceResult, DisconnectDeviceCommand, DisconnectDeviceHandler,
    DisconnectDeviceResult, EntitlementSummary, GetEntitlementSummaryHandler,
    GetEntitlementSummaryQuery, RequestUpgradeCommand, RequestUpgradeHandler,
    UploadDocumentCommand, UploadDocumentHandler, UploadDocumentResult,
};
