//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Unknown {field} '{value}'")]
    UnknownValue { field: String, value: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a value outside an enumerated set.
    pub fn unknown_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::UnknownValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Stable machine-readable error codes handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Entitlement denials
    EntitlementUnknown,
    LimitReached,
    FeatureNotInTier,

    // Transition errors
    InvalidTransition,
    TransactionInProgress,
    TransactionNotFound,
    StaleTransition,

    // Lifecycle and infrastructure errors
    SessionEnded,
    SyncFailure,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EntitlementUnknown => "ENTITLEMENT_UNKNOWN",
            ErrorCode::LimitReached => "LIMIT_REACHED",
            ErrorCode::FeatureNotInTier => "FEATURE_NOT_IN_TIER",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::TransactionInProgress => "TRANSACTION_IN_PROGRESS",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::StaleTransition => "STALE_TRANSITION",
            ErrorCode::SessionEnded => "SESSION_ENDED",
            ErrorCode::SyncFailure => "SYNC_FAILURE",
        };
        write!(f, "{}", s)
    }
}
