//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the state machine
//! trait that the entitlement domain is built from.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{AccountId, TransactionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
