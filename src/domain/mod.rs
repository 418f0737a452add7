//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `entitlement` - Tiers, catalog, policy evaluation and upgrade transactions

pub mod entitlement;
pub mod foundation;
