//! Baseline Entitlements - Tier gating and upgrade synchronization
//!
//! This crate decides which wellness features an account may use on its
//! subscription tier, and keeps the client's view of tier and wearable usage
//! consistent with the account service across connects and upgrades.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
