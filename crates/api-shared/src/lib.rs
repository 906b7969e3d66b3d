//! # API Shared
//!
//! Shared utilities and definitions for the holdings APIs.
//!
//! Contains:
//! - Wire types returned by the HTTP endpoints (`wire` module)
//! - Shared services like `HealthService`
//! - HTTP Basic credential parsing and verification
//!
//! Used by `api-rest` and the operator CLI for common functionality.

pub mod auth;
pub mod health;
pub mod wire;

pub use auth::{BasicCredentials, CredentialCheck};
pub use health::{HealthRes, HealthService};
pub use wire::{HoldingRes, ServerInfoRes, ShardRes};
