//! Holding identifiers and sharded-path utilities.
//!
//! Every holding in the library is identified by a UUID4 and stored under a shard directory
//! derived from that UUID.
//!
//! This crate provides:
//! - A wrapper type ([`HoldingId`]) that *guarantees* the canonical uuid4 form once
//!   constructed.
//! - The sharding rule that maps an identifier to its directory under the library root.
//!
//! ## Canonical form
//! - Length: 36, dash-grouped `8-4-4-4-12`
//! - Characters: `0-9` and `a-f` (upper-case input is accepted and lowered)
//! - Version nibble (first character of the third group) is `4`
//! - Variant nibble (first character of the fourth group) is one of `8`, `9`, `a`, `b`
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! ## Sharded directory layout
//! For a canonical id `u`, a holding lives at:
//! `library_root/<u[0..2]>/<u>/`
//!
//! Example:
//! `/srv/library/55/550e8400-e29b-41d4-a716-446655440000/`
//!
//! Two identifiers sharing their first two hex characters share a shard directory but never a
//! holding directory.

mod holding_id;

pub use holding_id::{HoldingId, Uuid, HOLDING_ID_LEN, SHARD_PREFIX_LEN};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Input is not exactly 36 bytes long.
    #[error("{input} - Invalid length")]
    InvalidLength { input: String },

    /// Input is 36 bytes long but is not a canonical uuid4.
    #[error("{input} - Invalid uuid4 format")]
    InvalidFormat { input: String },
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
