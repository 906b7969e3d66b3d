//! # Holdings Core
//!
//! Runtime configuration and server metadata for the holdings library.
//!
//! Storage, locking and enumeration live in `holdings-files`; this crate resolves the
//! configuration those components are opened with and reports on the running instance.
//!
//! **No API concerns**: authentication and HTTP handling belong in `api-shared` and `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod info;

pub use config::{LibraryConfig, ShardDescriptor};
pub use constants::{DEFAULT_API_KEY, DEFAULT_API_USER, DEFAULT_LIBRARY_PATH, DEFAULT_PORT};
pub use error::{CoreError, CoreResult};
pub use holdings_files::{FilesError, HoldingId, HoldingSummary, Library, PathResolver};
pub use info::ServerInfo;
