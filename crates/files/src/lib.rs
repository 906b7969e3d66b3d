//! Holdings file storage
//!
//! This crate is the storage and locking core of the holdings library: it maps holding
//! identifiers onto a sharded directory tree, keeps every caller-supplied path inside the
//! library root, enforces the write-once-then-lock rule for tracks and lists what is stored.
//!
//! ## On-disk layout
//!
//! ```text
//! <library_root>/
//! └── <id[0..2]>/              # shard
//!     └── <id>/                # holding
//!         ├── music/           # track entries, arbitrary nesting
//!         │   └── disc1/01.flac
//!         ├── albumart         # at most one artwork blob
//!         └── lock             # zero-byte marker, present once locked
//! ```
//!
//! ## Components
//!
//! - [`PathResolver`] derives holding paths and rejects traversal outside the root.
//! - [`LockManager`] creates and queries the lock marker.
//! - [`ObjectStore`] reads, writes and lists tracks and artwork.
//! - [`HoldingEnumerator`] lists every holding and summarises one holding.
//! - [`Library`] bundles the four over a single root.
//!
//! None of the components hold in-process state beyond the root path; all coordination
//! between concurrent callers happens on the filesystem.
//!
//! ## Example Usage
//!
//! ```no_run
//! use holdings_files::{HoldingId, Library};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = Library::open(Path::new("/srv/library"))?;
//! let id = HoldingId::parse("550e8400-e29b-41d4-a716-446655440000")?;
//!
//! library.store().put_track(&id, "disc1/01.flac", b"...")?;
//! library.locks().lock(&id)?;
//! # Ok(())
//! # }
//! ```

mod constants;
mod enumerate;
mod library;
mod lock;
mod paths;
mod store;

pub use constants::{
    ARTWORK_FILE_NAME, LOCK_FILE_NAME, MUSIC_DIR_NAME, STAGING_PREFIX, STALE_STAGING_AGE,
};
pub use enumerate::{HoldingEnumerator, HoldingSummary};
pub use holdings_uuid::{HoldingId, UuidError};
pub use library::Library;
pub use lock::LockManager;
pub use paths::{ensure_safe, normalize_lexically, PathResolver};
pub use store::ObjectStore;

use std::path::PathBuf;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Library root does not exist or is not a directory
    #[error("Invalid library root: {0}")]
    InvalidRootDirectory(String),

    /// Holding identifier failed validation
    #[error(transparent)]
    InvalidId(#[from] UuidError),

    /// A resolved path escapes the directory it must stay inside
    #[error("{} is outside of {}", target.display(), root.display())]
    Traversal { root: PathBuf, target: PathBuf },

    /// A caller-supplied path is empty or names a directory rather than a file
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Track write refused because the holding carries a lock marker
    #[error("Lock exists for {0}")]
    Locked(HoldingId),

    /// Holding directory does not exist
    #[error("Holding not found: {0}")]
    HoldingNotFound(HoldingId),

    /// Requested file does not exist inside an existing holding
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type FilesResult<T> = Result<T, FilesError>;

/// Wraps an I/O error with the operation and path it occurred on, keeping its kind.
pub(crate) fn io_context(e: std::io::Error, what: &str, path: &std::path::Path) -> FilesError {
    FilesError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {} {}: {}", what, path.display(), e),
    ))
}
