//! Listing holdings and summarising their contents.

use crate::lock::LockManager;
use crate::paths::PathResolver;
use crate::store::ObjectStore;
use crate::{io_context, FilesError, FilesResult};
use holdings_uuid::HoldingId;
use std::fs;
use std::path::Path;

/// Contents and flags of one holding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoldingSummary {
    /// Track paths relative to `music/`, sorted.
    pub tracks: Vec<String>,
    pub has_artwork: bool,
    pub locked: bool,
}

/// Enumerates holdings across all shards.
#[derive(Clone, Debug)]
pub struct HoldingEnumerator {
    resolver: PathResolver,
    store: ObjectStore,
    locks: LockManager,
}

impl HoldingEnumerator {
    pub fn new(resolver: PathResolver, store: ObjectStore, locks: LockManager) -> Self {
        Self {
            resolver,
            store,
            locks,
        }
    }

    /// Lists every holding identifier in the library, sorted.
    ///
    /// Walks each shard directory under the root and collects the names of the holding
    /// directories inside. Names were validated when the holdings were written and are not
    /// re-validated here. Stray files at either level are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] if the root or a shard directory cannot be read.
    pub fn list_all(&self) -> FilesResult<Vec<String>> {
        let root = self.resolver.root();
        let mut ids = Vec::new();

        for shard in read_dir_entries(root)? {
            if !shard.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let shard_path = shard.path();
            for holding in read_dir_entries(&shard_path)? {
                if holding.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    ids.push(holding.file_name().to_string_lossy().into_owned());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Summarises one holding: its track list, whether artwork is stored and whether it is
    /// locked.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::HoldingNotFound`] if the holding directory does not exist; no
    /// other probe runs in that case.
    pub fn describe(&self, id: &HoldingId) -> FilesResult<HoldingSummary> {
        if !self.resolver.holding_dir(id).is_dir() {
            return Err(FilesError::HoldingNotFound(*id));
        }

        Ok(HoldingSummary {
            tracks: self.store.list_tracks(id)?,
            has_artwork: self.store.has_artwork(id),
            locked: self.locks.is_locked(id),
        })
    }
}

fn read_dir_entries(dir: &Path) -> FilesResult<Vec<fs::DirEntry>> {
    fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| io_context(e, "read directory", dir))
}
