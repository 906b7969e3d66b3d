//! Holding lock markers.
//!
//! A holding is either unlocked or locked. The only transition is unlocked → locked, made by
//! creating a zero-byte `lock` file in the holding directory. Nothing in this crate removes the
//! marker; unlocking is an operator action on the filesystem.

use crate::paths::PathResolver;
use crate::{io_context, FilesError, FilesResult};
use holdings_uuid::HoldingId;
use std::fs::OpenOptions;

/// Creates and queries per-holding lock markers.
#[derive(Clone, Debug)]
pub struct LockManager {
    resolver: PathResolver,
}

impl LockManager {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Locks a holding against further track writes.
    ///
    /// Idempotent: locking an already locked holding succeeds and leaves the marker untouched.
    ///
    /// # Errors
    ///
    /// - [`FilesError::HoldingNotFound`] if the holding directory does not exist.
    /// - [`FilesError::Io`] if the marker cannot be created.
    pub fn lock(&self, id: &HoldingId) -> FilesResult<()> {
        if !self.resolver.holding_dir(id).is_dir() {
            return Err(FilesError::HoldingNotFound(*id));
        }

        let marker = self.resolver.ensure_in_root(&self.resolver.lock_path(id))?;
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&marker)
            .map_err(|e| io_context(e, "create lock marker", &marker))?;

        tracing::info!(uuid = %id, "holding locked");
        Ok(())
    }

    /// Returns true iff the lock marker exists.
    pub fn is_locked(&self, id: &HoldingId) -> bool {
        self.resolver.lock_path(id).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathResolver, LockManager) {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let locks = LockManager::new(resolver.clone());
        (temp, resolver, locks)
    }

    #[test]
    fn test_unlocked_by_default() {
        let (_temp, resolver, locks) = setup();
        let id = HoldingId::new();
        fs::create_dir_all(resolver.holding_dir(&id)).unwrap();

        assert!(!locks.is_locked(&id));
    }

    #[test]
    fn test_lock_creates_empty_marker() {
        let (_temp, resolver, locks) = setup();
        let id = HoldingId::new();
        fs::create_dir_all(resolver.holding_dir(&id)).unwrap();

        locks.lock(&id).unwrap();

        assert!(locks.is_locked(&id));
        let meta = fs::metadata(resolver.lock_path(&id)).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 0);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let (_temp, resolver, locks) = setup();
        let id = HoldingId::new();
        fs::create_dir_all(resolver.holding_dir(&id)).unwrap();

        locks.lock(&id).unwrap();
        locks.lock(&id).unwrap();

        assert!(locks.is_locked(&id));
        assert_eq!(fs::metadata(resolver.lock_path(&id)).unwrap().len(), 0);
    }

    #[test]
    fn test_lock_missing_holding() {
        let (_temp, resolver, locks) = setup();
        let id = HoldingId::new();

        assert!(matches!(locks.lock(&id), Err(FilesError::HoldingNotFound(_))));
        assert!(!resolver.holding_dir(&id).exists());
    }
}
