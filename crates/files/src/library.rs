use crate::enumerate::HoldingEnumerator;
use crate::lock::LockManager;
use crate::paths::PathResolver;
use crate::store::ObjectStore;
use crate::FilesResult;
use std::path::Path;

/// The storage components wired over one library root.
///
/// Cheap to clone; every component only carries the canonical root path.
#[derive(Clone, Debug)]
pub struct Library {
    resolver: PathResolver,
    locks: LockManager,
    store: ObjectStore,
    enumerator: HoldingEnumerator,
}

impl Library {
    /// Opens the library rooted at `root`, which must already exist.
    pub fn open(root: &Path) -> FilesResult<Self> {
        let resolver = PathResolver::new(root)?;
        let locks = LockManager::new(resolver.clone());
        let store = ObjectStore::new(resolver.clone(), locks.clone());
        let enumerator = HoldingEnumerator::new(resolver.clone(), store.clone(), locks.clone());

        Ok(Self {
            resolver,
            locks,
            store,
            enumerator,
        })
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn enumerator(&self) -> &HoldingEnumerator {
        &self.enumerator
    }
}
