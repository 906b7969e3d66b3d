//! Path derivation and containment checks.
//!
//! Every path the storage core touches is derived here. Identifier-derived segments are safe by
//! construction (a [`HoldingId`] cannot contain separators), but track sub-paths come straight
//! from callers and must be checked with [`ensure_safe`] before use.
//!
//! Containment is decided on lexically normalised paths, compared component by component, so a
//! root of `/data/lib` never accepts `/data/library2/x` and `a/../../x` is seen for what it is.

use crate::constants::{ARTWORK_FILE_NAME, LOCK_FILE_NAME, MUSIC_DIR_NAME};
use crate::{io_context, FilesError, FilesResult};
use holdings_uuid::HoldingId;
use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
///
/// A `..` at the root stays at the root, mirroring how the kernel resolves `/..`.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_root {
                    if out.as_os_str().is_empty() {
                        out.push(component);
                    }
                } else if matches!(out.components().next_back(), Some(Component::ParentDir)) {
                    out.push(component);
                } else {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn absolute(path: &Path) -> FilesResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}

/// Verifies that `candidate` stays inside `root`.
///
/// Both paths are made absolute and lexically normalised before `root` is checked to be a
/// component-wise ancestor of (or equal to) `candidate`.
///
/// # Returns
///
/// The normalised absolute form of `candidate`, which callers should use for the actual
/// filesystem operation.
///
/// # Errors
///
/// Returns [`FilesError::Traversal`] if the candidate escapes `root`.
pub fn ensure_safe(root: &Path, candidate: &Path) -> FilesResult<PathBuf> {
    let root = normalize_lexically(&absolute(root)?);
    let resolved = normalize_lexically(&absolute(candidate)?);

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(FilesError::Traversal {
            root,
            target: candidate.to_path_buf(),
        })
    }
}

/// Maps holding identifiers and sub-paths onto the library root.
///
/// The root is canonicalised once at construction; every derived path hangs off that canonical
/// form, which keeps the lexical containment checks meaningful even when the configured root
/// goes through a symlink.
#[derive(Clone, Debug)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver over an existing library root.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidRootDirectory`] if the root does not exist, is not a
    /// directory or cannot be canonicalised.
    pub fn new(root: &Path) -> FilesResult<Self> {
        if !root.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Validates an untrusted identifier before any path is derived from it.
    pub fn validate(candidate: &str) -> FilesResult<HoldingId> {
        Ok(HoldingId::parse(candidate)?)
    }

    /// Returns the canonical library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/<id[0..2]>/<id>`
    pub fn holding_dir(&self, id: &HoldingId) -> PathBuf {
        id.sharded_dir(&self.root)
    }

    pub fn music_dir(&self, id: &HoldingId) -> PathBuf {
        self.holding_dir(id).join(MUSIC_DIR_NAME)
    }

    pub fn artwork_path(&self, id: &HoldingId) -> PathBuf {
        self.holding_dir(id).join(ARTWORK_FILE_NAME)
    }

    pub fn lock_path(&self, id: &HoldingId) -> PathBuf {
        self.holding_dir(id).join(LOCK_FILE_NAME)
    }

    /// Checks `candidate` against the library root.
    pub fn ensure_in_root(&self, candidate: &Path) -> FilesResult<PathBuf> {
        ensure_safe(&self.root, candidate)
    }

    /// Resolves a caller-supplied, slash-separated track path under the holding's `music/`
    /// directory.
    ///
    /// Empty segments are ignored, so a leading `/` cannot turn the path absolute. The result
    /// must land strictly below `music/`: a path that climbs out of it (even if it would stay
    /// inside the holding, such as `../lock`) is a traversal, and one that normalises to
    /// `music/` itself is an invalid path.
    ///
    /// # Errors
    ///
    /// - [`FilesError::Traversal`] if the path escapes the holding's track subtree.
    /// - [`FilesError::InvalidPath`] if nothing remains after normalisation or a segment
    ///   contains a NUL byte.
    pub fn track_path(&self, id: &HoldingId, relative: &str) -> FilesResult<PathBuf> {
        let music = self.music_dir(id);
        let mut candidate = music.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            if segment.contains('\0') {
                return Err(FilesError::InvalidPath(format!(
                    "track path {:?} contains a NUL byte",
                    relative
                )));
            }
            candidate.push(segment);
        }

        let resolved = ensure_safe(&music, &candidate).map_err(|e| match e {
            FilesError::Traversal { .. } => FilesError::Traversal {
                root: music.clone(),
                target: PathBuf::from(relative),
            },
            other => other,
        })?;

        if resolved == music {
            return Err(FilesError::InvalidPath(format!(
                "track path {:?} does not name a file",
                relative
            )));
        }

        self.ensure_in_root(&resolved)
    }

    /// Creates the holding directory (and its shard) if missing.
    pub(crate) fn create_holding_dir(&self, id: &HoldingId) -> FilesResult<PathBuf> {
        let dir = self.holding_dir(id);
        std::fs::create_dir_all(&dir).map_err(|e| io_context(e, "create holding directory", &dir))?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id() -> HoldingId {
        HoldingId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_lexically(Path::new("/a/../../..")), PathBuf::from("/"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexically(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_ensure_safe_accepts_descendants() {
        let resolved = ensure_safe(Path::new("/data/lib"), Path::new("/data/lib/ab/x")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/lib/ab/x"));
        assert!(ensure_safe(Path::new("/data/lib"), Path::new("/data/lib")).is_ok());
    }

    #[test]
    fn test_ensure_safe_rejects_sibling_with_shared_prefix() {
        for candidate in ["/data/library2/x", "/data/lib2", "/data/li"] {
            assert!(
                matches!(
                    ensure_safe(Path::new("/data/lib"), Path::new(candidate)),
                    Err(FilesError::Traversal { .. })
                ),
                "accepted {candidate}"
            );
        }
    }

    #[test]
    fn test_ensure_safe_rejects_parent_traversal() {
        let result = ensure_safe(Path::new("/data/lib"), Path::new("/data/lib/ab/../../../etc"));
        assert!(matches!(result, Err(FilesError::Traversal { .. })));
    }

    #[test]
    fn test_resolver_root_not_exists() {
        let temp = TempDir::new().unwrap();
        let result = PathResolver::new(&temp.path().join("missing"));
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_resolver_root_not_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "not a directory").unwrap();
        assert!(matches!(
            PathResolver::new(&file),
            Err(FilesError::InvalidRootDirectory(_))
        ));
    }

    #[test]
    fn test_holding_layout() {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let root = resolver.root().to_path_buf();
        let id = id();

        let holding = root.join("55").join(id.to_string());
        assert_eq!(resolver.holding_dir(&id), holding);
        assert_eq!(resolver.music_dir(&id), holding.join("music"));
        assert_eq!(resolver.artwork_path(&id), holding.join("albumart"));
        assert_eq!(resolver.lock_path(&id), holding.join("lock"));
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        assert!(matches!(
            PathResolver::validate("favicon.ico"),
            Err(FilesError::InvalidId(_))
        ));
        assert!(PathResolver::validate("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn test_track_path_nested() {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let id = id();

        let path = resolver.track_path(&id, "disc1/./01 intro.flac").unwrap();
        assert_eq!(path, resolver.music_dir(&id).join("disc1").join("01 intro.flac"));
    }

    #[test]
    fn test_track_path_leading_slash_stays_relative() {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let id = id();

        let path = resolver.track_path(&id, "/etc/passwd").unwrap();
        assert!(path.starts_with(resolver.music_dir(&id)));
    }

    #[test]
    fn test_track_path_traversal() {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let id = id();

        for relative in ["../../etc/passwd", "../lock", "../albumart", "a/../../x", ".."] {
            assert!(
                matches!(
                    resolver.track_path(&id, relative),
                    Err(FilesError::Traversal { .. })
                ),
                "accepted {relative}"
            );
        }
    }

    #[test]
    fn test_track_path_degenerate() {
        let temp = TempDir::new().unwrap();
        let resolver = PathResolver::new(temp.path()).unwrap();
        let id = id();

        for relative in ["", "/", ".", "a/..", "a\0b", "disc1/\0"] {
            assert!(
                matches!(
                    resolver.track_path(&id, relative),
                    Err(FilesError::InvalidPath(_))
                ),
                "accepted {relative:?}"
            );
        }
    }
}
