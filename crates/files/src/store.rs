//! Track and artwork storage.
//!
//! # Write path
//!
//! Uploads arrive fully buffered. A write:
//!
//! 1. resolves the destination through [`PathResolver`] (traversal is rejected before any
//!    mutation),
//! 2. refuses track writes to a locked holding,
//! 3. creates the holding directory and any missing parents,
//! 4. stages the bytes in a temporary file inside the holding directory,
//! 5. re-checks the lock marker (tracks only) and renames the staged file over the destination.
//!
//! Staging files left behind by a crashed write are removed by later writes to the same
//! holding once they are older than [`STALE_STAGING_AGE`].
//!
//! The rename makes concurrent writes to the same path last-writer-wins with no interleaved
//! bytes. The second lock check narrows the window in which a concurrent `lock` can miss an
//! in-flight track write, but cannot close it: a marker created between that check and the
//! rename does not abort the write.
//!
//! # Read path
//!
//! Reads take no locks and may observe a holding mid-write.

use crate::constants::{STAGING_PREFIX, STALE_STAGING_AGE};
use crate::lock::LockManager;
use crate::paths::PathResolver;
use crate::{io_context, FilesError, FilesResult};
use holdings_uuid::HoldingId;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Reads, writes and lists the tracks and artwork of holdings.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    resolver: PathResolver,
    locks: LockManager,
}

impl ObjectStore {
    pub fn new(resolver: PathResolver, locks: LockManager) -> Self {
        Self { resolver, locks }
    }

    /// Writes (or replaces) the track at `relative` and returns the number of bytes written.
    ///
    /// The holding is created on demand.
    ///
    /// # Errors
    ///
    /// - [`FilesError::Traversal`] / [`FilesError::InvalidPath`] for unusable track paths,
    ///   including paths naming a directory or running through an existing file.
    /// - [`FilesError::Locked`] if the holding is locked.
    /// - [`FilesError::Io`] on storage failure.
    pub fn put_track(&self, id: &HoldingId, relative: &str, content: &[u8]) -> FilesResult<u64> {
        let dest = self.resolver.track_path(id, relative)?;

        if self.locks.is_locked(id) {
            return Err(FilesError::Locked(*id));
        }

        check_track_destination(&self.resolver.music_dir(id), &dest, relative)?;

        let holding_dir = self.resolver.create_holding_dir(id)?;
        sweep_stale_staging(&holding_dir);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    FilesError::InvalidPath(format!("track path {:?} runs through a file", relative))
                } else {
                    io_context(e, "create track directory", parent)
                }
            })?;
        }

        let staged = stage(&holding_dir, content)?;

        if self.locks.is_locked(id) {
            // Dropping the staged file removes it.
            return Err(FilesError::Locked(*id));
        }

        persist(staged, &dest)?;
        tracing::debug!(uuid = %id, path = %relative, bytes = content.len(), "track stored");
        Ok(content.len() as u64)
    }

    /// Writes (or replaces) the artwork blob. Permitted whether or not the holding is locked.
    pub fn put_artwork(&self, id: &HoldingId, content: &[u8]) -> FilesResult<u64> {
        let dest = self.resolver.ensure_in_root(&self.resolver.artwork_path(id))?;
        let holding_dir = self.resolver.create_holding_dir(id)?;
        sweep_stale_staging(&holding_dir);

        let staged = stage(&holding_dir, content)?;
        persist(staged, &dest)?;

        tracing::debug!(uuid = %id, bytes = content.len(), "artwork stored");
        Ok(content.len() as u64)
    }

    /// Resolves the file backing a track, for callers that stream it themselves.
    ///
    /// # Errors
    ///
    /// - [`FilesError::HoldingNotFound`] if the holding does not exist.
    /// - [`FilesError::Traversal`] / [`FilesError::InvalidPath`] for unusable track paths.
    /// - [`FilesError::FileNotFound`] if no track is stored at `relative`.
    pub fn track_file(&self, id: &HoldingId, relative: &str) -> FilesResult<PathBuf> {
        self.require_holding(id)?;
        let path = self.resolver.track_path(id, relative)?;
        if !path.is_file() {
            return Err(FilesError::FileNotFound(format!("{}/music/{}", id, relative)));
        }
        Ok(path)
    }

    /// Reads a track into memory.
    pub fn read_track(&self, id: &HoldingId, relative: &str) -> FilesResult<Vec<u8>> {
        let path = self.track_file(id, relative)?;
        fs::read(&path).map_err(|e| io_context(e, "read track", &path))
    }

    /// Resolves the file backing the artwork blob.
    pub fn artwork_file(&self, id: &HoldingId) -> FilesResult<PathBuf> {
        self.require_holding(id)?;
        let path = self.resolver.ensure_in_root(&self.resolver.artwork_path(id))?;
        if !path.is_file() {
            return Err(FilesError::FileNotFound(format!("{}/albumart", id)));
        }
        Ok(path)
    }

    pub fn read_artwork(&self, id: &HoldingId) -> FilesResult<Vec<u8>> {
        let path = self.artwork_file(id)?;
        fs::read(&path).map_err(|e| io_context(e, "read artwork", &path))
    }

    /// Returns true if an artwork blob is stored for the holding.
    pub fn has_artwork(&self, id: &HoldingId) -> bool {
        self.resolver.artwork_path(id).is_file()
    }

    /// Lists every track of a holding as a slash-separated path relative to `music/`.
    ///
    /// Directories are not listed. Output is sorted. A holding without a `music/` directory
    /// (no tracks yet) lists as empty.
    pub fn list_tracks(&self, id: &HoldingId) -> FilesResult<Vec<String>> {
        let music = self.resolver.music_dir(id);
        if !music.is_dir() {
            return Ok(Vec::new());
        }

        let mut tracks = Vec::new();
        for entry in WalkDir::new(&music).min_depth(1).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&music).to_path_buf();
                match e.into_io_error() {
                    Some(io) => io_context(io, "walk track directory", &path),
                    None => FilesError::Io(std::io::Error::other(format!(
                        "Filesystem loop under {}",
                        path.display()
                    ))),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(&music) {
                tracks.push(to_slash_path(relative));
            }
        }

        tracks.sort();
        Ok(tracks)
    }

    fn require_holding(&self, id: &HoldingId) -> FilesResult<()> {
        if self.resolver.holding_dir(id).is_dir() {
            Ok(())
        } else {
            Err(FilesError::HoldingNotFound(*id))
        }
    }
}

fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Rejects destinations that can never hold a track: an existing directory, or a path running
/// through an existing file.
fn check_track_destination(music: &Path, dest: &Path, relative: &str) -> FilesResult<()> {
    if dest.is_dir() {
        return Err(FilesError::InvalidPath(format!(
            "track path {:?} names a directory",
            relative
        )));
    }

    let through_file = dest
        .ancestors()
        .skip(1)
        .take_while(|ancestor| ancestor.starts_with(music) && *ancestor != music)
        .any(|ancestor| ancestor.exists() && !ancestor.is_dir());
    if through_file {
        return Err(FilesError::InvalidPath(format!(
            "track path {:?} runs through a file",
            relative
        )));
    }

    Ok(())
}

/// Removes staging files abandoned by an interrupted write. Failures are logged and ignored.
fn sweep_stale_staging(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let now = SystemTime::now();

    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
            continue;
        }

        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age >= STALE_STAGING_AGE);
        if !stale {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed stale staging file"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale staging file")
            }
        }
    }
}

fn stage(dir: &Path, content: &[u8]) -> FilesResult<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| io_context(e, "create staging file in", dir))?;

    staged
        .write_all(content)
        .map_err(|e| io_context(e, "write staging file", staged.path()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o644))
            .map_err(|e| io_context(e, "set permissions on", staged.path()))?;
    }

    Ok(staged)
}

fn persist(staged: NamedTempFile, dest: &Path) -> FilesResult<()> {
    staged
        .persist(dest)
        .map_err(|e| io_context(e.error, "move staged file to", dest))?;
    Ok(())
}
