//! Server metadata reported by `/version`.

use crate::config::{LibraryConfig, ShardDescriptor};
use crate::{CoreError, CoreResult};
use std::path::Path;

/// Snapshot of the server's version, free space and shard layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
    /// Bytes available to unprivileged users on the library filesystem.
    pub free_space: u64,
    pub shards: Vec<ShardDescriptor>,
}

impl ServerInfo {
    pub fn collect(cfg: &LibraryConfig, library_root: &Path) -> CoreResult<Self> {
        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            free_space: free_space(library_root)?,
            shards: cfg.shards().to_vec(),
        })
    }
}

/// Returns the bytes available to unprivileged users on the filesystem holding `path`.
#[cfg(unix)]
pub fn free_space(path: &Path) -> CoreResult<u64> {
    let stat = nix::sys::statvfs::statvfs(path)
        .map_err(|errno| CoreError::FreeSpace(std::io::Error::from(errno)))?;

    #[allow(clippy::useless_conversion)]
    let available = u64::from(stat.blocks_available());
    #[allow(clippy::useless_conversion)]
    let fragment = u64::from(stat.fragment_size());
    Ok(available.saturating_mul(fragment))
}

#[cfg(not(unix))]
pub fn free_space(_path: &Path) -> CoreResult<u64> {
    Err(CoreError::FreeSpace(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "free space is only reported on unix",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_free_space_of_temp_dir() {
        let temp = TempDir::new().unwrap();
        assert!(free_space(temp.path()).is_ok());
    }

    #[test]
    fn test_free_space_missing_path() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            free_space(&temp.path().join("missing")),
            Err(CoreError::FreeSpace(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_reports_config_shards() {
        let temp = TempDir::new().unwrap();
        let cfg = LibraryConfig::from_values(
            8080,
            "admin".into(),
            "hunter2".into(),
            temp.path().to_path_buf(),
        )
        .unwrap();

        let info = ServerInfo::collect(&cfg, temp.path()).unwrap();

        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.shards, cfg.shards());
    }
}
