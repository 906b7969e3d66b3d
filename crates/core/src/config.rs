//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services that
//! need it. Nothing in the request path reads environment variables or process-wide state.
//!
//! Two sources are supported:
//! - a JSON config file (PascalCase keys, compatible with existing deployments), or
//! - individual values from the command line / environment, in which case a single writable
//!   shard spanning the whole UUID space is assumed.

use crate::constants::{MAX_UUID, MIN_UUID};
use crate::{CoreError, CoreResult};
use holdings_files::Library;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A range of holding identifiers served by this instance.
///
/// Descriptors are reported to clients through `/version` so they can route uploads; range
/// membership is not enforced on writes.
// TODO: refuse PUTs for ids that fall outside every writable shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardDescriptor {
    #[serde(rename = "MinUUID")]
    pub min_uuid: String,
    #[serde(rename = "MaxUUID")]
    pub max_uuid: String,
    #[serde(rename = "Writable")]
    pub writable: bool,
}

impl ShardDescriptor {
    /// The single writable shard covering every identifier.
    pub fn full_range() -> Self {
        Self {
            min_uuid: MIN_UUID.into(),
            max_uuid: MAX_UUID.into(),
            writable: true,
        }
    }
}

/// On-disk shape of the JSON config file.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConfigFile {
    port: u16,
    api_user: String,
    api_key: String,
    library_path: PathBuf,
    #[serde(default)]
    shards: Vec<ShardDescriptor>,
}

/// Server configuration resolved at startup.
///
/// `Debug` redacts the API key.
#[derive(Clone)]
pub struct LibraryConfig {
    port: u16,
    api_user: String,
    api_key: String,
    library_path: PathBuf,
    shards: Vec<ShardDescriptor>,
}

impl fmt::Debug for LibraryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryConfig")
            .field("port", &self.port)
            .field("api_user", &self.api_user)
            .field("api_key", &"[REDACTED]")
            .field("library_path", &self.library_path)
            .field("shards", &self.shards)
            .finish()
    }
}

impl LibraryConfig {
    /// Create a new `LibraryConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the API user or key is empty or the library
    /// path is empty.
    pub fn new(
        port: u16,
        api_user: String,
        api_key: String,
        library_path: PathBuf,
        shards: Vec<ShardDescriptor>,
    ) -> CoreResult<Self> {
        if api_user.trim().is_empty() {
            return Err(CoreError::InvalidConfig("api user cannot be empty".into()));
        }
        if api_key.is_empty() {
            return Err(CoreError::InvalidConfig("api key cannot be empty".into()));
        }
        if library_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "library path cannot be empty".into(),
            ));
        }

        Ok(Self {
            port,
            api_user,
            api_key,
            library_path,
            shards,
        })
    }

    /// Builds a configuration from individual values with the default full-range shard.
    pub fn from_values(
        port: u16,
        api_user: String,
        api_key: String,
        library_path: PathBuf,
    ) -> CoreResult<Self> {
        Self::new(
            port,
            api_user,
            api_key,
            library_path,
            vec![ShardDescriptor::full_range()],
        )
    }

    /// Parses a JSON config document.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let file: ConfigFile = serde_json::from_str(json).map_err(CoreError::ConfigParse)?;
        Self::new(
            file.port,
            file.api_user,
            file.api_key,
            file.library_path,
            file.shards,
        )
    }

    /// Loads a JSON config file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Resolves the configuration from a config file if one is given, else from the values.
    ///
    /// A config file supplies the whole configuration; the individual values are ignored.
    pub fn load(
        config_file: Option<&Path>,
        port: u16,
        api_user: String,
        api_key: String,
        library_path: PathBuf,
    ) -> CoreResult<Self> {
        match config_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config file");
                Self::from_json_file(path)
            }
            None => Self::from_values(port, api_user, api_key, library_path),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn api_user(&self) -> &str {
        &self.api_user
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    pub fn shards(&self) -> &[ShardDescriptor] {
        &self.shards
    }

    /// Creates the library root if needed and opens the storage components over it.
    pub fn open_library(&self) -> CoreResult<Library> {
        std::fs::create_dir_all(&self.library_path).map_err(|source| CoreError::LibraryRoot {
            path: self.library_path.clone(),
            source,
        })?;

        let library = Library::open(&self.library_path)?;
        tracing::info!(root = %library.root().display(), "library opened");
        Ok(library)
    }
}
