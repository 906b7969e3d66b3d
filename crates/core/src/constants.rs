//! Constants used throughout the holdings core crate.
//!
//! Defaults here apply when neither a config file nor an explicit flag supplies a value.

/// Default library root.
pub const DEFAULT_LIBRARY_PATH: &str = "/tmp/library";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default API user for authenticated writes.
pub const DEFAULT_API_USER: &str = "admin";

/// Default API key for authenticated writes.
pub const DEFAULT_API_KEY: &str = "hunter2";

/// Lowest UUID of the catch-all shard used when no config file is given.
pub const MIN_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// Highest UUID of the catch-all shard used when no config file is given.
pub const MAX_UUID: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";
