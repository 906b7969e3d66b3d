//! Names of the fixed entries inside a holding directory.

use std::time::Duration;

/// Directory holding the track entries of a holding.
pub const MUSIC_DIR_NAME: &str = "music";

/// File holding the artwork blob of a holding.
pub const ARTWORK_FILE_NAME: &str = "albumart";

/// Zero-byte marker whose presence locks a holding against track writes.
pub const LOCK_FILE_NAME: &str = "lock";

/// Prefix of temporary files staged in a holding directory before being renamed into place.
pub const STAGING_PREFIX: &str = ".upload-";

/// Age after which a staging file is taken to be abandoned by an interrupted write.
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(60 * 60);
