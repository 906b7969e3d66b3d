//! Implementation of the holding identifier.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Length in bytes of a canonical holding identifier.
pub const HOLDING_ID_LEN: usize = 36;

/// Number of leading hex characters that name a holding's shard directory.
pub const SHARD_PREFIX_LEN: usize = 2;

const DASH_POSITIONS: [usize; 4] = [8, 13, 18, 23];
const VERSION_POSITION: usize = 14;
const VARIANT_POSITION: usize = 19;

/// A validated holding identifier (canonical, lower-case, dashed uuid4).
///
/// Once you have a `HoldingId` you can assume the wrapped value passed the uuid4 check and that
/// deriving a path from it cannot introduce separators or traversal sequences. All
/// externally supplied identifiers (HTTP path segments, CLI arguments) must go through
/// [`HoldingId::parse`] before anything touches the filesystem.
///
/// # Display format
/// Always the lower-case hyphenated form, for example
/// `550e8400-e29b-41d4-a716-446655440000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoldingId(Uuid);

impl Default for HoldingId {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldingId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates an externally supplied identifier.
    ///
    /// Hex digits are matched case-insensitively and the result is canonicalised to lower
    /// case. Hyphenless, braced or URN forms are rejected even though `uuid` itself would
    /// accept them.
    ///
    /// # Errors
    ///
    /// - [`UuidError::InvalidLength`] if `input` is not exactly 36 bytes.
    /// - [`UuidError::InvalidFormat`] if `input` is not a dashed uuid4 with a `4` version
    ///   nibble and a variant nibble in `{8, 9, a, b}`.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if input.len() != HOLDING_ID_LEN {
            return Err(UuidError::InvalidLength {
                input: input.to_owned(),
            });
        }

        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidFormat {
                input: input.to_owned(),
            });
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| UuidError::InvalidFormat {
                input: input.to_owned(),
            })
    }

    /// Returns true if `input` matches the uuid4 pattern.
    ///
    /// This is a purely syntactic, allocation-free check.
    pub fn is_canonical(input: &str) -> bool {
        let bytes = input.as_bytes();
        if bytes.len() != HOLDING_ID_LEN {
            return false;
        }

        bytes.iter().enumerate().all(|(i, b)| match i {
            _ if DASH_POSITIONS.contains(&i) => *b == b'-',
            VERSION_POSITION => *b == b'4',
            VARIANT_POSITION => matches!(b.to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b'),
            _ => b.is_ascii_hexdigit(),
        })
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the shard name: the first two hex characters of the identifier.
    pub fn shard(&self) -> String {
        let canonical = self.to_string();
        canonical[..SHARD_PREFIX_LEN].to_owned()
    }

    /// Returns `parent_dir/<shard>/<id>`.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.to_string();
        parent_dir
            .join(&canonical[..SHARD_PREFIX_LEN])
            .join(&canonical)
    }
}

impl fmt::Display for HoldingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for HoldingId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HoldingId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HoldingId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HoldingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HoldingId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_parse_valid() {
        let id = HoldingId::parse(VALID).unwrap();
        assert_eq!(id.to_string(), VALID);
    }

    #[test]
    fn test_parse_accepts_every_variant_nibble() {
        for variant in ['8', '9', 'a', 'b', 'A', 'B'] {
            let input = format!("550e8400-e29b-41d4-{variant}716-446655440000");
            assert!(HoldingId::parse(&input).is_ok(), "variant {variant} rejected");
        }
    }

    #[test]
    fn test_parse_uppercase_is_lowered() {
        let id = HoldingId::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        assert_eq!(id.to_string(), VALID);
    }

    #[test]
    fn test_parse_wrong_length() {
        for input in ["", "550e8400", "550e8400e29b41d4a716446655440000", &format!("{VALID}0")] {
            assert!(
                matches!(HoldingId::parse(input), Err(UuidError::InvalidLength { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_wrong_version_nibble() {
        let input = "550e8400-e29b-11d4-a716-446655440000";
        assert!(matches!(
            HoldingId::parse(input),
            Err(UuidError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_wrong_variant_nibble() {
        for variant in ['0', '7', 'c', 'f', '|'] {
            let input = format!("550e8400-e29b-41d4-{variant}716-446655440000");
            assert!(
                matches!(HoldingId::parse(&input), Err(UuidError::InvalidFormat { .. })),
                "variant {variant} accepted"
            );
        }
    }

    #[test]
    fn test_parse_rejects_non_hex_and_traversal() {
        for input in [
            "550e8400-e29b-41d4-a716-44665544000g",
            "../../../../../../../../../etc/passw",
            "550e8400_e29b_41d4_a716_446655440000",
            "{50e8400-e29b-41d4-a716-44665544000}",
        ] {
            assert_eq!(input.len(), HOLDING_ID_LEN);
            assert!(
                matches!(HoldingId::parse(input), Err(UuidError::InvalidFormat { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_new_is_canonical() {
        let id = HoldingId::new();
        assert!(HoldingId::is_canonical(&id.to_string()));
    }

    #[test]
    fn test_sharded_dir_layout() {
        let id = HoldingId::parse(VALID).unwrap();
        let dir = id.sharded_dir(Path::new("/srv/library"));
        assert_eq!(dir, PathBuf::from(format!("/srv/library/55/{VALID}")));
        assert_eq!(id.shard(), "55");
    }

    #[test]
    fn test_shared_shard_distinct_holdings() {
        let a = HoldingId::parse("ab0e8400-e29b-41d4-a716-446655440000").unwrap();
        let b = HoldingId::parse("ab9f0000-0000-4000-8000-000000000000").unwrap();
        let root = Path::new("/lib");

        assert_eq!(a.shard(), b.shard());
        assert_eq!(a.sharded_dir(root).parent(), b.sharded_dir(root).parent());
        assert_ne!(a.sharded_dir(root), b.sharded_dir(root));
    }

    #[test]
    fn test_serde_round_trip_and_rejection() {
        let id = HoldingId::parse(VALID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{VALID}\""));

        let back: HoldingId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<HoldingId>("\"not-a-uuid\"").is_err());
    }
}
