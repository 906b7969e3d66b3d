//! HTTP Basic authentication for write endpoints.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

/// Credentials carried by an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub key: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user", &self.user)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl BasicCredentials {
    /// Parses the value of an `Authorization` header.
    ///
    /// Returns `None` for any other scheme, malformed base64, non UTF-8 payloads or a payload
    /// without a `:` separator.
    pub fn from_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, key) = decoded.split_once(':')?;

        Some(Self {
            user: user.to_string(),
            key: key.to_string(),
        })
    }

    /// Encodes the credentials as an `Authorization` header value.
    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.user, self.key)))
    }
}

/// The configured user and key that write requests must present.
#[derive(Clone)]
pub struct CredentialCheck {
    user: String,
    key: String,
}

impl CredentialCheck {
    pub fn new(user: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            key: key.into(),
        }
    }

    /// Returns true if both user and key match. Both comparisons always run.
    pub fn verify(&self, provided: &BasicCredentials) -> bool {
        let user_ok = constant_time_eq(&provided.user, &self.user);
        let key_ok = constant_time_eq(&provided.key, &self.key);
        user_ok & key_ok
    }
}

fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(user: &str, key: &str) -> BasicCredentials {
        BasicCredentials {
            user: user.into(),
            key: key.into(),
        }
    }

    #[test]
    fn test_from_header_parses_basic() {
        // admin:hunter2
        let parsed = BasicCredentials::from_header("Basic YWRtaW46aHVudGVyMg==").unwrap();
        assert_eq!(parsed, creds("admin", "hunter2"));
    }

    #[test]
    fn test_from_header_scheme_is_case_insensitive() {
        assert!(BasicCredentials::from_header("basic YWRtaW46aHVudGVyMg==").is_some());
    }

    #[test]
    fn test_from_header_key_may_contain_colon() {
        let header = creds("admin", "a:b").to_header();
        assert_eq!(
            BasicCredentials::from_header(&header).unwrap(),
            creds("admin", "a:b")
        );
    }

    #[test]
    fn test_from_header_rejects_malformed() {
        assert!(BasicCredentials::from_header("Bearer abc").is_none());
        assert!(BasicCredentials::from_header("Basic !!!").is_none());
        // "nocolon"
        assert!(BasicCredentials::from_header("Basic bm9jb2xvbg==").is_none());
        assert!(BasicCredentials::from_header("").is_none());
    }

    #[test]
    fn test_verify() {
        let check = CredentialCheck::new("admin", "hunter2");

        assert!(check.verify(&creds("admin", "hunter2")));
        assert!(!check.verify(&creds("admin", "hunter3")));
        assert!(!check.verify(&creds("root", "hunter2")));
        assert!(!check.verify(&creds("admin", "hunter22")));
        assert!(!check.verify(&creds("", "")));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", creds("admin", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
