//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Checksum`] - Content-derived commit/object identifier
//! - [`RemoteName`] - Validated remote name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use cairn::core::types::{Checksum, RemoteName};
//!
//! // Valid constructions
//! let checksum = Checksum::new(
//!     "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//! ).unwrap();
//! let remote = RemoteName::new("origin").unwrap();
//!
//! // Invalid constructions fail at creation time
//! assert!(Checksum::new("not-a-checksum").is_err());
//! assert!(RemoteName::new("bad:name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    #[error("invalid remote name: {0}")]
    InvalidRemoteName(String),
}

/// A content-derived object identifier.
///
/// Checksums are the canonical identity of a commit or object in the
/// engine's store: 64 hexadecimal characters (SHA-256), normalized to
/// lowercase.
///
/// # Example
///
/// ```
/// use cairn::core::types::Checksum;
///
/// // Create from hex string (normalized to lowercase)
/// let checksum = Checksum::new(
///     "9F86D081884C7D659A2FEAA0C55AD015A3BF4F1B2B0B822CD15D6C15B0F00A08",
/// ).unwrap();
/// assert!(checksum.as_str().starts_with("9f86d081"));
///
/// // Get abbreviated form
/// assert_eq!(checksum.short(8), "9f86d081");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Length of a hex-encoded SHA-256 checksum.
    pub const HEX_LEN: usize = 64;

    /// Create a new validated checksum.
    ///
    /// The checksum is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidChecksum` if the string is not 64 hex
    /// characters.
    pub fn new(checksum: impl Into<String>) -> Result<Self, TypeError> {
        let checksum = checksum.into().to_ascii_lowercase();
        Self::validate(&checksum)?;
        Ok(Self(checksum))
    }

    /// Create a checksum from a raw 32-byte digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get an abbreviated form of the checksum.
    ///
    /// Returns the first `len` characters. If `len` exceeds the checksum
    /// length, returns the full checksum.
    ///
    /// # Example
    ///
    /// ```
    /// use cairn::core::types::Checksum;
    ///
    /// let checksum = Checksum::new(
    ///     "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
    /// ).unwrap();
    /// assert_eq!(checksum.short(12), "9f86d081884c");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate a checksum string.
    fn validate(checksum: &str) -> Result<(), TypeError> {
        if checksum.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidChecksum(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                checksum.len()
            )));
        }
        if !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidChecksum(
                "checksum must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the checksum as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Checksum {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Checksum> for String {
    fn from(checksum: Checksum) -> Self {
        checksum.0
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated remote name.
///
/// Remote names identify a configured transfer source:
/// - Cannot be empty
/// - Cannot contain `:` (reserved as the remote/ref separator) or `/`
/// - Cannot contain whitespace or ASCII control characters
/// - Cannot start with `-`
///
/// # Example
///
/// ```
/// use cairn::core::types::RemoteName;
///
/// let remote = RemoteName::new("origin").unwrap();
/// assert_eq!(remote.as_str(), "origin");
///
/// assert!(RemoteName::new("").is_err());
/// assert!(RemoteName::new("has space").is_err());
/// assert!(RemoteName::new("a:b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Create a new validated remote name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRemoteName` if the name violates the
    /// rules above.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a remote name.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRemoteName(
                "remote name cannot be empty".into(),
            ));
        }

        if name.starts_with('-') {
            return Err(TypeError::InvalidRemoteName(
                "remote name cannot start with '-'".into(),
            ));
        }

        for c in name.chars() {
            if c == ':' || c == '/' {
                return Err(TypeError::InvalidRemoteName(format!(
                    "remote name cannot contain '{c}'"
                )));
            }
            if c.is_whitespace() {
                return Err(TypeError::InvalidRemoteName(
                    "remote name cannot contain whitespace".into(),
                ));
            }
            if c.is_ascii_control() {
                return Err(TypeError::InvalidRemoteName(
                    "remote name cannot contain control characters".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the remote name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteName> for String {
    fn from(name: RemoteName) -> Self {
        name.0
    }
}

impl AsRef<str> for RemoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn checksum_accepts_valid_hex() {
        let checksum = Checksum::new(SAMPLE).unwrap();
        assert_eq!(checksum.as_str(), SAMPLE);
    }

    #[test]
    fn checksum_normalizes_to_lowercase() {
        let checksum = Checksum::new(SAMPLE.to_ascii_uppercase()).unwrap();
        assert_eq!(checksum.as_str(), SAMPLE);
    }

    #[test]
    fn checksum_rejects_wrong_length() {
        assert!(matches!(
            Checksum::new("abc123"),
            Err(TypeError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn checksum_rejects_non_hex() {
        let bad = "z".repeat(Checksum::HEX_LEN);
        assert!(matches!(
            Checksum::new(bad),
            Err(TypeError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn checksum_from_digest_round_trips() {
        let digest = [0xabu8; 32];
        let checksum = Checksum::from_digest(&digest);
        assert_eq!(checksum.as_str(), "ab".repeat(32));
    }

    #[test]
    fn checksum_short_clamps_to_length() {
        let checksum = Checksum::new(SAMPLE).unwrap();
        assert_eq!(checksum.short(8), "9f86d081");
        assert_eq!(checksum.short(1000), SAMPLE);
    }

    #[test]
    fn remote_name_accepts_typical_names() {
        for name in ["origin", "upstream", "mirror-2", "build.cache"] {
            assert!(RemoteName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn remote_name_rejects_invalid_names() {
        for name in ["", "a:b", "a/b", "has space", "-leading", "tab\there"] {
            assert!(
                matches!(RemoteName::new(name), Err(TypeError::InvalidRemoteName(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
