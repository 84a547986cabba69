//! Domain-specific types for local repository inspection.

use std::fmt;

use thiserror::Error;

/// Length of a full SHA-1 object name in hex.
const SHA1_HEX_LEN: usize = 40;

/// Length of a full SHA-256 object name in hex.
const SHA256_HEX_LEN: usize = 64;

/// A value that is not a full, unabbreviated commit hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{value}' is not a full commit hash")]
pub struct InvalidCommitSha {
    /// The rejected value.
    pub value: String,
}

/// A full (non-abbreviated) Git commit SHA.
///
/// GitHub resolves statuses against the exact object name, so short hashes
/// are rejected at construction rather than at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitSha(String);

impl CommitSha {
    /// Parses a full SHA-1 or SHA-256 commit hash, normalising to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommitSha`] when the trimmed value is not 40 or 64
    /// hexadecimal characters.
    ///
    /// # Example
    ///
    /// ```
    /// use beacon::local::CommitSha;
    ///
    /// let sha = CommitSha::parse("0123456789ABCDEF0123456789abcdef01234567")
    ///     .expect("full hash should parse");
    /// assert_eq!(sha.as_str(), "0123456789abcdef0123456789abcdef01234567");
    /// assert!(CommitSha::parse("0123456").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, InvalidCommitSha> {
        let trimmed = value.trim();
        let is_full_length = matches!(trimmed.len(), SHA1_HEX_LEN | SHA256_HEX_LEN);
        if !is_full_length || !trimmed.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(InvalidCommitSha {
                value: value.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CommitSha {
    type Error = InvalidCommitSha;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
