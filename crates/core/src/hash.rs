//! Content hashes used as submission identities and object keys.
//!
//! Every hash is a lowercase hex SHA-1 digest. Submissions are looked up by
//! prefix, so the prefix type carries the length and alphabet rules.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};
use thiserror::Error;

/// Length of a full hex-encoded digest.
pub const HASH_HEX_LEN: usize = 40;

/// Shortest accepted lookup prefix, also the length of public short ids.
pub const MIN_PREFIX_LEN: usize = 10;

/// Rejected hash or prefix text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashFormatError {
    /// Length outside the accepted range.
    #[error("hash must be between {min} and {max} hex characters, got {len}")]
    Length {
        /// Length of the input.
        len: usize,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Input contains a character outside `[0-9a-fA-F]`.
    #[error("hash contains non-hex character {0:?}")]
    NonHex(char),
}

/// Returns true if every character is a hex digit.
#[must_use]
pub fn is_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

fn validate(input: &str, min: usize, max: usize) -> Result<String, HashFormatError> {
    let len = input.len();
    if len < min || len > max {
        return Err(HashFormatError::Length { len, min, max });
    }
    if let Some(c) = input.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HashFormatError::NonHex(c));
    }
    Ok(input.to_ascii_lowercase())
}

/// Full 40-character lowercase hex SHA-1 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes a single byte slice.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self::digest_parts([data])
    }

    /// Hashes the concatenation of all parts, without separators.
    #[must_use]
    pub fn digest_parts<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the public short id (first 10 hex characters).
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..MIN_PREFIX_LEN]
    }

    /// Returns true if this hash begins with the prefix.
    #[must_use]
    pub fn starts_with(&self, prefix: &HashPrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

impl FromStr for ContentHash {
    type Err = HashFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s, HASH_HEX_LEN, HASH_HEX_LEN).map(Self)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated lookup prefix: 10 to 40 hex characters, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashPrefix(String);

impl HashPrefix {
    /// Parses and normalizes a prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 10 to 40 hex characters.
    pub fn parse(input: &str) -> Result<Self, HashFormatError> {
        validate(input, MIN_PREFIX_LEN, HASH_HEX_LEN).map(Self)
    }

    /// Returns the prefix string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ContentHash> for HashPrefix {
    fn from(hash: &ContentHash) -> Self {
        Self(hash.0.clone())
    }
}

impl fmt::Display for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
