//! Identifier types
//!
//! - Sha1Hash: content address used as the archive lookup key
//! - Guid: small numeric identifier assigned to shipped resources

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Size in bytes of a SHA1 digest
pub const SHA1_SIZE: usize = 20;

/// SHA1 digest of a blob's bytes
///
/// Two blobs with identical bytes always have identical hashes, which is
/// what makes archive entries content-addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Sha1Hash([u8; SHA1_SIZE]);

impl Sha1Hash {
    /// Hash of zero bytes, used as a placeholder value
    pub const EMPTY: Sha1Hash = Sha1Hash([0u8; SHA1_SIZE]);

    /// Compute the SHA1 digest of `data`
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        let mut bytes = [0u8; SHA1_SIZE];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; SHA1_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; SHA1_SIZE] {
        &self.0
    }

    /// Returns true if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Sha1Hash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != SHA1_SIZE * 2 || !s.is_ascii() {
            return Err(CoreError::InvalidHex(s.to_string()));
        }
        let mut bytes = [0u8; SHA1_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| CoreError::InvalidHex(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; SHA1_SIZE]> for Sha1Hash {
    fn from(bytes: [u8; SHA1_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Numeric resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Guid(pub u32);

impl Guid {
    /// Raw identifier value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl From<u32> for Guid {
    fn from(value: u32) -> Self {
        Guid(value)
    }
}
