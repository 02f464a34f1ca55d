//! Compression flags
//!
//! A bitmask fixed for the lifetime of one encode/decode session. The stream
//! consults it on every integer and matrix primitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Per-session compact encoding switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompressionFlags(u8);

impl CompressionFlags {
    /// Everything fixed-width
    pub const NONE: CompressionFlags = CompressionFlags(0);
    /// 32/64-bit integers are written as variable-length quantities
    pub const COMPRESSED_INTEGERS: CompressionFlags = CompressionFlags(0x1);
    /// Carried for compatibility; no primitive interprets it
    pub const COMPRESSED_VECTORS: CompressionFlags = CompressionFlags(0x2);
    /// 4x4 matrices are written as a presence mask plus differing cells
    pub const COMPRESSED_MATRICES: CompressionFlags = CompressionFlags(0x4);
    /// All of the above
    pub const ALL: CompressionFlags = CompressionFlags(0x7);

    /// Wrap a raw flag byte
    pub fn from_bits(bits: u8) -> Self {
        CompressionFlags(bits)
    }

    /// Raw flag byte
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if every bit in `other` is set
    pub fn contains(&self, other: CompressionFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Compact integer encoding is active
    pub fn compressed_integers(&self) -> bool {
        self.contains(Self::COMPRESSED_INTEGERS)
    }

    /// Compact matrix encoding is active
    pub fn compressed_matrices(&self) -> bool {
        self.contains(Self::COMPRESSED_MATRICES)
    }
}

impl BitOr for CompressionFlags {
    type Output = CompressionFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        CompressionFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for CompressionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
