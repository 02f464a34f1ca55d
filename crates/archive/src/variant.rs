//! Archive layout variants
//!
//! The variants differ only in their trailer. All of them end with an entry
//! count and a 4-byte ASCII tag; the newer two add a metadata block ahead
//! of the table and a checksum block after it.
//!
//! | Variant | Tag    | Trailer | Metadata | Reserved word |
//! |---------|--------|---------|----------|---------------|
//! | Farc    | `FARC` | 8       | 0        | no            |
//! | Far4    | `FAR4` | 28      | 132      | no            |
//! | Far5    | `FAR5` | 32      | 172      | yes           |

use std::fmt;

/// Size of the checksum block in the trailer
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the count + tag footer shared by all variants
pub const FOOTER_SIZE: usize = 8;

/// Archive layout variant, identified by the trailing tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveVariant {
    /// `FARC`: table, count, tag
    Farc,
    /// `FAR4`: metadata, table, checksum, count, tag
    Far4,
    /// `FAR5`: metadata, table, checksum, reserved word, count, tag
    Far5,
}

impl ArchiveVariant {
    /// Every variant
    pub const ALL: [ArchiveVariant; 3] = [ArchiveVariant::Farc, ArchiveVariant::Far4, ArchiveVariant::Far5];

    /// Trailing ASCII tag
    pub fn tag(self) -> [u8; 4] {
        match self {
            ArchiveVariant::Farc => *b"FARC",
            ArchiveVariant::Far4 => *b"FAR4",
            ArchiveVariant::Far5 => *b"FAR5",
        }
    }

    /// Variant for a trailing tag
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    /// Bytes after the entry table
    pub fn trailer_size(self) -> usize {
        match self {
            ArchiveVariant::Farc => FOOTER_SIZE,
            ArchiveVariant::Far4 => FOOTER_SIZE + CHECKSUM_SIZE,
            ArchiveVariant::Far5 => FOOTER_SIZE + CHECKSUM_SIZE + 4,
        }
    }

    /// Size of the metadata block preceding the entry table
    pub fn metadata_size(self) -> usize {
        match self {
            ArchiveVariant::Farc => 0,
            ArchiveVariant::Far4 => 0x84,
            ArchiveVariant::Far5 => 0xAC,
        }
    }

    /// Returns true if the trailer carries a checksum block
    pub fn has_checksum(self) -> bool {
        self != ArchiveVariant::Farc
    }

    /// Returns true if the trailer carries the reserved zero word
    pub fn has_reserved_word(self) -> bool {
        self == ArchiveVariant::Far5
    }

    /// Returns true if payloads must end on a 4-byte boundary before metadata
    pub fn aligns_payloads(self) -> bool {
        self.metadata_size() != 0
    }
}

impl fmt::Display for ArchiveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArchiveVariant::Farc => "FARC",
            ArchiveVariant::Far4 => "FAR4",
            ArchiveVariant::Far5 => "FAR5",
        })
    }
}
