//! Entry table records

use craftkit_core::{Sha1Hash, SHA1_SIZE};
use craftkit_stream::{ByteReader, ByteWriter};

use crate::error::Result;

/// Size of one table record: hash, offset, size
pub const ENTRY_RECORD_SIZE: usize = SHA1_SIZE + 4 + 4;

/// One blob stored in an archive
///
/// An entry added since the last save has no file offset yet; its bytes
/// live in the archive's pending queue until `save` places them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    hash: Sha1Hash,
    offset: Option<u32>,
    size: u32,
}

impl Entry {
    pub(crate) fn stored(hash: Sha1Hash, offset: u32, size: u32) -> Self {
        Entry {
            hash,
            offset: Some(offset),
            size,
        }
    }

    pub(crate) fn pending(hash: Sha1Hash, size: u32) -> Self {
        Entry {
            hash,
            offset: None,
            size,
        }
    }

    /// SHA1 of the payload
    pub fn hash(&self) -> Sha1Hash {
        self.hash
    }

    /// File offset of the payload, `None` until saved
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    /// Payload size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns true if the entry was added since the last save
    pub fn is_pending(&self) -> bool {
        self.offset.is_none()
    }

    pub(crate) fn read(reader: &mut ByteReader) -> Result<Self> {
        let hash = reader.sha1()?;
        let offset = reader.u32(true)?;
        let size = reader.u32(true)?;
        Ok(Entry::stored(hash, offset, size))
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter, offset: u32) -> Result<()> {
        writer.sha1(&self.hash)?;
        writer.u32(offset, true)?;
        writer.u32(self.size, true)?;
        Ok(())
    }
}
