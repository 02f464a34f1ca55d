//! Archive configuration

use craftkit_stream::Endian;

use crate::entry::ENTRY_RECORD_SIZE;

/// Default cap on the number of entries an archive may hold
pub const DEFAULT_MAX_ENTRY_COUNT: u32 = 1 << 24;

/// Largest entry count whose table still fits in a 32-bit file offset
pub const MAX_ENTRY_COUNT: u32 = u32::MAX / ENTRY_RECORD_SIZE as u32;

/// Archive configuration
///
/// Controls byte order of the entry table and trailer, and how saves are
/// flushed to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Byte order of table records and trailer integers (default: big)
    pub endian: Endian,
    /// fsync the file after every save (default: true)
    pub sync_on_save: bool,
    /// Archives declaring more entries than this fail to parse, and `add`
    /// refuses to grow past it
    pub max_entry_count: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            endian: Endian::Big,
            sync_on_save: true,
            max_entry_count: DEFAULT_MAX_ENTRY_COUNT,
        }
    }
}

impl ArchiveConfig {
    /// Create config for testing
    ///
    /// Skips fsync on save.
    pub fn for_testing() -> Self {
        ArchiveConfig {
            sync_on_save: false,
            ..Default::default()
        }
    }

    /// Set byte order
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Set whether saves are fsynced
    pub fn with_sync_on_save(mut self, sync: bool) -> Self {
        self.sync_on_save = sync;
        self
    }

    /// Set the entry count limit
    pub fn with_max_entry_count(mut self, limit: u32) -> Self {
        self.max_entry_count = limit;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entry_count == 0 {
            return Err(ConfigError::ZeroEntryLimit);
        }
        if self.max_entry_count > MAX_ENTRY_COUNT {
            return Err(ConfigError::EntryLimitTooLarge {
                limit: self.max_entry_count,
                max: MAX_ENTRY_COUNT,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An archive must be allowed at least one entry
    #[error("max_entry_count must be non-zero")]
    ZeroEntryLimit,

    /// The entry table could not be addressed
    #[error("max_entry_count {limit} exceeds {max}")]
    EntryLimitTooLarge {
        /// Requested limit
        limit: u32,
        /// Largest addressable limit
        max: u32,
    },
}
