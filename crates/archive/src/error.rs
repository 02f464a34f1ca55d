//! Archive error types

use std::io;
use std::path::PathBuf;

use craftkit_stream::StreamError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors raised by archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not hold a well-formed archive
    #[error("Malformed archive: {0}")]
    Format(String),

    /// The archive failed to parse on open and cannot be used
    #[error("Archive not parsed: {}", path.display())]
    NotParsed {
        /// Archive location
        path: PathBuf,
    },

    /// Invalid configuration
    #[error("Invalid archive config: {0}")]
    Config(#[from] ConfigError),

    /// The archive already holds the configured maximum entry count
    #[error("Entry limit reached: {limit}")]
    EntryLimit {
        /// Configured maximum
        limit: u32,
    },

    /// An archive set already holds this path
    #[error("Archive already loaded: {}", path.display())]
    AlreadyLoaded {
        /// Archive location
        path: PathBuf,
    },

    /// An archive set does not hold this path
    #[error("Archive not loaded: {}", path.display())]
    NotLoaded {
        /// Archive location
        path: PathBuf,
    },
}

impl From<StreamError> for ArchiveError {
    fn from(err: StreamError) -> Self {
        ArchiveError::Format(err.to_string())
    }
}

impl ArchiveError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ArchiveError::Format(msg.into())
    }
}
