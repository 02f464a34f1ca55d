//! Stream error types

use craftkit_core::CoreError;
use thiserror::Error;

use crate::seek::SeekMode;

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors raised by [`ByteWriter`](crate::ByteWriter) and
/// [`ByteReader`](crate::ByteReader)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// A read ran past the end of the buffer
    #[error("Read of {requested} bytes at offset {offset} exceeds stream length {length}")]
    Bounds {
        /// Cursor position when the read started
        offset: usize,
        /// Bytes requested
        requested: usize,
        /// Total stream length
        length: usize,
    },

    /// A seek was rejected; the cursor did not move
    #[error("Cannot seek {mode:?} by {offset} in stream of length {length}")]
    Seek {
        /// Requested offset
        offset: i64,
        /// Seek origin
        mode: SeekMode,
        /// Total stream length
        length: usize,
    },

    /// A write overflowed the pre-sized buffer
    ///
    /// The buffer is sized from the resource's allocation estimate, so this
    /// means the estimate is stale for the data being written.
    #[error("Write of {requested} bytes at offset {offset} exceeds buffer capacity {capacity}")]
    Allocation {
        /// Cursor position when the write started
        offset: usize,
        /// Bytes requested
        requested: usize,
        /// Pre-sized capacity
        capacity: usize,
    },

    /// Malformed encoded data (e.g. an unterminated variable-length integer)
    #[error("Malformed stream data: {0}")]
    Format(String),

    /// A string does not fit its fixed-size field
    #[error("String of {length} characters does not fit fixed size {size}")]
    StringTooLong {
        /// Character count of the string
        length: usize,
        /// Fixed field size in characters
        size: usize,
    },

    /// Tag lookup failure from the core layer
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StreamError {
    /// Returns true for out-of-bounds reads and rejected seeks
    pub fn is_bounds(&self) -> bool {
        matches!(self, StreamError::Bounds { .. } | StreamError::Seek { .. })
    }

    /// Returns true for unknown enum or resource tags
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, StreamError::Core(CoreError::UnknownType { .. }))
    }
}
