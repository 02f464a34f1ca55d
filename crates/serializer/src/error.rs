//! Serializer error types

use craftkit_core::{CoreError, ResourceType, SerializationType};
use craftkit_stream::StreamError;
use thiserror::Error;

/// Result type alias for serializer operations
pub type Result<T> = std::result::Result<T, SerializerError>;

/// Errors raised while encoding or decoding a resource
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializerError {
    /// The pre-sized output buffer overflowed
    ///
    /// The resource's allocation estimate is stale for the data being
    /// written. This is a schema bug, not a recoverable condition.
    #[error("Allocation estimate exceeded: write of {requested} bytes at offset {offset}, capacity {capacity}")]
    Allocation {
        /// Cursor position when the write started
        offset: usize,
        /// Bytes requested
        requested: usize,
        /// Pre-sized capacity
        capacity: usize,
    },

    /// An unregistered resource kind or enum tag was read
    #[error("Unknown {kind} tag: {value:#x}")]
    UnknownType {
        /// Name of the tagged type
        kind: &'static str,
        /// Raw tag value
        value: u64,
    },

    /// An operation needed the other traversal direction
    #[error("Operation requires a {expected} serializer")]
    ModeMismatch {
        /// "writing" or "reading"
        expected: &'static str,
    },

    /// Data tagged with one resource kind was decoded as another
    #[error("Resource type mismatch: expected {expected}, got {actual}")]
    ResourceMismatch {
        /// Kind of the target type
        expected: ResourceType,
        /// Kind recorded in the data
        actual: ResourceType,
    },

    /// Only binary payloads are handled here
    #[error("Unsupported serialization type: {0:?}")]
    UnsupportedSerialization(SerializationType),

    /// Any other stream failure (bounds, malformed data, string sizes)
    #[error("Stream error: {0}")]
    Stream(StreamError),
}

impl From<StreamError> for SerializerError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Allocation {
                offset,
                requested,
                capacity,
            } => SerializerError::Allocation {
                offset,
                requested,
                capacity,
            },
            StreamError::Core(core) => core.into(),
            other => SerializerError::Stream(other),
        }
    }
}

impl From<CoreError> for SerializerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownType { kind, value } => SerializerError::UnknownType { kind, value },
            other => SerializerError::Stream(StreamError::Core(other)),
        }
    }
}
