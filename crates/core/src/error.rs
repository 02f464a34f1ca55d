//! Error types for craftkit core
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for the core layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A stored tag does not map to any known variant
    #[error("Unknown {kind} tag: {value:#x}")]
    UnknownType {
        /// Name of the tagged type (e.g. "ResourceType")
        kind: &'static str,
        /// The raw tag value that was read
        value: u64,
    },

    /// A hex string could not be parsed into a hash
    #[error("Invalid SHA1 hex string: {0}")]
    InvalidHex(String),
}

impl CoreError {
    /// Create an unknown-type error for the given tag kind
    pub fn unknown(kind: &'static str, value: impl Into<u64>) -> Self {
        CoreError::UnknownType {
            kind,
            value: value.into(),
        }
    }
}
