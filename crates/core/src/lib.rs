//! Core types for craftkit
//!
//! This crate defines the foundational types shared by the stream, serializer
//! and archive layers:
//! - Sha1Hash: 20-byte content address of a blob
//! - Guid: small numeric resource identifier
//! - Revision: format version gating optional fields
//! - CompressionFlags: per-session compact encoding switches
//! - ResourceType / SerializationType: tags carried with encoded resources
//! - ResourceReference: a dependency on another resource
//! - ValueEnum: numeric-tag enums that can be read back from a stream
//! - Error: tag lookup failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flags;
pub mod reference;
pub mod resource_type;
pub mod revision;
pub mod types;

pub use error::{CoreError, Result};
pub use flags::CompressionFlags;
pub use reference::{Descriptor, ResourceReference};
pub use resource_type::{ResourceType, SerializationType, ValueEnum};
pub use revision::Revision;
pub use types::{Guid, Sha1Hash, SHA1_SIZE};
