//! Byte cursor streams for craftkit
//!
//! This crate is the exact-byte layer underneath the serializer:
//!
//! - `writer`: [`ByteWriter`], a fixed-capacity producing stream
//! - `reader`: [`ByteReader`], the consuming counterpart
//! - `compact`: variable-length integer and sparse matrix encodings
//! - `endian`: byte order selection on top of `byteorder`
//! - `seek`: bounds-checked cursor movement shared by both streams
//!
//! Both streams apply identical encoding rules, so a value written at
//! position N is read back from position N.
//!
//! # Compact encodings
//!
//! When a session's [`CompressionFlags`] enable them:
//!
//! - 32/64-bit integers become 7-bit-group variable-length quantities
//! - 4x4 matrices become a 16-bit presence mask plus the cells that differ
//!   from identity
//!
//! Forcing fixed width is always available per call.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compact;
pub mod endian;
pub mod error;
pub mod reader;
pub mod seek;
pub mod writer;

pub use compact::{Matrix4, IDENTITY, MAX_ULEB128_LEN, ULEB128_SENTINEL};
pub use craftkit_core::CompressionFlags;
pub use endian::Endian;
pub use error::{Result, StreamError};
pub use reader::ByteReader;
pub use seek::SeekMode;
pub use writer::ByteWriter;
