//! craftkit - binary resource codec and content-addressed archive storage
//!
//! craftkit reads and writes the binary resource files of a family of game
//! titles and the archive containers that ship them.
//!
//! # Quick Start
//!
//! ```ignore
//! use craftkit::{Archive, ArchiveConfig, ArchiveVariant, CompressionFlags, Palette, Resource, Revision};
//!
//! let mut palette = Palette::default();
//! let data = palette.build(Revision::new(0x3e2), CompressionFlags::ALL)?;
//!
//! let mut archive = Archive::create("data.farc", ArchiveVariant::Farc, ArchiveConfig::default())?;
//! let hash = archive.add(&data.buffer)?;
//! archive.save()?;
//! assert_eq!(archive.extract(&hash)?, Some(&data.buffer[..]));
//! ```
//!
//! # Architecture
//!
//! - [`core`]: identifiers, revisions, flags and tags shared by every layer
//! - [`stream`]: exact-byte cursors with the compact encodings
//! - [`serializer`]: symmetric resource codecs on top of the streams
//! - [`archive`]: SHA1-keyed blob storage in a single file

pub use craftkit_archive as archive;
pub use craftkit_core as core;
pub use craftkit_serializer as serializer;
pub use craftkit_stream as stream;

pub use craftkit_archive::{Archive, ArchiveConfig, ArchiveError, ArchiveHandle, ArchiveSet, ArchiveVariant};
pub use craftkit_core::{
    CompressionFlags, Guid, ResourceReference, ResourceType, Revision, SerializationType, Sha1Hash,
};
pub use craftkit_serializer::{
    Palette, Resource, ResourceRegistry, Serializable, SerializationData, Serializer,
    SerializerError, TypeLibrary,
};
pub use craftkit_stream::{ByteReader, ByteWriter, Endian, SeekMode, StreamError};
