//! Bidirectional serialization session
//!
//! A [`Serializer`] wraps either a [`ByteWriter`] or a [`ByteReader`]. Every
//! field accessor takes `&mut` to the field: when writing, the current value
//! is encoded and left unchanged; when reading, the decoded value is stored
//! into the field. A single `serialize` routine per type therefore defines
//! both directions, and the two can never drift apart.

use rustc_hash::FxHashSet;
use tracing::debug;

use craftkit_core::{
    CompressionFlags, Descriptor, Guid, ResourceReference, ResourceType, Revision,
    SerializationType, Sha1Hash, ValueEnum,
};
use craftkit_stream::{ByteReader, ByteWriter, Endian, Matrix4};

use crate::data::SerializationData;
use crate::error::{Result, SerializerError};
use crate::resource::{Resource, Serializable};

/// Reference tag: no reference
const REFERENCE_NONE: u8 = 0;
/// Reference tag: 20-byte content hash follows
const REFERENCE_HASH: u8 = 1;
/// Reference tag: compressible GUID follows
const REFERENCE_GUID: u8 = 2;

/// Direction of a serialization session
#[derive(Debug)]
enum Stream {
    Writing(ByteWriter),
    Reading(ByteReader),
}

/// Generates a symmetric accessor for a value type the stream handles directly
macro_rules! symmetric {
    ($(#[$doc:meta])* $name:ident: $ty:ty, |$w:ident, $v:ident| $write:expr, |$r:ident| $read:expr) => {
        $(#[$doc])*
        pub fn $name(&mut self, value: &mut $ty) -> Result<()> {
            match &mut self.stream {
                Stream::Writing($w) => {
                    let $v = &*value;
                    $write?;
                }
                Stream::Reading($r) => *value = $read?,
            }
            Ok(())
        }
    };
}

/// A serialization session over one resource payload
#[derive(Debug)]
pub struct Serializer {
    stream: Stream,
    revision: Revision,
    flags: CompressionFlags,
    dependencies: Vec<ResourceReference>,
    seen: FxHashSet<ResourceReference>,
}

impl Serializer {
    /// Start a writing session with a pre-sized buffer
    pub fn writer(capacity: usize, revision: Revision, flags: CompressionFlags) -> Self {
        Self::from_stream(
            Stream::Writing(ByteWriter::with_flags(capacity, flags)),
            revision,
            flags,
        )
    }

    /// Start a reading session over encoded bytes
    pub fn reader(data: impl Into<Vec<u8>>, revision: Revision, flags: CompressionFlags) -> Self {
        Self::from_stream(
            Stream::Reading(ByteReader::with_flags(data, flags)),
            revision,
            flags,
        )
    }

    fn from_stream(stream: Stream, revision: Revision, flags: CompressionFlags) -> Self {
        Serializer {
            stream,
            revision,
            flags,
            dependencies: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Set the byte order of fixed-width fields (builder pattern)
    pub fn with_endian(mut self, endian: Endian) -> Self {
        match &mut self.stream {
            Stream::Writing(w) => w.set_endian(endian),
            Stream::Reading(r) => r.set_endian(endian),
        }
        self
    }

    // === Session state ===

    /// Returns true when encoding
    pub fn is_writing(&self) -> bool {
        matches!(self.stream, Stream::Writing(_))
    }

    /// Format revision the layout is gated on
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Active compression flags
    pub fn flags(&self) -> CompressionFlags {
        self.flags
    }

    /// Cursor position in the underlying stream
    pub fn offset(&self) -> usize {
        match &self.stream {
            Stream::Writing(w) => w.offset(),
            Stream::Reading(r) => r.offset(),
        }
    }

    /// References encountered so far, first-seen order, no duplicates
    pub fn dependencies(&self) -> &[ResourceReference] {
        &self.dependencies
    }

    /// Underlying writer, if encoding
    pub fn writer_mut(&mut self) -> Option<&mut ByteWriter> {
        match &mut self.stream {
            Stream::Writing(w) => Some(w),
            Stream::Reading(_) => None,
        }
    }

    /// Underlying reader, if decoding
    pub fn reader_mut(&mut self) -> Option<&mut ByteReader> {
        match &mut self.stream {
            Stream::Reading(r) => Some(r),
            Stream::Writing(_) => None,
        }
    }

    /// Finish a writing session, packaging the bytes written so far
    pub fn finish(self, resource_type: ResourceType) -> Result<SerializationData> {
        let writer = match self.stream {
            Stream::Writing(w) => w,
            Stream::Reading(_) => return Err(SerializerError::ModeMismatch { expected: "writing" }),
        };
        Ok(SerializationData {
            buffer: writer.into_bytes(),
            revision: self.revision,
            compression_flags: self.flags,
            resource_type,
            serialization_type: SerializationType::Binary,
            dependencies: self.dependencies,
        })
    }

    // === Scalars ===

    symmetric!(
        /// Boolean as one byte
        bool: bool, |w, v| w.bool(*v), |r| r.bool()
    );
    symmetric!(
        /// Signed byte
        i8: i8, |w, v| w.i8(*v), |r| r.i8()
    );
    symmetric!(
        /// Unsigned byte
        u8: u8, |w, v| w.u8(*v), |r| r.u8()
    );
    symmetric!(
        /// Fixed 16-bit signed
        i16: i16, |w, v| w.i16(*v), |r| r.i16()
    );
    symmetric!(
        /// Fixed 16-bit unsigned
        u16: u16, |w, v| w.u16(*v), |r| r.u16()
    );
    symmetric!(
        /// Fixed 24-bit unsigned
        u24: u32, |w, v| w.u24(*v), |r| r.u24()
    );
    symmetric!(
        /// Compressible 32-bit signed
        i32: i32, |w, v| w.i32(*v, false), |r| r.i32(false)
    );
    symmetric!(
        /// 32-bit signed, never compressed
        i32_fixed: i32, |w, v| w.i32(*v, true), |r| r.i32(true)
    );
    symmetric!(
        /// Compressible 32-bit unsigned
        u32: u32, |w, v| w.u32(*v, false), |r| r.u32(false)
    );
    symmetric!(
        /// 32-bit unsigned, never compressed
        u32_fixed: u32, |w, v| w.u32(*v, true), |r| r.u32(true)
    );
    symmetric!(
        /// Compressible 64-bit signed
        i64: i64, |w, v| w.i64(*v, false), |r| r.i64(false)
    );
    symmetric!(
        /// Compressible 64-bit unsigned
        u64: u64, |w, v| w.u64(*v, false), |r| r.u64(false)
    );
    symmetric!(
        /// 32-bit float
        f32: f32, |w, v| w.f32(*v), |r| r.f32()
    );
    symmetric!(
        /// Two floats
        vec2: [f32; 2], |w, v| w.vec2(*v), |r| r.vec2()
    );
    symmetric!(
        /// Three floats
        vec3: [f32; 3], |w, v| w.vec3(*v), |r| r.vec3()
    );
    symmetric!(
        /// Four floats
        vec4: [f32; 4], |w, v| w.vec4(*v), |r| r.vec4()
    );
    symmetric!(
        /// 4x4 matrix, mask-compressed when the matrix flag is set
        matrix: Matrix4, |w, v| w.matrix(v), |r| r.matrix()
    );

    // === Strings and blobs ===

    symmetric!(
        /// Length-prefixed narrow string
        str: String, |w, v| w.str(v), |r| r.str()
    );
    symmetric!(
        /// Length-prefixed UTF-16BE string
        wstr: String, |w, v| w.wstr(v), |r| r.wstr()
    );
    symmetric!(
        /// Length-prefixed byte blob
        bytes: Vec<u8>, |w, v| w.byte_array(v), |r| r.byte_array()
    );

    /// Fixed-size narrow string, NUL padded
    pub fn str_fixed(&mut self, value: &mut String, size: usize) -> Result<()> {
        match &mut self.stream {
            Stream::Writing(w) => w.str_fixed(value, size)?,
            Stream::Reading(r) => *value = r.str_fixed(size)?,
        }
        Ok(())
    }

    /// Fixed-size UTF-16BE string of `size` code units, NUL padded
    pub fn wstr_fixed(&mut self, value: &mut String, size: usize) -> Result<()> {
        match &mut self.stream {
            Stream::Writing(w) => w.wstr_fixed(value, size)?,
            Stream::Reading(r) => *value = r.wstr_fixed(size)?,
        }
        Ok(())
    }

    // === Identifiers and tags ===

    symmetric!(
        /// Raw 20-byte SHA-1
        sha1: Sha1Hash, |w, v| w.sha1(v), |r| r.sha1()
    );
    symmetric!(
        /// Compressible GUID
        guid: Guid, |w, v| w.guid(*v, false), |r| r.guid(false)
    );

    /// One-byte enum tag
    pub fn enum8<T: ValueEnum<u8>>(&mut self, value: &mut T) -> Result<()> {
        match &mut self.stream {
            Stream::Writing(w) => w.enum8(*value)?,
            Stream::Reading(r) => *value = r.enum8()?,
        }
        Ok(())
    }

    /// Four-byte enum tag
    pub fn enum32<T: ValueEnum<u32>>(&mut self, value: &mut T) -> Result<()> {
        match &mut self.stream {
            Stream::Writing(w) => w.enum32(*value)?,
            Stream::Reading(r) => *value = r.enum32()?,
        }
        Ok(())
    }

    // === Arrays ===

    symmetric!(
        /// Counted 16-bit signed array
        i16_array: Vec<i16>, |w, v| w.i16_array(v), |r| r.i16_array()
    );
    symmetric!(
        /// Counted 32-bit signed array
        i32_array: Vec<i32>, |w, v| w.i32_array(v), |r| r.i32_array()
    );
    symmetric!(
        /// Counted 64-bit signed array
        i64_array: Vec<i64>, |w, v| w.i64_array(v), |r| r.i64_array()
    );
    symmetric!(
        /// Counted float array
        f32_array: Vec<f32>, |w, v| w.f32_array(v), |r| r.f32_array()
    );

    /// Element count of a sequence
    ///
    /// Writes `len` and returns it, or reads and returns the stored count.
    /// A negative stored count is malformed data, as is a count larger
    /// than the bytes left to read (every element takes at least one).
    pub fn count(&mut self, len: usize) -> Result<usize> {
        let mut count = i32::try_from(len).map_err(|_| {
            SerializerError::Stream(craftkit_stream::StreamError::Format(format!(
                "sequence length {len} exceeds i32"
            )))
        })?;
        self.i32(&mut count)?;
        let count = usize::try_from(count).map_err(|_| {
            SerializerError::Stream(craftkit_stream::StreamError::Format(format!(
                "negative sequence length {count}"
            )))
        })?;
        if let Stream::Reading(r) = &self.stream {
            if count > r.remaining() {
                return Err(SerializerError::Stream(
                    craftkit_stream::StreamError::Bounds {
                        offset: r.offset(),
                        requested: count,
                        length: r.length(),
                    },
                ));
            }
        }
        Ok(count)
    }

    // === References ===

    /// Optional reference to another resource
    ///
    /// Stored as a tag byte followed by the descriptor. Decoded references
    /// get `kind`, since the stream does not carry it. Every non-empty
    /// reference is recorded as a dependency of the payload.
    pub fn resource(
        &mut self,
        value: &mut Option<ResourceReference>,
        kind: ResourceType,
    ) -> Result<()> {
        match &mut self.stream {
            Stream::Writing(w) => match value {
                None => w.u8(REFERENCE_NONE)?,
                Some(reference) => match reference.descriptor {
                    Descriptor::Hash(hash) => {
                        w.u8(REFERENCE_HASH)?;
                        w.sha1(&hash)?;
                    }
                    Descriptor::Guid(guid) => {
                        w.u8(REFERENCE_GUID)?;
                        w.guid(guid, false)?;
                    }
                },
            },
            Stream::Reading(r) => {
                *value = match r.u8()? {
                    REFERENCE_NONE => None,
                    REFERENCE_HASH => Some(ResourceReference::hash(r.sha1()?, kind)),
                    REFERENCE_GUID => Some(ResourceReference::guid(r.guid(false)?, kind)),
                    tag => {
                        return Err(SerializerError::UnknownType {
                            kind: "ReferenceTag",
                            value: u64::from(tag),
                        })
                    }
                };
            }
        }

        if let Some(reference) = value {
            if self.seen.insert(*reference) {
                self.dependencies.push(*reference);
            }
        }
        Ok(())
    }

    /// Counted list of references
    ///
    /// Empty slots present in the stream are skipped on read.
    pub fn resources(
        &mut self,
        values: &mut Vec<ResourceReference>,
        kind: ResourceType,
    ) -> Result<()> {
        if self.is_writing() {
            self.count(values.len())?;
            for reference in values.iter() {
                let mut slot = Some(*reference);
                self.resource(&mut slot, reference.kind)?;
            }
            return Ok(());
        }

        let count = self.count(0)?;
        values.clear();
        for _ in 0..count {
            let mut slot = None;
            self.resource(&mut slot, kind)?;
            values.extend(slot);
        }
        Ok(())
    }

    // === Nested values ===

    /// Nested structure, serialized in place
    pub fn structure<T: Serializable>(&mut self, value: &mut T) -> Result<()> {
        value.serialize(self)
    }

    /// Nested structure by value
    ///
    /// Reading decodes into `existing` when given, otherwise into a fresh
    /// default instance. Writing encodes `existing`, or the default when
    /// absent. Either way the (possibly updated) instance is returned.
    pub fn value<T: Serializable + Default>(&mut self, existing: Option<T>) -> Result<T> {
        let mut value = existing.unwrap_or_default();
        value.serialize(self)?;
        Ok(value)
    }

    /// Counted list of nested structures
    pub fn array<T: Serializable + Default>(&mut self, values: &mut Vec<T>) -> Result<()> {
        let count = self.count(values.len())?;
        if !self.is_writing() {
            values.clear();
            values.resize_with(count, T::default);
        }
        for value in values.iter_mut() {
            value.serialize(self)?;
        }
        Ok(())
    }

    // === Whole resources ===

    /// Encode a resource into a tagged payload
    ///
    /// The buffer is pre-sized from the resource's allocation estimate; an
    /// estimate that is too small fails with an allocation error.
    pub fn build<R: Resource + ?Sized>(
        resource: &mut R,
        revision: Revision,
        flags: CompressionFlags,
    ) -> Result<SerializationData> {
        let capacity = resource.allocation_size();
        let resource_type = resource.resource_type();
        let mut serializer = Serializer::writer(capacity, revision, flags);
        resource.serialize(&mut serializer)?;
        let data = serializer.finish(resource_type)?;
        debug!(
            target: "craftkit::serializer",
            resource_type = %resource_type,
            revision = %revision,
            capacity,
            size = data.buffer.len(),
            dependencies = data.dependencies.len(),
            "Built resource"
        );
        Ok(data)
    }

    /// Decode a tagged payload as `T`
    pub fn parse<T: Resource + Default>(data: &SerializationData) -> Result<T> {
        let mut value = T::default();
        let expected = value.resource_type();
        if data.resource_type != expected {
            return Err(SerializerError::ResourceMismatch {
                expected,
                actual: data.resource_type,
            });
        }
        let mut serializer = Serializer::open(data)?;
        value.serialize(&mut serializer)?;
        serializer.log_trailing(expected);
        Ok(value)
    }

    /// Start a reading session over a tagged payload
    pub fn open(data: &SerializationData) -> Result<Self> {
        if data.serialization_type != SerializationType::Binary {
            return Err(SerializerError::UnsupportedSerialization(
                data.serialization_type,
            ));
        }
        Ok(Serializer::reader(
            data.buffer.clone(),
            data.revision,
            data.compression_flags,
        ))
    }

    pub(crate) fn log_trailing(&self, resource_type: ResourceType) {
        if let Stream::Reading(r) = &self.stream {
            if !r.is_eof() {
                debug!(
                    target: "craftkit::serializer",
                    resource_type = %resource_type,
                    trailing = r.remaining(),
                    "Payload has trailing bytes"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writing(flags: CompressionFlags) -> Serializer {
        Serializer::writer(256, Revision::new(0x272), flags)
    }

    fn reread(s: Serializer) -> Serializer {
        let flags = s.flags();
        let revision = s.revision();
        let data = s.finish(ResourceType::FileOfBytes).unwrap();
        Serializer::reader(data.buffer, revision, flags)
    }

    #[test]
    fn test_scalar_symmetry() {
        for flags in [CompressionFlags::NONE, CompressionFlags::ALL] {
            let mut s = writing(flags);
            let (mut a, mut b, mut c, mut d) = (-7i32, 300u32, 1.5f32, String::from("plan"));
            s.i32(&mut a).unwrap();
            s.u32(&mut b).unwrap();
            s.f32(&mut c).unwrap();
            s.str(&mut d).unwrap();
            assert_eq!(a, -7);

            let mut s = reread(s);
            let (mut a, mut b, mut c, mut d) = (0i32, 0u32, 0f32, String::new());
            s.i32(&mut a).unwrap();
            s.u32(&mut b).unwrap();
            s.f32(&mut c).unwrap();
            s.str(&mut d).unwrap();
            assert_eq!((a, b, c, d.as_str()), (-7, 300, 1.5, "plan"));
        }
    }

    #[test]
    fn test_fixed_accessors_ignore_flags() {
        let mut s = writing(CompressionFlags::ALL);
        let mut v = 1u32;
        s.u32_fixed(&mut v).unwrap();
        assert_eq!(s.offset(), 4);
    }

    #[test]
    fn test_reference_tags() {
        let hash = Sha1Hash::of(b"texture");
        let mut s = writing(CompressionFlags::ALL);
        let mut none = None;
        let mut by_hash = Some(ResourceReference::hash(hash, ResourceType::Texture));
        let mut by_guid = Some(ResourceReference::guid(300u32, ResourceType::Texture));
        s.resource(&mut none, ResourceType::Texture).unwrap();
        s.resource(&mut by_hash, ResourceType::Texture).unwrap();
        s.resource(&mut by_guid, ResourceType::Texture).unwrap();

        let data = s.finish(ResourceType::Mesh).unwrap();
        assert_eq!(data.buffer[0], REFERENCE_NONE);
        assert_eq!(data.buffer[1], REFERENCE_HASH);
        assert_eq!(data.buffer[22], REFERENCE_GUID);
        assert_eq!(&data.buffer[23..], &[0xAC, 0x02]);
        assert_eq!(data.dependencies.len(), 2);

        let mut s = Serializer::reader(data.buffer, data.revision, data.compression_flags);
        let (mut a, mut b, mut c) = (by_guid, None, None);
        s.resource(&mut a, ResourceType::Texture).unwrap();
        s.resource(&mut b, ResourceType::Texture).unwrap();
        s.resource(&mut c, ResourceType::Texture).unwrap();
        assert_eq!(a, None);
        assert_eq!(b, by_hash);
        assert_eq!(c, by_guid);
    }

    #[test]
    fn test_dependencies_deduplicated_in_first_seen_order() {
        let first = ResourceReference::guid(1u32, ResourceType::Plan);
        let second = ResourceReference::guid(2u32, ResourceType::Plan);
        let mut s = writing(CompressionFlags::NONE);
        let mut refs = vec![first, second, first, second, first];
        s.resources(&mut refs, ResourceType::Plan).unwrap();
        assert_eq!(s.dependencies(), &[first, second]);
    }

    #[test]
    fn test_unknown_reference_tag() {
        let mut s = Serializer::reader(vec![9u8], Revision::default(), CompressionFlags::NONE);
        let mut slot = None;
        let err = s.resource(&mut slot, ResourceType::Plan).unwrap_err();
        assert_eq!(
            err,
            SerializerError::UnknownType {
                kind: "ReferenceTag",
                value: 9
            }
        );
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let mut s = Serializer::reader(
            vec![0xFF, 0xFF, 0xFF, 0xFF],
            Revision::default(),
            CompressionFlags::NONE,
        );
        assert!(matches!(s.count(0), Err(SerializerError::Stream(_))));
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Door {
        id: u32,
        label: String,
        hinge: [f32; 3],
    }

    impl Serializable for Door {
        fn serialize(&mut self, serializer: &mut Serializer) -> Result<()> {
            serializer.u32(&mut self.id)?;
            serializer.str(&mut self.label)?;
            serializer.vec3(&mut self.hinge)
        }

        fn allocation_size(&self) -> usize {
            0x14 + self.label.len()
        }
    }

    #[test]
    fn test_array_and_structure_roundtrip() {
        let doors = vec![
            Door { id: 1, label: "front".into(), hinge: [0.0, 1.0, 0.5] },
            Door { id: 300, label: String::new(), hinge: [2.0; 3] },
        ];
        let frame = Door { id: 7, label: "frame".into(), hinge: [1.0, 0.0, 0.0] };
        for flags in [CompressionFlags::NONE, CompressionFlags::ALL] {
            let mut s = writing(flags);
            let mut list = doors.clone();
            let mut nested = frame.clone();
            s.array(&mut list).unwrap();
            s.structure(&mut nested).unwrap();

            let mut s = reread(s);
            let mut list = vec![Door::default(); 5];
            let mut nested = Door::default();
            s.array(&mut list).unwrap();
            s.structure(&mut nested).unwrap();
            assert_eq!(list, doors);
            assert_eq!(nested, frame);
            assert!(s.reader_mut().unwrap().is_eof());
        }
    }

    #[test]
    fn test_count_beyond_remaining_bytes_is_bounds_error() {
        let mut s = Serializer::reader(
            vec![0x7F, 0xFF, 0xFF, 0xFF, 1, 2],
            Revision::default(),
            CompressionFlags::NONE,
        );
        let mut doors = Vec::<Door>::new();
        let err = s.array(&mut doors).unwrap_err();
        assert!(matches!(
            err,
            SerializerError::Stream(craftkit_stream::StreamError::Bounds {
                offset: 4,
                length: 6,
                ..
            })
        ));
        assert!(doors.is_empty());
    }

    #[test]
    fn test_overflowing_estimate_is_allocation_error() {
        let mut s = Serializer::writer(2, Revision::default(), CompressionFlags::NONE);
        let mut v = 5u32;
        let err = s.u32_fixed(&mut v).unwrap_err();
        assert!(matches!(err, SerializerError::Allocation { capacity: 2, .. }));
    }

    #[test]
    fn test_finish_requires_writing_mode() {
        let s = Serializer::reader(Vec::new(), Revision::default(), CompressionFlags::NONE);
        assert_eq!(
            s.finish(ResourceType::Plan).unwrap_err(),
            SerializerError::ModeMismatch { expected: "writing" }
        );
    }

    #[test]
    fn test_little_endian_session() {
        let mut s = writing(CompressionFlags::NONE).with_endian(Endian::Little);
        let mut v = 0x0102u16;
        s.u16(&mut v).unwrap();
        let data = s.finish(ResourceType::FileOfBytes).unwrap();
        assert_eq!(data.buffer, vec![0x02, 0x01]);
    }
}
