//! Resource encode/decode through the public surface

use craftkit_core::{
    CompressionFlags, ResourceReference, ResourceType, Revision, SerializationType, Sha1Hash,
};
use craftkit_serializer::resources::{IntegerVariable, CONVERTED_PLANS_REVISION};
use craftkit_serializer::{
    Palette, Resource, ResourceRegistry, ScriptVariable, Serializable, SerializationData,
    Serializer, SerializerError, TypeLibrary,
};

fn palette() -> Palette {
    let shared = ResourceReference::guid(0x10u32, ResourceType::Plan);
    Palette {
        plans: vec![
            shared,
            ResourceReference::hash(Sha1Hash::of(b"crate"), ResourceType::Plan),
            shared,
        ],
        location: 0x7F00,
        description: 0x7F01,
        converted_plans: vec![shared],
    }
}

#[test]
fn palette_roundtrips_around_the_converted_plans_boundary() {
    for head in [CONVERTED_PLANS_REVISION - 1, CONVERTED_PLANS_REVISION] {
        for flags in [CompressionFlags::NONE, CompressionFlags::ALL] {
            let mut original = palette();
            let data = original.build(Revision::new(head), flags).unwrap();
            assert_eq!(data.resource_type, ResourceType::Palette);
            assert_eq!(data.serialization_type, SerializationType::Binary);
            assert_eq!(data.compression_flags, flags);

            let decoded: Palette = Serializer::parse(&data).unwrap();
            assert_eq!(decoded.plans, original.plans);
            assert_eq!(decoded.location, original.location);
            if head >= CONVERTED_PLANS_REVISION {
                assert_eq!(decoded.converted_plans, original.converted_plans);
            } else {
                assert!(decoded.converted_plans.is_empty());
            }
        }
    }
}

#[test]
fn dependencies_are_first_seen_and_unique() {
    let mut original = palette();
    let data = original
        .build(Revision::new(CONVERTED_PLANS_REVISION), CompressionFlags::ALL)
        .unwrap();
    assert_eq!(
        data.dependencies,
        vec![original.plans[0], original.plans[1]]
    );
}

#[test]
fn compression_shrinks_the_payload() {
    let mut original = palette();
    let revision = Revision::new(CONVERTED_PLANS_REVISION);
    let fixed = original.build(revision, CompressionFlags::NONE).unwrap();
    let compact = original.build(revision, CompressionFlags::ALL).unwrap();
    assert!(compact.len() < fixed.len());
}

#[test]
fn registry_decodes_by_recorded_kind() {
    let mut library = TypeLibrary::default();
    library.insert(
        "game",
        "score",
        ScriptVariable::Integer(IntegerVariable { value: 1000 }),
    );
    let data = library
        .build(Revision::new(0x300), CompressionFlags::ALL)
        .unwrap();

    let decoded = ResourceRegistry::global().decode(&data).unwrap();
    assert_eq!(decoded.resource_type(), ResourceType::TypeLibrary);
    assert_eq!(decoded.downcast_ref::<TypeLibrary>(), Some(&library));
    assert!(decoded.downcast_ref::<Palette>().is_none());
}

#[test]
fn parse_rejects_a_different_kind() {
    let data = palette()
        .build(Revision::new(0x272), CompressionFlags::NONE)
        .unwrap();
    let err = Serializer::parse::<TypeLibrary>(&data).unwrap_err();
    assert_eq!(
        err,
        SerializerError::ResourceMismatch {
            expected: ResourceType::TypeLibrary,
            actual: ResourceType::Palette,
        }
    );
}

#[test]
fn text_payloads_are_unsupported() {
    let mut data = palette()
        .build(Revision::new(0x272), CompressionFlags::NONE)
        .unwrap();
    data.serialization_type = SerializationType::Text;
    assert!(matches!(
        Serializer::parse::<Palette>(&data),
        Err(SerializerError::UnsupportedSerialization(SerializationType::Text))
    ));
}

#[test]
fn truncated_payload_is_a_stream_error() {
    let mut data = palette()
        .build(Revision::new(0x272), CompressionFlags::NONE)
        .unwrap();
    data.buffer.truncate(data.buffer.len() - 1);
    assert!(matches!(
        Serializer::parse::<Palette>(&data),
        Err(SerializerError::Stream(_))
    ));
}

/// A resource whose size estimate ignores its contents
#[derive(Debug, Default)]
struct Undersized {
    blob: Vec<u8>,
}

impl Serializable for Undersized {
    fn serialize(&mut self, serializer: &mut Serializer) -> craftkit_serializer::Result<()> {
        serializer.bytes(&mut self.blob)
    }

    fn allocation_size(&self) -> usize {
        8
    }
}

impl Resource for Undersized {
    fn resource_type(&self) -> ResourceType {
        ResourceType::FileOfBytes
    }
}

#[test]
fn stale_estimate_is_an_allocation_error() {
    let mut fits = Undersized { blob: vec![1, 2, 3] };
    assert!(fits.build(Revision::default(), CompressionFlags::NONE).is_ok());

    let mut overflows = Undersized { blob: vec![0; 64] };
    let err = overflows
        .build(Revision::default(), CompressionFlags::NONE)
        .unwrap_err();
    assert!(matches!(err, SerializerError::Allocation { capacity: 8, .. }));
}

#[test]
fn custom_registry_entries() {
    let mut registry = ResourceRegistry::new();
    registry.register::<Undersized>(ResourceType::FileOfBytes);

    let data = SerializationData {
        buffer: vec![0, 0, 0, 2, 0xAB, 0xCD],
        revision: Revision::default(),
        compression_flags: CompressionFlags::NONE,
        resource_type: ResourceType::FileOfBytes,
        serialization_type: SerializationType::Binary,
        dependencies: Vec::new(),
    };
    let decoded = registry.decode(&data).unwrap();
    let blob = decoded.downcast_ref::<Undersized>().unwrap();
    assert_eq!(blob.blob, vec![0xAB, 0xCD]);
}
