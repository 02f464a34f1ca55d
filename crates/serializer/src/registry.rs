//! Resource kind to decoder mapping
//!
//! Decoding a payload only knows its [`ResourceType`] tag. The registry maps
//! each tag to a routine that decodes into a fresh instance of the concrete
//! type and hands it back boxed. The process-wide registry is built once,
//! on first use, and is immutable afterwards.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::debug;

use craftkit_core::ResourceType;

use crate::data::SerializationData;
use crate::error::{Result, SerializerError};
use crate::resource::Resource;
use crate::resources::{Palette, TypeLibrary};
use crate::serializer::Serializer;

/// Decodes a session into a boxed resource
pub type DecodeFn = fn(&mut Serializer) -> Result<Box<dyn Resource>>;

static GLOBAL: Lazy<ResourceRegistry> = Lazy::new(ResourceRegistry::with_defaults);

fn decode_as<T: Resource + Default + 'static>(serializer: &mut Serializer) -> Result<Box<dyn Resource>> {
    let mut value = T::default();
    value.serialize(serializer)?;
    Ok(Box::new(value))
}

/// Table of decoders keyed by resource kind
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    decoders: FxHashMap<ResourceType, DecodeFn>,
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl ResourceRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every resource this crate implements
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<Palette>(ResourceType::Palette);
        registry.register::<TypeLibrary>(ResourceType::TypeLibrary);
        registry
    }

    /// The process-wide registry
    pub fn global() -> &'static ResourceRegistry {
        &GLOBAL
    }

    /// Map `kind` to a decoder for `T`, replacing any previous mapping
    pub fn register<T: Resource + Default + 'static>(&mut self, kind: ResourceType) {
        self.decoders.insert(kind, decode_as::<T>);
    }

    /// Returns true if `kind` has a decoder
    pub fn contains(&self, kind: ResourceType) -> bool {
        self.decoders.contains_key(&kind)
    }

    /// Registered kinds, in tag order
    pub fn kinds(&self) -> Vec<ResourceType> {
        let mut kinds: Vec<_> = self.decoders.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Decoder for `kind`
    pub fn decoder(&self, kind: ResourceType) -> Result<DecodeFn> {
        self.decoders
            .get(&kind)
            .copied()
            .ok_or(SerializerError::UnknownType {
                kind: "ResourceType",
                value: u64::from(kind.tag()),
            })
    }

    /// Decode a payload by its recorded kind
    pub fn decode(&self, data: &SerializationData) -> Result<Box<dyn Resource>> {
        let decode = self.decoder(data.resource_type)?;
        let mut serializer = Serializer::open(data)?;
        let resource = decode(&mut serializer)?;
        serializer.log_trailing(data.resource_type);
        debug!(
            target: "craftkit::serializer",
            resource_type = %data.resource_type,
            size = data.buffer.len(),
            "Decoded resource"
        );
        Ok(resource)
    }

    /// Decode a payload whose kind is given as a raw tag
    pub fn decode_tagged(&self, tag: u32, data: &SerializationData) -> Result<Box<dyn Resource>> {
        let kind = ResourceType::from_tag(tag)?;
        let decode = self.decoder(kind)?;
        let mut serializer = Serializer::open(data)?;
        decode(&mut serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftkit_core::{CompressionFlags, Revision};

    #[test]
    fn test_defaults_registered() {
        let registry = ResourceRegistry::global();
        assert!(registry.contains(ResourceType::Palette));
        assert!(registry.contains(ResourceType::TypeLibrary));
        assert!(!registry.contains(ResourceType::Mesh));
        assert_eq!(
            registry.kinds(),
            vec![ResourceType::Palette, ResourceType::TypeLibrary]
        );
    }

    #[test]
    fn test_unregistered_kind() {
        let data = SerializationData {
            buffer: vec![],
            revision: Revision::default(),
            compression_flags: CompressionFlags::NONE,
            resource_type: ResourceType::Mesh,
            serialization_type: Default::default(),
            dependencies: vec![],
        };
        let err = ResourceRegistry::new().decode(&data).unwrap_err();
        assert_eq!(
            err,
            SerializerError::UnknownType {
                kind: "ResourceType",
                value: 2
            }
        );
    }

    #[test]
    fn test_unknown_raw_tag() {
        let data = SerializationData {
            buffer: vec![],
            revision: Revision::default(),
            compression_flags: CompressionFlags::NONE,
            resource_type: ResourceType::Mesh,
            serialization_type: Default::default(),
            dependencies: vec![],
        };
        let err = ResourceRegistry::global().decode_tagged(0xDEAD, &data).unwrap_err();
        assert!(matches!(err, SerializerError::UnknownType { value: 0xDEAD, .. }));
    }
}
