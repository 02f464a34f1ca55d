//! Encoded resource payload

use serde::{Deserialize, Serialize};

use craftkit_core::{CompressionFlags, ResourceReference, ResourceType, Revision, SerializationType};

/// A finished payload plus everything needed to decode it again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializationData {
    /// Encoded bytes, exactly as long as what was written
    pub buffer: Vec<u8>,
    /// Revision the layout was written at
    pub revision: Revision,
    /// Compression flags the payload was written with
    pub compression_flags: CompressionFlags,
    /// Kind of the encoded resource
    pub resource_type: ResourceType,
    /// Payload encoding
    pub serialization_type: SerializationType,
    /// References found while encoding, first-seen order, no duplicates
    pub dependencies: Vec<ResourceReference>,
}

impl SerializationData {
    /// Size of the encoded bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing was encoded
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
