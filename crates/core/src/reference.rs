//! Cross-resource references
//!
//! A resource names its dependencies either by GUID or by content hash. The
//! serializer collects every reference it touches so the archive layer can
//! pack dependencies alongside the resource.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resource_type::ResourceType;
use crate::types::{Guid, Sha1Hash};

/// How a referenced resource is located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Descriptor {
    /// By numeric identifier
    Guid(Guid),
    /// By content hash
    Hash(Sha1Hash),
}

/// A typed dependency on another resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference {
    /// Locator
    pub descriptor: Descriptor,
    /// Kind of the referenced resource
    pub kind: ResourceType,
}

impl ResourceReference {
    /// Reference by GUID
    pub fn guid(guid: impl Into<Guid>, kind: ResourceType) -> Self {
        ResourceReference {
            descriptor: Descriptor::Guid(guid.into()),
            kind,
        }
    }

    /// Reference by content hash
    pub fn hash(hash: Sha1Hash, kind: ResourceType) -> Self {
        ResourceReference {
            descriptor: Descriptor::Hash(hash),
            kind,
        }
    }

    /// GUID if this is a GUID reference
    pub fn as_guid(&self) -> Option<Guid> {
        match self.descriptor {
            Descriptor::Guid(guid) => Some(guid),
            Descriptor::Hash(_) => None,
        }
    }

    /// Hash if this is a hash reference
    pub fn as_hash(&self) -> Option<Sha1Hash> {
        match self.descriptor {
            Descriptor::Hash(hash) => Some(hash),
            Descriptor::Guid(_) => None,
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.descriptor {
            Descriptor::Guid(guid) => write!(f, "{} {}", self.kind, guid),
            Descriptor::Hash(hash) => write!(f, "{} h{}", self.kind, hash),
        }
    }
}
