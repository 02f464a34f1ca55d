//! Numeric tags stored alongside encoded data
//!
//! - ValueEnum: an enum whose variants are identified by a fixed numeric tag
//! - ResourceType: which resource kind a payload decodes to
//! - SerializationType: binary vs. text payload encoding

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// An enum stored on disk as a fixed numeric tag of type `T`
///
/// `from_value` returns `None` on an unregistered tag; readers turn that
/// into [`CoreError::UnknownType`] via [`ValueEnum::try_from_value`].
pub trait ValueEnum<T: Copy + Into<u64>>: Sized + Copy {
    /// Type name used in error messages
    const NAME: &'static str;

    /// Numeric tag of this variant
    fn value(self) -> T;

    /// Variant for a numeric tag
    fn from_value(value: T) -> Option<Self>;

    /// Variant for a numeric tag, or an unknown-type error
    fn try_from_value(value: T) -> Result<Self> {
        Self::from_value(value).ok_or_else(|| CoreError::unknown(Self::NAME, value))
    }
}

/// Resource kind tag
///
/// Covers every kind an archive or reference may name, not only the kinds
/// with a registered codec. References carry the kind of their target, and
/// payloads of a kind without a decoder are recognised but rejected with an
/// unknown-type error at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum ResourceType {
    /// Texture
    Texture = 1,
    /// Mesh
    Mesh = 2,
    /// Animation
    Animation = 5,
    /// GFX material (shader graph)
    GfxMaterial = 7,
    /// Level
    Level = 9,
    /// Script
    Script = 11,
    /// Raw bytes
    FileOfBytes = 13,
    /// Physics material
    Material = 16,
    /// Plan (a saved object)
    Plan = 38,
    /// Palette of plans
    Palette = 43,
    /// Tool-side script type library
    TypeLibrary = 0xF0,
}

impl ResourceType {
    /// All known resource kinds in tag order
    pub const ALL: [ResourceType; 11] = [
        ResourceType::Texture,
        ResourceType::Mesh,
        ResourceType::Animation,
        ResourceType::GfxMaterial,
        ResourceType::Level,
        ResourceType::Script,
        ResourceType::FileOfBytes,
        ResourceType::Material,
        ResourceType::Plan,
        ResourceType::Palette,
        ResourceType::TypeLibrary,
    ];

    /// Parse a stored tag
    pub fn from_tag(tag: u32) -> Result<Self> {
        Self::try_from_value(tag)
    }

    /// Stored tag
    pub fn tag(self) -> u32 {
        self as u32
    }
}

impl ValueEnum<u32> for ResourceType {
    const NAME: &'static str = "ResourceType";

    fn value(self) -> u32 {
        self as u32
    }

    fn from_value(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.tag() == value)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How a resource payload is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SerializationType {
    /// Binary stream (the only kind produced by this library)
    #[default]
    Binary,
    /// Text form
    Text,
    /// Binary stream encrypted at rest
    EncryptedBinary,
}

impl ValueEnum<u8> for SerializationType {
    const NAME: &'static str = "SerializationType";

    fn value(self) -> u8 {
        match self {
            SerializationType::Binary => b'b',
            SerializationType::Text => b't',
            SerializationType::EncryptedBinary => b'e',
        }
    }

    fn from_value(value: u8) -> Option<Self> {
        match value {
            b'b' => Some(SerializationType::Binary),
            b't' => Some(SerializationType::Text),
            b'e' => Some(SerializationType::EncryptedBinary),
            _ => None,
        }
    }
}
