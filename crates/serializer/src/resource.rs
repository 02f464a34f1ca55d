//! Serialization traits
//!
//! - Serializable: anything with a single bidirectional field routine
//! - Resource: a top-level serializable with a kind tag and a size estimate

use std::any::Any;
use std::fmt::Debug;

use craftkit_core::{CompressionFlags, ResourceType, Revision};

use crate::data::SerializationData;
use crate::error::Result;
use crate::serializer::Serializer;

/// A type whose encoding is described by one field routine
///
/// `serialize` visits every field in on-disk order through the session's
/// accessors. Whether it encodes or decodes is decided by the session, so
/// implementations never branch on direction unless the layout itself
/// differs (map keys, for example).
pub trait Serializable {
    /// Visit every field in order
    fn serialize(&mut self, serializer: &mut Serializer) -> Result<()>;

    /// Upper bound on the encoded size in bytes
    fn allocation_size(&self) -> usize;
}

/// Downcast support for boxed resources
pub trait AsAny {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A top-level resource stored as a tagged payload
pub trait Resource: Serializable + AsAny + Debug + Send + Sync {
    /// Kind tag written next to the payload
    fn resource_type(&self) -> ResourceType;

    /// Encode at the given revision and flags
    fn build(&mut self, revision: Revision, flags: CompressionFlags) -> Result<SerializationData> {
        Serializer::build(self, revision, flags)
    }
}

impl dyn Resource {
    /// Downcast a decoded resource to its concrete type
    pub fn downcast_ref<T: Resource + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
