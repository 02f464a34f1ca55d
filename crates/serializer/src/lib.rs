//! Symmetric resource serialization for craftkit
//!
//! A resource describes its binary layout once, in a single routine that
//! visits its fields through a [`Serializer`]. The same routine encodes and
//! decodes; the session decides which.
//!
//! - `serializer`: the session, field accessors and dependency capture
//! - `resource`: the [`Serializable`] and [`Resource`] traits
//! - `data`: [`SerializationData`], a finished payload with its metadata
//! - `registry`: resource kind to decoder table
//! - `resources`: concrete resources (palettes, type libraries)
//! - `serializable_fields!`: declarative field lists with revision gates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod data;
pub mod error;
mod macros;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod serializer;

pub use data::SerializationData;
pub use error::{Result, SerializerError};
pub use registry::{DecodeFn, ResourceRegistry};
pub use resource::{AsAny, Resource, Serializable};
pub use resources::{Palette, ScriptVariable, ScriptVariableType, TypeLibrary};
pub use serializer::Serializer;
