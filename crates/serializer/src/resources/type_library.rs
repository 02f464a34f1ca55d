//! Type library: script variable declarations grouped by namespace
//!
//! Each variable is stored as its name, a one-byte kind tag and then the
//! kind's own fields. Decoding picks the variable codec from the tag; an
//! unregistered tag fails with an unknown-type error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use craftkit_core::{ResourceReference, ResourceType, Revision, ValueEnum};

use crate::error::Result;
use crate::resource::{Resource, Serializable};
use crate::serializable_fields;
use crate::serializer::Serializer;

/// First head revision that stores a float variable's range
pub const FLOAT_RANGE_REVISION: u32 = 0x300;

const BASE_ALLOCATION_SIZE: usize = 0x10;
/// Count prefix plus string length prefix, both at most five bytes compact
const ENTRY_OVERHEAD: usize = 0x10;

/// Kind tag of a script variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptVariableType {
    /// One-byte boolean
    Bool,
    /// Compressible 32-bit integer
    Integer,
    /// Float with an optional range
    Float,
    /// Four-component vector
    Vector,
    /// Narrow string
    String,
    /// Typed resource reference
    Resource,
}

impl ValueEnum<u8> for ScriptVariableType {
    const NAME: &'static str = "ScriptVariableType";

    fn value(self) -> u8 {
        match self {
            ScriptVariableType::Bool => 0,
            ScriptVariableType::Integer => 1,
            ScriptVariableType::Float => 2,
            ScriptVariableType::Vector => 3,
            ScriptVariableType::String => 4,
            ScriptVariableType::Resource => 5,
        }
    }

    fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(ScriptVariableType::Bool),
            1 => Some(ScriptVariableType::Integer),
            2 => Some(ScriptVariableType::Float),
            3 => Some(ScriptVariableType::Vector),
            4 => Some(ScriptVariableType::String),
            5 => Some(ScriptVariableType::Resource),
            _ => None,
        }
    }
}

/// Boolean variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolVariable {
    /// Initial value
    pub value: bool,
}

serializable_fields! {
    BoolVariable { value: bool }
    alloc = |_this| 1
}

/// Integer variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegerVariable {
    /// Initial value
    pub value: i32,
}

serializable_fields! {
    IntegerVariable { value: i32 }
    alloc = |_this| 5
}

/// Float with an optional editor range
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatVariable {
    /// Initial value
    pub value: f32,
    /// Only stored from [`FLOAT_RANGE_REVISION`] on
    pub min: f32,
    /// Only stored from [`FLOAT_RANGE_REVISION`] on
    pub max: f32,
}

serializable_fields! {
    FloatVariable {
        value: f32,
        min: f32 if |rev: Revision| rev.head() >= FLOAT_RANGE_REVISION,
        max: f32 if |rev: Revision| rev.head() >= FLOAT_RANGE_REVISION,
    }
    alloc = |_this| 12
}

/// Vector variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorVariable {
    /// Initial value
    pub value: [f32; 4],
}

serializable_fields! {
    VectorVariable { value: vec4 }
    alloc = |_this| 16
}

/// String variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringVariable {
    /// Initial value
    pub value: String,
}

serializable_fields! {
    StringVariable { value: str }
    alloc = |this| 5 + this.value.len()
}

/// Reference to another resource; the kind is stored ahead of the reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceVariable {
    /// Kind given to the decoded reference
    pub kind: ResourceType,
    /// Default target, if any
    pub reference: Option<ResourceReference>,
}

impl Default for ResourceVariable {
    fn default() -> Self {
        ResourceVariable {
            kind: ResourceType::Plan,
            reference: None,
        }
    }
}

impl Serializable for ResourceVariable {
    fn serialize(&mut self, serializer: &mut Serializer) -> Result<()> {
        serializer.enum32(&mut self.kind)?;
        let kind = self.kind;
        serializer.resource(&mut self.reference, kind)
    }

    fn allocation_size(&self) -> usize {
        4 + 0x18
    }
}

/// A declared script variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ScriptVariable {
    Bool(BoolVariable),
    Integer(IntegerVariable),
    Float(FloatVariable),
    Vector(VectorVariable),
    String(StringVariable),
    Resource(ResourceVariable),
}

impl ScriptVariable {
    /// Kind tag of this variable
    pub fn kind(&self) -> ScriptVariableType {
        match self {
            ScriptVariable::Bool(_) => ScriptVariableType::Bool,
            ScriptVariable::Integer(_) => ScriptVariableType::Integer,
            ScriptVariable::Float(_) => ScriptVariableType::Float,
            ScriptVariable::Vector(_) => ScriptVariableType::Vector,
            ScriptVariable::String(_) => ScriptVariableType::String,
            ScriptVariable::Resource(_) => ScriptVariableType::Resource,
        }
    }

    /// Decode the fields of a variable of kind `kind`
    pub fn decode(kind: ScriptVariableType, serializer: &mut Serializer) -> Result<Self> {
        Ok(match kind {
            ScriptVariableType::Bool => ScriptVariable::Bool(serializer.value(None)?),
            ScriptVariableType::Integer => ScriptVariable::Integer(serializer.value(None)?),
            ScriptVariableType::Float => ScriptVariable::Float(serializer.value(None)?),
            ScriptVariableType::Vector => ScriptVariable::Vector(serializer.value(None)?),
            ScriptVariableType::String => ScriptVariable::String(serializer.value(None)?),
            ScriptVariableType::Resource => ScriptVariable::Resource(serializer.value(None)?),
        })
    }

    fn fields(&mut self) -> &mut dyn Serializable {
        match self {
            ScriptVariable::Bool(v) => v,
            ScriptVariable::Integer(v) => v,
            ScriptVariable::Float(v) => v,
            ScriptVariable::Vector(v) => v,
            ScriptVariable::String(v) => v,
            ScriptVariable::Resource(v) => v,
        }
    }
}

impl Serializable for ScriptVariable {
    fn serialize(&mut self, serializer: &mut Serializer) -> Result<()> {
        self.fields().serialize(serializer)
    }

    fn allocation_size(&self) -> usize {
        match self {
            ScriptVariable::Bool(v) => v.allocation_size(),
            ScriptVariable::Integer(v) => v.allocation_size(),
            ScriptVariable::Float(v) => v.allocation_size(),
            ScriptVariable::Vector(v) => v.allocation_size(),
            ScriptVariable::String(v) => v.allocation_size(),
            ScriptVariable::Resource(v) => v.allocation_size(),
        }
    }
}

/// Variables of one namespace, keyed by name
pub type Namespace = BTreeMap<String, ScriptVariable>;

/// A library of script variable declarations
///
/// Namespaces and variables are kept sorted by name so the same library
/// always encodes to the same bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeLibrary {
    /// Library name
    pub name: String,
    /// Namespaces by name
    pub namespaces: BTreeMap<String, Namespace>,
}

impl TypeLibrary {
    /// Add or replace a variable
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        variable: ScriptVariable,
    ) -> Option<ScriptVariable> {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .insert(name.into(), variable)
    }

    /// Look up a variable
    pub fn get(&self, namespace: &str, name: &str) -> Option<&ScriptVariable> {
        self.namespaces.get(namespace)?.get(name)
    }

    fn serialize_namespace(serializer: &mut Serializer, namespace: &mut Namespace) -> Result<()> {
        let count = serializer.count(namespace.len())?;
        if serializer.is_writing() {
            for (name, variable) in namespace.iter_mut() {
                let mut name = name.clone();
                let mut kind = variable.kind();
                serializer.str(&mut name)?;
                serializer.enum8(&mut kind)?;
                variable.serialize(serializer)?;
            }
            return Ok(());
        }

        namespace.clear();
        for _ in 0..count {
            let mut name = String::new();
            let mut kind = ScriptVariableType::Bool;
            serializer.str(&mut name)?;
            serializer.enum8(&mut kind)?;
            let variable = ScriptVariable::decode(kind, serializer)?;
            namespace.insert(name, variable);
        }
        Ok(())
    }
}

impl Serializable for TypeLibrary {
    fn serialize(&mut self, serializer: &mut Serializer) -> Result<()> {
        serializer.str(&mut self.name)?;
        let count = serializer.count(self.namespaces.len())?;

        if serializer.is_writing() {
            for (key, namespace) in self.namespaces.iter_mut() {
                let mut key = key.clone();
                serializer.str(&mut key)?;
                Self::serialize_namespace(serializer, namespace)?;
            }
            return Ok(());
        }

        self.namespaces.clear();
        for _ in 0..count {
            let mut key = String::new();
            let mut namespace = Namespace::new();
            serializer.str(&mut key)?;
            Self::serialize_namespace(serializer, &mut namespace)?;
            self.namespaces.insert(key, namespace);
        }
        Ok(())
    }

    fn allocation_size(&self) -> usize {
        let mut size = BASE_ALLOCATION_SIZE + self.name.len();
        for (key, namespace) in &self.namespaces {
            size += ENTRY_OVERHEAD + key.len();
            for (name, variable) in namespace {
                size += ENTRY_OVERHEAD + 1 + name.len() + variable.allocation_size();
            }
        }
        size
    }
}

impl Resource for TypeLibrary {
    fn resource_type(&self) -> ResourceType {
        ResourceType::TypeLibrary
    }
}
