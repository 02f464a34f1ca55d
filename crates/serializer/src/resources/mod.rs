//! Concrete resource codecs

mod palette;
mod type_library;

pub use palette::{Palette, CONVERTED_PLANS_REVISION};
pub use type_library::{
    BoolVariable, FloatVariable, IntegerVariable, ResourceVariable, ScriptVariable,
    ScriptVariableType, StringVariable, TypeLibrary, VectorVariable, Namespace, FLOAT_RANGE_REVISION,
};
