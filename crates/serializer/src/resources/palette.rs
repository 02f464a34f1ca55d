//! Palette: an ordered list of plans shown together in the editor

use serde::{Deserialize, Serialize};

use craftkit_core::{ResourceReference, ResourceType};

use crate::error::Result;
use crate::resource::{Resource, Serializable};
use crate::serializer::Serializer;

/// First head revision that carries the converted plan list
pub const CONVERTED_PLANS_REVISION: u32 = 0x323;

const BASE_ALLOCATION_SIZE: usize = 0x20;
/// Tag byte, 20-byte hash, rounded up
const REFERENCE_ALLOCATION_SIZE: usize = 0x24;

/// A palette of plans
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Palette {
    /// Plans in display order
    pub plans: Vec<ResourceReference>,
    /// Translation key of the palette name
    pub location: i32,
    /// Translation key of the palette description
    pub description: i32,
    /// Plans after format conversion; only present in newer revisions
    pub converted_plans: Vec<ResourceReference>,
}

impl Serializable for Palette {
    fn serialize(&mut self, serializer: &mut Serializer) -> Result<()> {
        serializer.resources(&mut self.plans, ResourceType::Plan)?;
        serializer.i32(&mut self.location)?;
        serializer.i32(&mut self.description)?;
        if serializer.revision().head() >= CONVERTED_PLANS_REVISION {
            serializer.resources(&mut self.converted_plans, ResourceType::Plan)?;
        }
        Ok(())
    }

    fn allocation_size(&self) -> usize {
        BASE_ALLOCATION_SIZE
            + (self.plans.len() + self.converted_plans.len()) * REFERENCE_ALLOCATION_SIZE
    }
}

impl Resource for Palette {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Palette
    }
}
