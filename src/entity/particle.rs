//! Resource particles

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, ResourceType};
use crate::spatial::Coordinates;

/// Typed token occupying one lattice cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ResourceType,
    pub position: Coordinates,
    /// Agent that produced the current `kind`, if any
    pub last_actor: Option<AgentId>,
}

impl Particle {
    pub fn new(kind: ResourceType, position: Coordinates) -> Self {
        Self {
            kind,
            position,
            last_actor: None,
        }
    }

    /// Re-type the particle as the product of `actor`.
    ///
    /// Returns the previous producer.
    pub fn transform(&mut self, kind: ResourceType, actor: AgentId) -> Option<AgentId> {
        self.kind = kind;
        self.last_actor.replace(actor)
    }
}
