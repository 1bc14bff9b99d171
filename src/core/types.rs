//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable index of a converter agent in the world's agent arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a particle in the world's particle arena.
///
/// Only valid until the next reseed, which compacts the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

impl ParticleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Seed cycle counter (coarse simulation time unit)
pub type SeedCount = u64;

/// Atomic resource kind carried by a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::A,
        ResourceType::B,
        ResourceType::C,
        ResourceType::D,
        ResourceType::E,
        ResourceType::F,
        ResourceType::G,
    ];

    pub const MAX_KINDS: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Input/output resource pair of a converter ("AB" consumes A, emits B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypePair {
    pub input: ResourceType,
    pub output: ResourceType,
}

impl TypePair {
    pub fn new(input: ResourceType, output: ResourceType) -> Self {
        Self { input, output }
    }

    /// True when this converter's product feeds `next`
    pub fn feeds(self, next: TypePair) -> bool {
        self.output == next.input
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.input, self.output)
    }
}
