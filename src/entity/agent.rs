//! Converter agents

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, ResourceType, SeedCount, TypePair};
use crate::entity::bond::Bond;
use crate::spatial::Coordinates;

/// Mobile converter: consumes `kind.input`, emits `kind.output`.
///
/// Bond records are only mutated through the world so that both directed
/// halves stay in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterAgent {
    pub id: AgentId,
    pub position: Coordinates,
    pub kind: TypePair,
    bonds: Vec<Bond>,
    /// Consecutive seed cycles without an action
    pub idle_count: u64,
    /// Actions during the current seed cycle
    pub action_count: u64,
}

impl ConverterAgent {
    pub fn new(id: AgentId, position: Coordinates, kind: TypePair) -> Self {
        Self {
            id,
            position,
            kind,
            bonds: Vec::new(),
            idle_count: 0,
            action_count: 0,
        }
    }

    pub fn input(&self) -> ResourceType {
        self.kind.input
    }

    pub fn output(&self) -> ResourceType {
        self.kind.output
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn degree(&self) -> usize {
        self.bonds.len()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.bonds.iter().map(|b| b.neighbor)
    }

    pub fn has_neighbor(&self, other: AgentId) -> bool {
        self.bonds.iter().any(|b| b.neighbor == other)
    }

    pub fn bond_to(&self, other: AgentId) -> Option<&Bond> {
        self.bonds.iter().find(|b| b.neighbor == other)
    }

    pub(crate) fn bond_to_mut(&mut self, other: AgentId) -> Option<&mut Bond> {
        self.bonds.iter_mut().find(|b| b.neighbor == other)
    }

    pub(crate) fn push_bond(&mut self, bond: Bond) {
        self.bonds.push(bond);
    }

    pub(crate) fn remove_bond(&mut self, other: AgentId) -> Option<Bond> {
        let index = self.bonds.iter().position(|b| b.neighbor == other)?;
        Some(self.bonds.remove(index))
    }

    /// Whether a particle of `kind` can be consumed
    pub fn accepts(&self, kind: ResourceType) -> bool {
        self.kind.input == kind
    }

    pub(crate) fn record_action(&mut self) {
        self.action_count += 1;
        self.idle_count = 0;
    }

    pub fn total_bond_strength(&self, seed: SeedCount) -> f64 {
        self.bonds.iter().map(|b| b.strength(seed)).sum()
    }

    /// Weakest bond; the earliest bond wins ties
    pub fn weakest_bond(&self, seed: SeedCount) -> Option<&Bond> {
        let mut weakest: Option<&Bond> = None;
        for bond in &self.bonds {
            match weakest {
                Some(w) if bond.strength(seed) >= w.strength(seed) => {}
                _ => weakest = Some(bond),
            }
        }
        weakest
    }

    /// Tension of standing at `candidate`: `sum((dist(neighbor, candidate) - 1) * strength)`.
    ///
    /// Bonds that could form at the candidate are ignored.
    pub fn energy_level<F>(&self, candidate: &Coordinates, seed: SeedCount, position_of: F) -> f64
    where
        F: Fn(AgentId) -> Option<Coordinates>,
    {
        self.bonds
            .iter()
            .filter_map(|bond| {
                position_of(bond.neighbor).map(|pos| {
                    (pos.distance(candidate) as f64 - 1.0) * bond.strength(seed)
                })
            })
            .sum()
    }

    /// One-line label for logs: id, type pair and cell
    pub fn short_info(&self) -> String {
        format!("{} {} at {}", self.id, self.kind, self.position)
    }
}
