//! Bond-graph maintenance: paired mutations, traversal, validation

use ahash::AHashSet;
use thiserror::Error;

use crate::core::types::AgentId;
use crate::entity::Bond;
use crate::simulation::world::World;

/// A broken bond-graph invariant found by [`World::validate_bonds`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BondViolation {
    #[error("agent {agent} holds {degree} bonds (max {max})")]
    TooManyBonds { agent: AgentId, degree: usize, max: usize },

    #[error("agent {agent} is bonded to itself")]
    SelfBond { agent: AgentId },

    #[error("agent {agent} lists neighbor {neighbor} more than once")]
    DuplicateBond { agent: AgentId, neighbor: AgentId },

    #[error("agent {agent} points at unknown agent {neighbor}")]
    UnknownNeighbor { agent: AgentId, neighbor: AgentId },

    #[error("bond {agent} -> {neighbor} has no reciprocal record")]
    MissingReciprocal { agent: AgentId, neighbor: AgentId },

    #[error("bond {agent} <-> {neighbor} action counts differ ({left} vs {right})")]
    ActionCountMismatch {
        agent: AgentId,
        neighbor: AgentId,
        left: u64,
        right: u64,
    },
}

impl World {
    /// Create the reciprocal pair of bond records between `a` and `b`.
    ///
    /// Refuses self-bonds, duplicates and agents without a free slot.
    pub fn bond_agents(&mut self, a: AgentId, b: AgentId) -> bool {
        let max = self.config.space.max_bonds;
        let (Some(left), Some(right)) = (self.agent(a), self.agent(b)) else {
            return false;
        };
        if a == b || left.has_neighbor(b) || right.has_neighbor(a) {
            return false;
        }
        if left.degree() >= max || right.degree() >= max {
            return false;
        }

        let seed = self.seed_count;
        self.agents[a.index()].push_bond(Bond::new(b, seed));
        self.agents[b.index()].push_bond(Bond::new(a, seed));
        self.tally.bonds_formed += 1;
        tracing::debug!(%a, %b, seed, "bond formed");
        true
    }

    /// Remove both directed records between `a` and `b`
    pub fn unbond(&mut self, a: AgentId, b: AgentId) -> bool {
        if self.agent(a).is_none() || self.agent(b).is_none() {
            return false;
        }
        let left = self.agents[a.index()].remove_bond(b).is_some();
        let right = self.agents[b.index()].remove_bond(a).is_some();
        if left || right {
            self.tally.bonds_broken += 1;
            tracing::debug!(%a, %b, seed = self.seed_count, "bond broken");
        }
        left || right
    }

    /// Count one producer/consumer hand-off on both halves of a live bond
    pub(crate) fn reinforce_bond(&mut self, a: AgentId, b: AgentId) -> bool {
        let live = self
            .agent(a)
            .zip(self.agent(b))
            .map(|(l, r)| l.has_neighbor(b) && r.has_neighbor(a))
            .unwrap_or(false);
        if !live {
            return false;
        }
        for (owner, other) in [(a, b), (b, a)] {
            if let Some(bond) = self.agents[owner.index()].bond_to_mut(other) {
                bond.action_count += 1;
            }
        }
        true
    }

    /// Every agent reachable through bonds from `start`, `start` first.
    ///
    /// Breadth-first with an explicit visited set.
    pub fn linked_agents(&self, start: AgentId) -> Vec<AgentId> {
        if self.agent(start).is_none() {
            return Vec::new();
        }
        let mut visited = AHashSet::new();
        visited.insert(start);
        let mut order = vec![start];
        let mut cursor = 0;
        while cursor < order.len() {
            let current = order[cursor];
            cursor += 1;
            if let Some(agent) = self.agent(current) {
                for neighbor in agent.neighbors() {
                    if self.agent(neighbor).is_some() && visited.insert(neighbor) {
                        order.push(neighbor);
                    }
                }
            }
        }
        order
    }

    /// Size of the bonded component minus the agent itself
    pub fn linked_count(&self, id: AgentId) -> usize {
        self.linked_agents(id).len().saturating_sub(1)
    }

    /// Check degree caps and reciprocity of every bond record.
    ///
    /// Violations are logged and returned; the world is left untouched.
    pub fn validate_bonds(&self) -> Vec<BondViolation> {
        let max = self.config.space.max_bonds;
        let mut violations = Vec::new();

        for agent in &self.agents {
            let id = agent.id;
            if agent.degree() > max {
                violations.push(BondViolation::TooManyBonds {
                    agent: id,
                    degree: agent.degree(),
                    max,
                });
            }

            let mut seen = AHashSet::new();
            for bond in agent.bonds() {
                let neighbor = bond.neighbor;
                if neighbor == id {
                    violations.push(BondViolation::SelfBond { agent: id });
                    continue;
                }
                if !seen.insert(neighbor) {
                    violations.push(BondViolation::DuplicateBond { agent: id, neighbor });
                    continue;
                }
                let Some(other) = self.agent(neighbor) else {
                    violations.push(BondViolation::UnknownNeighbor { agent: id, neighbor });
                    continue;
                };
                match other.bond_to(id) {
                    None => violations.push(BondViolation::MissingReciprocal { agent: id, neighbor }),
                    Some(back) if back.action_count != bond.action_count && id < neighbor => {
                        violations.push(BondViolation::ActionCountMismatch {
                            agent: id,
                            neighbor,
                            left: bond.action_count,
                            right: back.action_count,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for violation in &violations {
            tracing::error!(seed = self.seed_count, turn = self.turn_count, "{}", violation);
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::types::{ResourceType, TypePair};
    use crate::spatial::Coordinates;

    fn world_with_line(n: i32) -> World {
        let mut config = WorldConfig::default();
        config.space.size = 16;
        config.population.agents = 0;
        config.population.particles = 0;
        let mut world = World::empty(config).unwrap();
        for x in 0..n {
            world
                .place_agent(
                    Coordinates::new([x, 0]),
                    TypePair::new(ResourceType::A, ResourceType::B),
                )
                .unwrap();
        }
        world
    }

    #[test]
    fn test_bond_is_reciprocal() {
        let mut world = world_with_line(2);
        assert!(world.bond_agents(AgentId(0), AgentId(1)));
        assert!(world.agents[0].has_neighbor(AgentId(1)));
        assert!(world.agents[1].has_neighbor(AgentId(0)));
        assert!(!world.bond_agents(AgentId(1), AgentId(0)));
        assert!(world.validate_bonds().is_empty());
    }

    #[test]
    fn test_degree_cap_enforced() {
        let mut world = world_with_line(4);
        assert!(world.bond_agents(AgentId(0), AgentId(1)));
        assert!(world.bond_agents(AgentId(0), AgentId(2)));
        assert!(!world.bond_agents(AgentId(0), AgentId(3)));
        assert_eq!(world.agents[0].degree(), 2);
        assert!(!world.bond_agents(AgentId(3), AgentId(3)));
    }

    #[test]
    fn test_unbond_removes_both_halves() {
        let mut world = world_with_line(2);
        world.bond_agents(AgentId(0), AgentId(1));
        assert!(world.unbond(AgentId(1), AgentId(0)));
        assert_eq!(world.agents[0].degree(), 0);
        assert_eq!(world.agents[1].degree(), 0);
        assert!(!world.unbond(AgentId(0), AgentId(1)));
    }

    #[test]
    fn test_reinforce_updates_both_records() {
        let mut world = world_with_line(2);
        world.bond_agents(AgentId(0), AgentId(1));
        assert!(world.reinforce_bond(AgentId(1), AgentId(0)));
        assert_eq!(world.agents[0].bond_to(AgentId(1)).unwrap().action_count, 2);
        assert_eq!(world.agents[1].bond_to(AgentId(0)).unwrap().action_count, 2);
        assert!(world.validate_bonds().is_empty());
    }

    #[test]
    fn test_reinforce_without_bond_is_noop() {
        let mut world = world_with_line(2);
        assert!(!world.reinforce_bond(AgentId(0), AgentId(1)));
    }

    #[test]
    fn test_linked_agents_walks_component() {
        let mut world = world_with_line(5);
        world.bond_agents(AgentId(0), AgentId(1));
        world.bond_agents(AgentId(1), AgentId(2));
        world.bond_agents(AgentId(3), AgentId(4));

        let mut linked = world.linked_agents(AgentId(2));
        linked.sort();
        assert_eq!(linked, vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert_eq!(world.linked_count(AgentId(4)), 1);
        assert_eq!(world.linked_count(AgentId(0)), 2);
    }

    #[test]
    fn test_linked_agents_terminates_on_ring() {
        let mut world = world_with_line(3);
        world.bond_agents(AgentId(0), AgentId(1));
        world.bond_agents(AgentId(1), AgentId(2));
        world.bond_agents(AgentId(2), AgentId(0));
        assert_eq!(world.linked_agents(AgentId(0)).len(), 3);
    }

    #[test]
    fn test_validate_reports_missing_reciprocal() {
        let mut world = world_with_line(2);
        world.agents[0].push_bond(Bond::new(AgentId(1), 0));
        let violations = world.validate_bonds();
        assert_eq!(
            violations,
            vec![BondViolation::MissingReciprocal {
                agent: AgentId(0),
                neighbor: AgentId(1)
            }]
        );
    }

    #[test]
    fn test_validate_reports_mismatch_once() {
        let mut world = world_with_line(2);
        world.bond_agents(AgentId(0), AgentId(1));
        world.agents[0].bond_to_mut(AgentId(1)).unwrap().action_count = 9;
        let violations = world.validate_bonds();
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], BondViolation::ActionCountMismatch { left: 9, right: 1, .. }));
    }

    #[test]
    fn test_validate_reports_too_many_bonds() {
        let mut world = world_with_line(4);
        world.bond_agents(AgentId(0), AgentId(1));
        world.bond_agents(AgentId(0), AgentId(2));
        world.agents[0].push_bond(Bond::new(AgentId(3), 0));
        world.agents[3].push_bond(Bond::new(AgentId(0), 0));
        let violations = world.validate_bonds();
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], BondViolation::TooManyBonds { degree: 3, .. }));
    }
}
