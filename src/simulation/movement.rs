//! Move resolution for particles, single agents and bonded groups

use ahash::AHashSet;

use crate::core::types::{AgentId, ParticleId};
use crate::simulation::acceptance::accept_move;
use crate::simulation::world::World;
use crate::spatial::Coordinates;

/// Static check of a candidate move, before any collision is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellVerdict {
    /// Move is allowed as is
    Free,
    /// Move is forbidden; another candidate may be tried
    Blocked,
    /// A full-degree stranger stands in the way. Severing its weakest bond
    /// would make the move allowed.
    Contested { blocker: AgentId },
}

/// A candidate after collision arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Clear,
    Blocked,
    /// Collision lost; abandon the attempt
    Rejected,
}

/// A bond taken as already severed while checking a move
type Relief = Option<(AgentId, AgentId)>;

impl World {
    /// Shuffled cells next to `from` that are strictly closer to `target`
    fn closer_cells(&mut self, from: &Coordinates, target: &Coordinates) -> Vec<Coordinates> {
        let current = from.distance(target);
        let mut cells = self.lattice.vicinity(from, 1);
        self.rng.shuffle(&mut cells);
        cells.retain(|c| c.distance(target) < current);
        cells
    }

    /// Step a particle one cell towards `target` if a free closer cell exists
    pub fn move_particle_towards(&mut self, id: ParticleId, target: &Coordinates) -> bool {
        let Some(from) = self.particle(id).map(|p| p.position) else {
            return false;
        };
        for cell in self.closer_cells(&from, target) {
            if self.particle_grid.is_occupied(&cell) {
                continue;
            }
            if self.particle_grid.relocate(&from, &cell) {
                self.particles[id.index()].position = cell;
                self.tally.particle_moves += 1;
                return true;
            }
        }
        false
    }

    fn degree_with(&self, id: AgentId, relief: Relief) -> usize {
        let degree = self.agents[id.index()].degree();
        match relief {
            Some((a, b)) if a == id || b == id => degree.saturating_sub(1),
            _ => degree,
        }
    }

    /// The blocker's weakest bond, as the pair a won collision would sever
    fn relief_for(&self, blocker: AgentId) -> Relief {
        self.agent(blocker)
            .and_then(|a| a.weakest_bond(self.seed_count))
            .map(|b| (blocker, b.neighbor))
    }

    /// Whether agent `id` may stand at `candidate`.
    ///
    /// Forbidden when the cell is taken, or when the bonds kept plus the
    /// agents newly in range would exceed the degree cap. A full-degree
    /// stranger in range makes the cell contested, but only when beating
    /// it would actually open the cell; otherwise the cell is blocked.
    pub fn check_cell(&self, id: AgentId, candidate: &Coordinates) -> CellVerdict {
        match self.cell_verdict(id, candidate, None) {
            CellVerdict::Contested { blocker } => {
                let relief = self.relief_for(blocker);
                if relief.is_some() && self.cell_verdict(id, candidate, relief) == CellVerdict::Free {
                    CellVerdict::Contested { blocker }
                } else {
                    CellVerdict::Blocked
                }
            }
            verdict => verdict,
        }
    }

    fn cell_verdict(&self, id: AgentId, candidate: &Coordinates, relief: Relief) -> CellVerdict {
        let Some(agent) = self.agent(id) else {
            return CellVerdict::Blocked;
        };
        if !self.lattice.contains(candidate) || self.agent_grid.is_occupied(candidate) {
            return CellVerdict::Blocked;
        }

        let reach = self.config.space.neighbor_distance;
        let max = self.config.space.max_bonds;
        let preserved = agent
            .neighbors()
            .filter_map(|n| self.position_of(n))
            .filter(|p| p.distance(candidate) <= reach)
            .count();

        let mut gained = 0;
        for other in self.agents_within(candidate, reach) {
            if other == id || agent.has_neighbor(other) {
                continue;
            }
            if self.degree_with(other, relief) >= max {
                return CellVerdict::Contested { blocker: other };
            }
            gained += 1;
        }

        if preserved + gained > max {
            CellVerdict::Blocked
        } else {
            CellVerdict::Free
        }
    }

    /// Whether the bonded group `members` may translate by `delta`.
    ///
    /// Members keep their mutual bonds; each may gain at most its free
    /// slots in new neighbors, so only chain ends can pick up a stranger.
    /// A target cell held by a stranger is blocked.
    pub fn check_group(&self, members: &[AgentId], delta: Coordinates) -> CellVerdict {
        match self.group_verdict(members, delta, None) {
            CellVerdict::Contested { blocker } => {
                let relief = self.relief_for(blocker);
                if relief.is_some() && self.group_verdict(members, delta, relief) == CellVerdict::Free {
                    CellVerdict::Contested { blocker }
                } else {
                    CellVerdict::Blocked
                }
            }
            verdict => verdict,
        }
    }

    fn group_verdict(&self, members: &[AgentId], delta: Coordinates, relief: Relief) -> CellVerdict {
        let reach = self.config.space.neighbor_distance;
        let max = self.config.space.max_bonds;
        let member_set: AHashSet<AgentId> = members.iter().copied().collect();

        for &member in members {
            let Some(agent) = self.agent(member) else {
                return CellVerdict::Blocked;
            };
            let target = agent.position + delta;
            if !self.lattice.contains(&target) {
                return CellVerdict::Blocked;
            }
            if let Some(occupant) = self.agent_grid.get(&target) {
                if !member_set.contains(&occupant) {
                    return CellVerdict::Blocked;
                }
            }

            let mut gained = 0;
            for other in self.agents_within(&target, reach) {
                if member_set.contains(&other) {
                    continue;
                }
                if self.degree_with(other, relief) >= max {
                    return CellVerdict::Contested { blocker: other };
                }
                gained += 1;
            }
            if agent.degree() + gained > max {
                return CellVerdict::Blocked;
            }
        }
        CellVerdict::Free
    }

    /// Fight out a contested verdict; a win always leaves the move allowed
    fn settle(&mut self, mover: AgentId, verdict: CellVerdict) -> Resolution {
        match verdict {
            CellVerdict::Free => Resolution::Clear,
            CellVerdict::Blocked => Resolution::Blocked,
            CellVerdict::Contested { blocker } => {
                if self.arbitrate_collision(mover, blocker) {
                    Resolution::Clear
                } else {
                    Resolution::Rejected
                }
            }
        }
    }

    /// Check a single-agent candidate and settle any collision once
    pub fn resolve_single(&mut self, id: AgentId, candidate: &Coordinates) -> Resolution {
        let verdict = self.check_cell(id, candidate);
        self.settle(id, verdict)
    }

    /// Check a group translation and settle any collision once
    pub fn resolve_group(&mut self, mover: AgentId, members: &[AgentId], delta: Coordinates) -> Resolution {
        let verdict = self.check_group(members, delta);
        self.settle(mover, verdict)
    }

    /// Move one agent, dropping bonds now out of reach and bonding to
    /// every agent in range that has a free slot.
    pub fn relocate_agent(&mut self, id: AgentId, to: &Coordinates) -> bool {
        let Some(from) = self.position_of(id) else {
            return false;
        };
        if !self.agent_grid.relocate(&from, to) {
            return false;
        }
        self.agents[id.index()].position = *to;

        let reach = self.config.space.neighbor_distance;
        let too_far: Vec<AgentId> = self.agents[id.index()]
            .neighbors()
            .filter(|n| {
                self.position_of(*n)
                    .map_or(true, |p| p.distance(to) > reach)
            })
            .collect();
        for neighbor in too_far {
            self.unbond(id, neighbor);
        }

        for other in self.agents_within(to, reach) {
            if other != id {
                self.bond_agents(id, other);
            }
        }
        tracing::trace!(agent = %self.agents[id.index()].short_info(), from = %from, "agent relocated");
        true
    }

    /// Translate a whole bonded group; each chain end may then pick up one
    /// stranger, the first found in shuffled order.
    pub fn apply_group_move(&mut self, members: &[AgentId], delta: Coordinates) {
        for &member in members {
            let position = self.agents[member.index()].position;
            self.agent_grid.take(&position);
        }
        for &member in members {
            let target = self.agents[member.index()].position + delta;
            if self.agent_grid.place(&target, member).is_err() {
                tracing::error!(agent = %member, target = %target, "group move landed on an occupied cell");
            }
            self.agents[member.index()].position = target;
        }

        let reach = self.config.space.neighbor_distance;
        let member_set: AHashSet<AgentId> = members.iter().copied().collect();
        let ends: Vec<AgentId> = members
            .iter()
            .copied()
            .filter(|m| self.agents[m.index()].degree() == 1)
            .collect();
        for end in ends {
            let position = self.agents[end.index()].position;
            let mut cells = self.lattice.vicinity(&position, reach);
            self.rng.shuffle(&mut cells);
            for cell in cells {
                let Some(other) = self.agent_grid.get(&cell) else {
                    continue;
                };
                if other == end || member_set.contains(&other) {
                    continue;
                }
                if self.bond_agents(end, other) {
                    break;
                }
            }
        }
    }

    /// Pull an agent one step towards `target` after it acted.
    ///
    /// A standalone agent follows with chance `1/mass_ratio`. A bonded agent
    /// drags its whole component with a chance shrinking with component
    /// size; an interior agent that misses that draw may still tear off
    /// alone with chance `1/mass_ratio`, subject to energy acceptance.
    pub fn move_agent_towards(&mut self, id: AgentId, target: &Coordinates) -> bool {
        let Some(agent) = self.agent(id) else {
            return false;
        };
        let from = agent.position;
        let degree = agent.degree();
        let single_threshold = 1.0 - self.config.single_move_chance();

        let draw = self.rng.unit();
        let candidates = self.closer_cells(&from, target);

        if degree == 0 {
            if draw <= single_threshold {
                return false;
            }
            return self.step_to_first(id, &candidates, false);
        }

        let members = self.linked_agents(id);
        let group_threshold = 1.0 - self.config.group_move_chance(members.len() - 1);
        if draw > group_threshold {
            return self.group_step_to_first(id, &members, &candidates);
        }
        if degree >= 2 && draw > single_threshold {
            return self.step_to_first(id, &candidates, true);
        }
        false
    }

    /// Take the first allowed candidate. A tear-off is energy-gated, and
    /// the draw happens before any collision is fought over the cell.
    fn step_to_first(&mut self, id: AgentId, candidates: &[Coordinates], tear_off: bool) -> bool {
        let Some(from) = self.position_of(id) else {
            return false;
        };
        let current = if tear_off { self.energy_level(id, &from) } else { 0.0 };

        for candidate in candidates {
            let verdict = self.check_cell(id, candidate);
            if verdict == CellVerdict::Blocked {
                continue;
            }
            if tear_off {
                let delta = self.energy_level(id, candidate) - current;
                if !accept_move(delta, &self.config.motion, &mut self.rng) {
                    continue;
                }
            }
            if self.settle(id, verdict) == Resolution::Rejected {
                return false;
            }
            self.relocate_agent(id, candidate);
            self.tally.agent_moves += 1;
            return true;
        }
        false
    }

    fn group_step_to_first(&mut self, id: AgentId, members: &[AgentId], candidates: &[Coordinates]) -> bool {
        let Some(from) = self.position_of(id) else {
            return false;
        };
        for candidate in candidates {
            let delta = *candidate - from;
            match self.resolve_group(id, members, delta) {
                Resolution::Blocked => continue,
                Resolution::Rejected => return false,
                Resolution::Clear => {
                    self.apply_group_move(members, delta);
                    self.tally.group_moves += 1;
                    tracing::trace!(agent = %id, members = members.len(), delta = %delta, "group moved");
                    return true;
                }
            }
        }
        false
    }

    /// Idle wander to a random adjacent cell.
    ///
    /// A chain end drags its component along (rigid, so tension is
    /// unchanged); anyone else moves alone. Only the first permitted cell
    /// gets an acceptance draw.
    pub fn move_randomly(&mut self, id: AgentId) -> bool {
        let Some(agent) = self.agent(id) else {
            return false;
        };
        let from = agent.position;
        let degree = agent.degree();
        let mut cells = self.lattice.surface(&from, 1);
        self.rng.shuffle(&mut cells);

        if degree == 1 {
            let members = self.linked_agents(id);
            return self.group_step_to_first(id, &members, &cells);
        }

        let current = self.energy_level(id, &from);
        for candidate in &cells {
            let verdict = self.check_cell(id, candidate);
            if verdict == CellVerdict::Blocked {
                continue;
            }
            let delta = self.energy_level(id, candidate) - current;
            if !accept_move(delta, &self.config.motion, &mut self.rng) {
                return false;
            }
            if self.settle(id, verdict) == Resolution::Rejected {
                return false;
            }
            self.relocate_agent(id, candidate);
            self.tally.agent_moves += 1;
            return true;
        }
        false
    }
}
