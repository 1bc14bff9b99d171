//! One turn: every agent, in shuffled order, tries to act once

use crate::core::types::{AgentId, ParticleId};
use crate::simulation::world::World;

impl World {
    /// Shuffle the agent order and give each agent one action attempt
    pub fn run_turn(&mut self) -> u64 {
        let mut order = std::mem::take(&mut self.turn_order);
        self.rng.shuffle(&mut order);
        let mut acted = 0;
        for &id in &order {
            if self.turn_for_agent(id) {
                acted += 1;
            }
        }
        self.turn_order = order;
        self.turn_count += 1;
        acted
    }

    /// Search surfaces at growing distance; a surface at distance `d` is
    /// only scanned when `|gauss| > d * action_distance_penalty`.
    pub fn turn_for_agent(&mut self, id: AgentId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        let penalty = self.config.interaction.action_distance_penalty;

        for distance in 0..=self.config.interaction.search_distance {
            let threshold = distance as f64 * penalty;
            if self.rng.abs_gaussian() <= threshold {
                continue;
            }
            let mut found = self.particles_on_surface(&position, distance);
            self.rng.shuffle(&mut found);
            for particle in found {
                if self.try_consume(id, particle) {
                    self.move_after_action(id, particle);
                    return true;
                }
            }
        }
        false
    }

    /// Convert a matching particle into the agent's output.
    ///
    /// The bond to the particle's previous producer, if live, gains one
    /// action on both records.
    pub fn try_consume(&mut self, id: AgentId, particle: ParticleId) -> bool {
        let (Some(agent), Some(target)) = (self.agent(id), self.particle(particle)) else {
            return false;
        };
        if !agent.accepts(target.kind) {
            return false;
        }

        let output = agent.output();
        let previous = self.particles[particle.index()].transform(output, id);
        if let Some(producer) = previous.filter(|p| *p != id) {
            if self.reinforce_bond(id, producer) {
                tracing::trace!(consumer = %id, producer = %producer, "hand-off across bond");
            }
        }
        self.agents[id.index()].record_action();
        self.tally.actions += 1;
        true
    }

    /// Pull the particle towards the agent, then the agent towards the
    /// particle unless the particle already sits on the agent's cell.
    fn move_after_action(&mut self, id: AgentId, particle: ParticleId) -> bool {
        let (Some(home), Some(at)) = (
            self.position_of(id),
            self.particle(particle).map(|p| p.position),
        ) else {
            return false;
        };
        if home == at {
            return false;
        }
        self.move_particle_towards(particle, &home);

        let Some(at) = self.particle(particle).map(|p| p.position) else {
            return false;
        };
        if home == at {
            return false;
        }
        self.move_agent_towards(id, &at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::types::{ResourceType, TypePair};
    use crate::simulation::rng::SimRng;
    use crate::spatial::Coordinates;

    use ResourceType::{A, B, C};

    fn lab(size: u32) -> World {
        let mut config = WorldConfig::default();
        config.space.size = size;
        config.population.agents = 0;
        config.population.particles = 0;
        config.population.reseed_pct = 0;
        World::empty(config).unwrap()
    }

    fn at(x: i32, y: i32) -> Coordinates {
        Coordinates::new([x, y])
    }

    fn put(world: &mut World, x: i32, y: i32, input: ResourceType, output: ResourceType) -> AgentId {
        world.place_agent(at(x, y), TypePair::new(input, output)).unwrap()
    }

    /// One A->B converter at (3,3) with A particles at the given cells
    fn search_lab(penalty: f64, search_distance: u32, particles: &[(i32, i32)], seed: u64) -> (World, AgentId) {
        let mut world = lab(10);
        world.config.interaction.action_distance_penalty = penalty;
        world.config.interaction.search_distance = search_distance;
        world.rng = SimRng::seed_from_u64(seed);
        let agent = put(&mut world, 3, 3, A, B);
        for &(x, y) in particles {
            world.place_particle(at(x, y), A).unwrap();
        }
        (world, agent)
    }

    #[test]
    fn test_try_consume_converts_and_reinforces() {
        let mut world = lab(6);
        let a = put(&mut world, 2, 2, A, B);
        let b = put(&mut world, 2, 3, B, C);
        world.bond_agents(a, b);
        let particle = world.place_particle(at(2, 2), A).unwrap();

        assert!(!world.try_consume(b, particle));
        assert!(world.try_consume(a, particle));
        assert_eq!(world.particles()[0].kind, B);
        assert_eq!(world.particles()[0].last_actor, Some(a));

        assert!(world.try_consume(b, particle));
        assert_eq!(world.particles()[0].kind, C);
        assert_eq!(world.agents[a.index()].bond_to(b).unwrap().action_count, 2);
        assert_eq!(world.agents[b.index()].bond_to(a).unwrap().action_count, 2);
        assert_eq!(world.agents[b.index()].action_count, 1);
        assert!(!world.try_consume(b, particle));
    }

    #[test]
    fn test_heavy_penalty_keeps_search_on_own_cell() {
        for seed in 0..20 {
            let (mut world, agent) = search_lab(1000.0, 3, &[(3, 3), (3, 4)], seed);
            assert!(world.turn_for_agent(agent));
            assert_eq!(world.particles()[0].kind, B);
            assert_eq!(world.particles()[1].kind, A);
            assert_eq!(world.tally().actions, 1);
        }
    }

    #[test]
    fn test_heavy_penalty_hides_neighbors() {
        for seed in 0..20 {
            let (mut world, agent) = search_lab(1000.0, 3, &[(3, 4)], seed);
            assert!(!world.turn_for_agent(agent));
            assert_eq!(world.particles()[0].kind, A);
            assert_eq!(world.agents[agent.index()].action_count, 0);
        }
    }

    #[test]
    fn test_search_reaches_exactly_search_distance() {
        let (mut world, agent) = search_lab(0.0, 2, &[(3, 5)], 1);
        assert!(world.turn_for_agent(agent));
        assert_eq!(world.particles()[0].kind, B);
        assert_eq!(world.particles()[0].last_actor, Some(agent));

        let (mut world, agent) = search_lab(0.0, 2, &[(3, 6)], 1);
        assert!(!world.turn_for_agent(agent));
        assert_eq!(world.particles()[0].kind, A);
    }

    #[test]
    fn test_run_turn_counts_actors() {
        let mut world = lab(8);
        put(&mut world, 1, 1, A, B);
        put(&mut world, 6, 6, B, C);
        world.config.interaction.action_distance_penalty = 1000.0;
        world.place_particle(at(1, 1), A).unwrap();

        assert_eq!(world.run_turn(), 1);
        assert_eq!(world.turn_count(), 1);
        assert_eq!(world.turn_order.len(), 2);
    }
}
