//! Random placement of agents and periodic particle reseeding

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, ParticleId, ResourceType, TypePair};
use crate::entity::{ConverterAgent, Particle};
use crate::simulation::world::World;

/// Particles exchanged by one reseed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReseedReport {
    pub removed: usize,
    pub added: usize,
}

impl World {
    /// Place `count` converters on random free cells with random distinct types
    pub(crate) fn seed_agents(&mut self, count: usize) {
        let free = self.lattice.cell_count() - self.agent_grid.occupied_count();
        for _ in 0..count.min(free) {
            let kind = self.random_type_pair();
            let position = loop {
                let candidate = self.lattice.random_point(&mut self.rng);
                if !self.agent_grid.is_occupied(&candidate) {
                    break candidate;
                }
            };
            let id = AgentId(self.agents.len() as u32);
            if self.agent_grid.place(&position, id).is_ok() {
                self.agents.push(ConverterAgent::new(id, position, kind));
                self.turn_order.push(id);
            }
        }
    }

    fn random_type_pair(&mut self) -> TypePair {
        let kinds = self.config.resource_kinds();
        let input = kinds[self.rng.below(kinds.len())];
        loop {
            let output = kinds[self.rng.below(kinds.len())];
            if output != input {
                return TypePair::new(input, output);
            }
        }
    }

    fn random_kind(&mut self) -> ResourceType {
        let kinds = self.config.resource_kinds();
        kinds[self.rng.below(kinds.len())]
    }

    /// Refresh particles at the start of a seed cycle.
    ///
    /// Seed 0 fills `population.particles`; later cycles swap a
    /// `reseed_pct` share for fresh random particles.
    pub fn reseed(&mut self) -> ReseedReport {
        if self.seed_count == 0 {
            let added = self.add_random_particles(self.config.population.particles);
            tracing::debug!(added, "initial particle fill");
            return ReseedReport { removed: 0, added };
        }

        let count = self.config.reseed_count().min(self.particles.len());
        let removed = self.remove_random_particles(count);
        let added = self.add_random_particles(removed);
        ReseedReport { removed, added }
    }

    /// Add up to `count` particles of random kind on free cells
    pub(crate) fn add_random_particles(&mut self, count: usize) -> usize {
        let free = self.lattice.cell_count() - self.particle_grid.occupied_count();
        let count = count.min(free);
        for _ in 0..count {
            let kind = self.random_kind();
            let position = loop {
                let candidate = self.lattice.random_point(&mut self.rng);
                if !self.particle_grid.is_occupied(&candidate) {
                    break candidate;
                }
            };
            let id = ParticleId(self.particles.len() as u32);
            if self.particle_grid.place(&position, id).is_ok() {
                self.particles.push(Particle::new(kind, position));
            }
        }
        count
    }

    /// Remove `count` particles picked uniformly at random
    pub(crate) fn remove_random_particles(&mut self, count: usize) -> usize {
        let mut removed = 0;
        for _ in 0..count {
            if self.particles.is_empty() {
                break;
            }
            let id = ParticleId(self.rng.below(self.particles.len()) as u32);
            if self.remove_particle(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Swap-remove a particle and re-point the grid cell of the one moved into its slot
    pub(crate) fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        if id.index() >= self.particles.len() {
            return None;
        }
        let particle = self.particles.swap_remove(id.index());
        self.particle_grid.take(&particle.position);
        if let Some(moved) = self.particles.get(id.index()) {
            self.particle_grid.replace(&moved.position, Some(id));
        }
        Some(particle)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::WorldConfig;
    use crate::core::types::ParticleId;
    use crate::simulation::world::World;

    fn config(particles: usize, reseed_pct: u32) -> WorldConfig {
        let mut config = WorldConfig::default();
        config.space.size = 20;
        config.population.agents = 10;
        config.population.particles = particles;
        config.population.reseed_pct = reseed_pct;
        config
    }

    fn grid_matches(world: &World) -> bool {
        world.particle_grid.occupied_count() == world.particles.len()
            && world
                .particles
                .iter()
                .enumerate()
                .all(|(i, p)| world.particle_grid.get(&p.position) == Some(ParticleId(i as u32)))
    }

    #[test]
    fn test_initial_fill() {
        let mut world = World::new(config(120, 10)).unwrap();
        let report = world.reseed();
        assert_eq!(report.added, 120);
        assert_eq!(report.removed, 0);
        assert_eq!(world.particles.len(), 120);
        assert!(grid_matches(&world));
    }

    #[test]
    fn test_partial_reseed_keeps_count() {
        let mut world = World::new(config(55, 10)).unwrap();
        world.reseed();
        world.seed_count = 1;
        let report = world.reseed();
        assert_eq!(report.removed, 5);
        assert_eq!(report.added, 5);
        assert_eq!(world.particles.len(), 55);
        assert!(grid_matches(&world));
    }

    #[test]
    fn test_full_reseed() {
        let mut world = World::new(config(30, 100)).unwrap();
        world.reseed();
        world.seed_count = 3;
        let report = world.reseed();
        assert_eq!(report.removed, 30);
        assert_eq!(world.particles.len(), 30);
        assert!(grid_matches(&world));
    }

    #[test]
    fn test_remove_particle_repoints_grid() {
        let mut world = World::new(config(10, 0)).unwrap();
        world.reseed();
        let last = world.particles[9].position;
        world.remove_particle(ParticleId(2)).unwrap();
        assert_eq!(world.particle_grid.get(&last), Some(ParticleId(2)));
        assert!(grid_matches(&world));
        assert!(world.remove_particle(ParticleId(40)).is_none());
    }

    #[test]
    fn test_seeded_types_within_configured_kinds() {
        let mut cfg = config(0, 0);
        cfg.population.resource_types = 2;
        let world = World::new(cfg).unwrap();
        for agent in world.agents() {
            assert!(agent.input().index() < 2);
            assert!(agent.output().index() < 2);
            assert_ne!(agent.input(), agent.output());
        }
    }
}
