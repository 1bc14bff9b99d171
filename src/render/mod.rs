//! Rendering of simulation state to images
//!
//! Provides a visual record of the lattice after a seed cycle.
//! This module is READ-ONLY - it never modifies simulation state.

pub mod colors;
pub mod shot;

use crate::core::types::{ResourceType, SeedCount, TypePair};
use crate::simulation::World;
use crate::spatial::Coordinates;

pub use shot::{render_image, write_png};

/// Lightweight snapshot of an agent for rendering
#[derive(Debug, Clone)]
pub struct AgentView {
    pub position: Coordinates,
    pub kind: TypePair,
    /// Consumed at least one particle this cycle
    pub acted: bool,
    pub bonded_to: Vec<Coordinates>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParticleView {
    pub position: Coordinates,
    pub kind: ResourceType,
}

/// Everything a shot needs, captured once per rendered cycle
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub seed: SeedCount,
    pub size: u32,
    pub title: String,
    pub agents: Vec<AgentView>,
    pub particles: Vec<ParticleView>,
}

impl RenderFrame {
    pub fn capture(world: &World) -> Self {
        let mut agents = Vec::with_capacity(world.agents().len());
        collect_agent_views(world, &mut agents);

        let particles = if world.config().output.render_particles {
            world
                .particles()
                .iter()
                .map(|p| ParticleView {
                    position: p.position,
                    kind: p.kind,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            seed: world.seed_count(),
            size: world.lattice().size().max(0) as u32,
            title: world.config().title(world.seed_count()),
            agents,
            particles,
        }
    }
}

/// Collects all agents into a reusable buffer.
/// Each bond is listed from both ends.
pub fn collect_agent_views(world: &World, buffer: &mut Vec<AgentView>) {
    buffer.clear();

    for agent in world.agents() {
        let bonded_to = agent
            .neighbors()
            .filter_map(|n| world.position_of(n))
            .collect();
        buffer.push(AgentView {
            position: agent.position,
            kind: agent.kind,
            acted: agent.action_count > 0,
            bonded_to,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::types::ResourceType::{A, B, C};

    #[test]
    fn test_capture_is_read_only_copy() {
        let mut config = WorldConfig::default();
        config.space.size = 8;
        config.population.agents = 0;
        config.population.particles = 0;
        let mut world = World::empty(config).unwrap();
        let a = world.place_agent(Coordinates::new([1, 1]), TypePair::new(A, B)).unwrap();
        let b = world.place_agent(Coordinates::new([2, 1]), TypePair::new(B, C)).unwrap();
        world.bond_agents(a, b);
        world.place_particle(Coordinates::new([5, 5]), C).unwrap();
        let before = world.clone();

        let frame = RenderFrame::capture(&world);
        assert_eq!(world, before);
        assert_eq!(frame.size, 8);
        assert_eq!(frame.agents.len(), 2);
        assert_eq!(frame.agents[0].bonded_to, vec![Coordinates::new([2, 1])]);
        assert!(!frame.agents[0].acted);
        assert_eq!(frame.particles.len(), 1);
    }

    #[test]
    fn test_particles_skipped_when_disabled() {
        let mut config = WorldConfig::default();
        config.space.size = 4;
        config.population.agents = 0;
        config.population.particles = 0;
        config.output.render_particles = false;
        let mut world = World::empty(config).unwrap();
        world.place_particle(Coordinates::new([0, 0]), A).unwrap();
        assert!(RenderFrame::capture(&world).particles.is_empty());
    }
}
