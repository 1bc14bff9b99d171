//! Integration tests for the world engine
//!
//! These tests verify whole seed cycles end-to-end:
//! - Bond-graph invariants hold after every cycle
//! - Occupancy grids agree with agent and particle positions
//! - Reseeding keeps the particle population constant
//! - Agents starved of their input stay idle

use emergent_chains::core::config::WorldConfig;
use emergent_chains::core::types::{ResourceType, TypePair};
use emergent_chains::simulation::World;
use emergent_chains::spatial::Coordinates;
use proptest::prelude::*;

fn small_config(seed: u64) -> WorldConfig {
    let mut config = WorldConfig::default();
    config.random_seed = seed;
    config.space.size = 16;
    config.population.agents = 40;
    config.population.particles = 90;
    config.output.render_period = 1;
    config.output.max_output_count = 1000;
    config
}

fn assert_consistent(world: &World) {
    let max = world.config().space.max_bonds;
    assert!(world.validate_bonds().is_empty(), "{:?}", world.validate_bonds());
    for agent in world.agents() {
        assert!(agent.degree() <= max);
        assert_eq!(world.agent_at(&agent.position), Some(agent.id));
        assert!(world.lattice().contains(&agent.position));
        for neighbor in agent.neighbors() {
            let other = world.agent(neighbor).unwrap();
            assert_eq!(
                agent.bond_to(neighbor).unwrap().action_count,
                other.bond_to(agent.id).unwrap().action_count
            );
        }
    }
    for (index, particle) in world.particles().iter().enumerate() {
        let id = world.particle_at(&particle.position).unwrap();
        assert_eq!(id.index(), index);
    }
}

// ============================================================================
// Invariants over whole runs
// ============================================================================

#[test]
fn test_invariants_hold_over_many_cycles() {
    let mut world = World::new(small_config(7)).unwrap();
    let mut acted = 0;
    for _ in 0..40 {
        let report = world.run_cycle();
        assert_eq!(report.violations, 0);
        acted += report.tally.actions;
        assert_consistent(&world);
    }
    assert_eq!(world.seed_count(), 40);
    assert_eq!(world.agents().len(), 40);
    assert!(acted > 0, "no agent ever consumed a particle");
}

#[test]
fn test_turn_counter_advances_per_turn() {
    let config = small_config(11);
    let turns = config.interaction.turns_per_seed as u64;
    let mut world = World::new(config).unwrap();
    for _ in 0..3 {
        world.run_cycle();
    }
    assert_eq!(world.turn_count(), 3 * turns);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_bond_invariants_for_any_seed(seed in any::<u64>(), max_bonds in 1usize..4) {
        let mut config = small_config(seed);
        config.space.max_bonds = max_bonds;
        let mut world = World::new(config).unwrap();
        for _ in 0..10 {
            world.run_cycle();
            prop_assert!(world.validate_bonds().is_empty());
            for agent in world.agents() {
                prop_assert!(agent.degree() <= max_bonds);
            }
        }
    }
}

// ============================================================================
// Reseeding
// ============================================================================

#[test]
fn test_reseed_swaps_ten_percent() {
    let mut config = small_config(3);
    config.population.agents = 0;
    config.population.particles = 50;
    config.population.reseed_pct = 10;
    let mut world = World::new(config).unwrap();

    let first = world.run_cycle();
    assert_eq!(first.reseed.added, 50);
    assert_eq!(world.particles().len(), 50);

    for _ in 0..5 {
        let report = world.run_cycle();
        assert_eq!(report.reseed.removed, 5);
        assert_eq!(report.reseed.added, 5);
        assert_eq!(world.particles().len(), 50);
    }
    assert_consistent(&world);
}

// ============================================================================
// Idle agents
// ============================================================================

#[test]
fn test_agent_without_its_input_stays_idle() {
    let mut config = small_config(5);
    config.space.size = 5;
    config.population.agents = 0;
    config.population.particles = 0;
    config.motion.idle_wait = 1_000_000;
    let mut world = World::empty(config).unwrap();

    let agent = world
        .place_agent(Coordinates::new([2, 2]), TypePair::new(ResourceType::A, ResourceType::B))
        .unwrap();
    for at in [[1, 2], [3, 2], [2, 1], [2, 3]] {
        world.place_particle(Coordinates::new(at), ResourceType::C).unwrap();
    }

    for cycle in 1..=10 {
        let report = world.run_cycle();
        assert_eq!(report.tally.actions, 0);
        let state = world.agent(agent).unwrap();
        assert_eq!(state.action_count, 0);
        assert_eq!(state.idle_count, cycle);
    }
    assert!(world.particles().iter().all(|p| p.kind == ResourceType::C));
}
