//! World - the simulation state container

use serde::{Deserialize, Serialize};

use crate::core::config::WorldConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, ParticleId, ResourceType, SeedCount, TypePair};
use crate::entity::{ConverterAgent, Particle};
use crate::simulation::rng::SimRng;
use crate::spatial::{Coordinates, Lattice, OccupancyGrid};

/// Counters of what happened during the current seed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTally {
    pub actions: u64,
    pub particle_moves: u64,
    pub agent_moves: u64,
    pub group_moves: u64,
    pub idle_moves: u64,
    pub collisions_won: u64,
    pub collisions_lost: u64,
    pub bonds_formed: u64,
    pub bonds_broken: u64,
}

/// Complete simulation state.
///
/// Agents live in an arena indexed by [`AgentId`]; bonds refer to
/// neighbors by id. The two occupancy grids are authoritative for
/// positions and every move goes through them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) lattice: Lattice,
    pub(crate) agents: Vec<ConverterAgent>,
    /// Agent iteration order; reshuffled every turn
    pub(crate) turn_order: Vec<AgentId>,
    pub(crate) agent_grid: OccupancyGrid<AgentId>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) particle_grid: OccupancyGrid<ParticleId>,
    pub(crate) seed_count: SeedCount,
    pub(crate) turn_count: u64,
    /// Rendered shots produced so far; the run-length budget counts these
    pub(crate) output_count: u64,
    pub(crate) tally: CycleTally,
    pub(crate) rng: SimRng,
}

impl World {
    /// Validated world with `population.agents` randomly seeded converters.
    ///
    /// Particles are filled by the first seed cycle.
    pub fn new(config: WorldConfig) -> Result<Self> {
        let mut world = Self::empty(config)?;
        let count = world.config.population.agents;
        world.seed_agents(count);
        tracing::info!(
            agents = world.agents.len(),
            size = world.lattice.size(),
            "World created"
        );
        Ok(world)
    }

    /// Validated world with no agents or particles, for hand-built setups
    pub fn empty(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let lattice = Lattice::new(config.space.size);
        let rng = SimRng::seed_from_u64(config.random_seed);
        Ok(Self {
            lattice,
            agents: Vec::new(),
            turn_order: Vec::new(),
            agent_grid: OccupancyGrid::new(lattice),
            particles: Vec::new(),
            particle_grid: OccupancyGrid::new(lattice),
            seed_count: 0,
            turn_count: 0,
            output_count: 0,
            tally: CycleTally::default(),
            rng,
            config,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn seed_count(&self) -> SeedCount {
        self.seed_count
    }

    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    pub fn output_count(&self) -> u64 {
        self.output_count
    }

    pub fn tally(&self) -> &CycleTally {
        &self.tally
    }

    pub fn agents(&self) -> &[ConverterAgent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&ConverterAgent> {
        self.agents.get(id.index())
    }

    pub fn require_agent(&self, id: AgentId) -> Result<&ConverterAgent> {
        self.agent(id).ok_or(SimError::AgentNotFound(id))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    pub fn agent_at(&self, at: &Coordinates) -> Option<AgentId> {
        self.agent_grid.get(at)
    }

    pub fn particle_at(&self, at: &Coordinates) -> Option<ParticleId> {
        self.particle_grid.get(at)
    }

    pub fn position_of(&self, id: AgentId) -> Option<Coordinates> {
        self.agent(id).map(|a| a.position)
    }

    /// Whether the run-length budget is used up
    pub fn is_finished(&self) -> bool {
        self.output_count >= self.config.output.max_output_count
    }

    /// Swap in new parameters on a resumed world.
    ///
    /// The lattice size cannot change and the bond cap cannot drop below a
    /// degree already present. The RNG stream is kept, so `random_seed`
    /// from `config` has no effect.
    pub fn reconfigure(&mut self, mut config: WorldConfig) -> Result<()> {
        config.validate()?;
        if config.space.size != self.config.space.size {
            return Err(SimError::InvalidConfig(format!(
                "space.size cannot change on resume ({} -> {})",
                self.config.space.size, config.space.size
            )));
        }
        let max_degree = self.agents.iter().map(|a| a.degree()).max().unwrap_or(0);
        if config.space.max_bonds < max_degree {
            return Err(SimError::InvalidConfig(format!(
                "space.max_bonds ({}) is below an existing agent degree ({})",
                config.space.max_bonds, max_degree
            )));
        }
        config.random_seed = self.config.random_seed;
        self.config = config;
        tracing::info!(title = %self.config.title(self.seed_count), "World reconfigured");
        Ok(())
    }

    /// Cross-check arena, grid, turn order and bond ids of a world that
    /// came from outside the engine
    pub fn check_integrity(&self) -> Result<()> {
        for (slot, agent) in self.agents.iter().enumerate() {
            if agent.id.index() != slot {
                return Err(SimError::IncompatibleSnapshot(format!(
                    "agent {} stored in slot {}",
                    agent.id, slot
                )));
            }
            if self.agent_grid.get(&agent.position) != Some(agent.id) {
                return Err(SimError::IncompatibleSnapshot(format!(
                    "grid does not hold agent {} at {}",
                    agent.id, agent.position
                )));
            }
            for neighbor in agent.neighbors() {
                self.require_agent(neighbor)?;
            }
        }
        if self.turn_order.len() != self.agents.len() {
            return Err(SimError::IncompatibleSnapshot(format!(
                "turn order lists {} agents, arena holds {}",
                self.turn_order.len(),
                self.agents.len()
            )));
        }
        for &id in &self.turn_order {
            self.require_agent(id)?;
        }
        Ok(())
    }

    /// Add a converter on a free cell
    pub fn place_agent(&mut self, position: Coordinates, kind: TypePair) -> Result<AgentId> {
        if kind.input == kind.output {
            return Err(SimError::DegenerateConverter(kind));
        }
        if !self.lattice.contains(&position) {
            return Err(SimError::OutOfBounds(position));
        }
        let id = AgentId(self.agents.len() as u32);
        self.agent_grid
            .place(&position, id)
            .map_err(|_| SimError::CellOccupied(position))?;
        self.agents.push(ConverterAgent::new(id, position, kind));
        self.turn_order.push(id);
        Ok(id)
    }

    /// Add a particle on a free cell
    pub fn place_particle(&mut self, position: Coordinates, kind: ResourceType) -> Result<ParticleId> {
        if !self.lattice.contains(&position) {
            return Err(SimError::OutOfBounds(position));
        }
        let id = ParticleId(self.particles.len() as u32);
        self.particle_grid
            .place(&position, id)
            .map_err(|_| SimError::CellOccupied(position))?;
        self.particles.push(Particle::new(kind, position));
        Ok(id)
    }

    /// Agents standing within `radius` of `center`, in lattice order
    pub fn agents_within(&self, center: &Coordinates, radius: u32) -> Vec<AgentId> {
        self.lattice
            .vicinity(center, radius)
            .iter()
            .filter_map(|p| self.agent_grid.get(p))
            .collect()
    }

    /// Particles at exactly `distance` from `center`, in lattice order
    pub fn particles_on_surface(&self, center: &Coordinates, distance: u32) -> Vec<ParticleId> {
        self.lattice
            .surface(center, distance)
            .iter()
            .filter_map(|p| self.particle_grid.get(p))
            .collect()
    }

    /// Tension of `id` standing at `candidate`
    pub fn energy_level(&self, id: AgentId, candidate: &Coordinates) -> f64 {
        match self.agent(id) {
            Some(agent) => {
                agent.energy_level(candidate, self.seed_count, |n| self.position_of(n))
            }
            None => 0.0,
        }
    }

    /// Sum of the agent's bond strengths at the current seed
    pub fn total_bond_strength(&self, id: AgentId) -> f64 {
        self.agent(id)
            .map(|a| a.total_bond_strength(self.seed_count))
            .unwrap_or(0.0)
    }
}
