//! World configuration with documented defaults
//!
//! Every parameter has a default and may be overridden from a TOML file.
//! Sections mirror the table layout of `data/default_world.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{ResourceType, SeedCount};

/// Largest lattice accepted, 8192 cells on a side in two dimensions
pub const MAX_LATTICE_CELLS: usize = 1 << 26;

/// Complete configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed of the single deterministic random stream
    pub random_seed: u64,
    pub space: SpaceConfig,
    pub population: PopulationConfig,
    pub interaction: InteractionConfig,
    pub motion: MotionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Side length of the square lattice; coordinates lie in `[0, size)`
    pub size: u32,
    /// Largest Manhattan distance at which two agents may stay bonded
    pub neighbor_distance: u32,
    /// Maximum number of bonds an agent may hold
    pub max_bonds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of converter agents seeded at startup
    pub agents: usize,
    /// Number of resource particles kept in the world
    pub particles: usize,
    /// How many resource kinds are in play (2..=7, starting at A)
    pub resource_types: usize,
    /// Share of particles replaced at every seed cycle after the first
    pub reseed_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Farthest surface an agent searches for particles
    pub search_distance: u32,
    /// Threshold added per unit of distance before a surface is searched
    ///
    /// A surface at distance `d` is only scanned when `|gauss| > d * penalty`.
    pub action_distance_penalty: f64,
    /// Turns run inside one seed cycle
    pub turns_per_seed: u32,
    /// Margin by which a mover's total bond strength must beat a blocker's
    pub collision_win_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Inertia of a standalone agent; it follows a particle with chance `1/mass_ratio`
    pub mass_ratio: u32,
    /// Inertia per member of a bonded component
    pub mass_ratio_linked: u32,
    /// Divisor applied to energy deltas in the acceptance rule
    pub energy_scale: f64,
    pub temperature: f64,
    pub max_temperature: f64,
    /// Idle cycles over which the chance of a random move ramps up
    pub idle_wait: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Seed cycles between rendered shots; each shot counts towards the budget
    pub render_period: u64,
    pub snapshot_period: u64,
    pub chain_analytics_period: u64,
    pub world_analytics_period: u64,
    /// Run stops once this many shots were produced
    pub max_output_count: u64,
    /// Chains with fewer agents are not reported
    pub min_chain_length: usize,
    /// Draw particles into rendered shots
    pub render_particles: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            random_seed: 3_432_716_543,
            space: SpaceConfig::default(),
            population: PopulationConfig::default(),
            interaction: InteractionConfig::default(),
            motion: MotionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            size: 200,
            neighbor_distance: 1,
            max_bonds: 2,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agents: 1000,
            particles: 3000,
            resource_types: 4,
            reseed_pct: 10,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            search_distance: 3,
            action_distance_penalty: 0.4,
            turns_per_seed: 15,
            collision_win_threshold: 0.1,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            mass_ratio: 4,
            mass_ratio_linked: 4,
            energy_scale: 1.0,
            temperature: 50.0,
            max_temperature: 100.0,
            idle_wait: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            render_period: 500,
            snapshot_period: 1000,
            chain_analytics_period: 1000,
            world_analytics_period: 1000,
            max_output_count: 3000,
            min_chain_length: 3,
            render_particles: true,
        }
    }
}

impl WorldConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn cell_count(&self) -> usize {
        (self.space.size as usize).pow(crate::spatial::SPACE_DIM as u32)
    }

    /// Resource kinds in play, starting at A
    pub fn resource_kinds(&self) -> &'static [ResourceType] {
        let count = self.population.resource_types.min(ResourceType::MAX_KINDS);
        &ResourceType::ALL[..count]
    }

    /// Particles replaced at each reseed after the initial fill
    pub fn reseed_count(&self) -> usize {
        self.population.particles * self.population.reseed_pct as usize / 100
    }

    /// Chance that a bonded component of `linked` other members follows its agent
    pub fn group_move_chance(&self, linked: usize) -> f64 {
        1.0 / (self.motion.mass_ratio_linked as f64 * (linked as f64 + 1.0))
    }

    /// Chance that a single agent follows a particle
    pub fn single_move_chance(&self) -> f64 {
        1.0 / self.motion.mass_ratio as f64
    }

    /// Fail fast on values the engine cannot run with.
    ///
    /// The lattice is capped at [`MAX_LATTICE_CELLS`] before anything is
    /// allocated for it.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.space.size == 0 {
            return invalid("space.size must be positive".into());
        }
        let cells = (self.space.size as usize)
            .checked_pow(crate::spatial::SPACE_DIM as u32)
            .filter(|&cells| cells <= MAX_LATTICE_CELLS);
        let Some(cells) = cells else {
            return invalid(format!(
                "space.size ({}) exceeds the {} cell limit",
                self.space.size, MAX_LATTICE_CELLS
            ));
        };
        if self.space.neighbor_distance == 0 {
            return invalid("space.neighbor_distance must be at least 1".into());
        }
        if self.space.max_bonds == 0 {
            return invalid("space.max_bonds must be at least 1".into());
        }

        if self.population.agents > cells {
            return invalid(format!(
                "population.agents ({}) exceeds the {} available cells",
                self.population.agents, cells
            ));
        }
        if self.population.particles > cells {
            return invalid(format!(
                "population.particles ({}) exceeds the {} available cells",
                self.population.particles, cells
            ));
        }
        if !(2..=ResourceType::MAX_KINDS).contains(&self.population.resource_types) {
            return invalid(format!(
                "population.resource_types ({}) must be between 2 and {}",
                self.population.resource_types,
                ResourceType::MAX_KINDS
            ));
        }
        if self.population.reseed_pct > 100 {
            return invalid(format!(
                "population.reseed_pct ({}) must not exceed 100",
                self.population.reseed_pct
            ));
        }

        let penalty = self.interaction.action_distance_penalty;
        if !penalty.is_finite() || penalty < 0.0 {
            return invalid(format!(
                "interaction.action_distance_penalty ({}) must be a non-negative number",
                penalty
            ));
        }
        if !self.interaction.collision_win_threshold.is_finite() {
            return invalid("interaction.collision_win_threshold must be finite".into());
        }

        if self.motion.mass_ratio == 0 || self.motion.mass_ratio_linked == 0 {
            return invalid("motion mass ratios must be positive".into());
        }
        if !(self.motion.energy_scale > 0.0) {
            return invalid(format!(
                "motion.energy_scale ({}) must be positive",
                self.motion.energy_scale
            ));
        }
        if !(self.motion.max_temperature > 0.0) {
            return invalid(format!(
                "motion.max_temperature ({}) must be positive",
                self.motion.max_temperature
            ));
        }
        if !self.motion.temperature.is_finite() {
            return invalid("motion.temperature must be finite".into());
        }
        if self.motion.idle_wait == 0 {
            return invalid("motion.idle_wait must be positive".into());
        }

        let out = &self.output;
        if out.render_period == 0
            || out.snapshot_period == 0
            || out.chain_analytics_period == 0
            || out.world_analytics_period == 0
        {
            return invalid("output periods must be positive".into());
        }

        Ok(())
    }

    /// One-line parameter summary used in logs and report headers
    pub fn title(&self, seed: SeedCount) -> String {
        format!(
            "seed={} size={} agents={} particles={} kinds={} search={} penalty={} turns={} reseed={}% mass={}/{} temp={}/{} idle={} win={} rnd={}",
            seed,
            self.space.size,
            self.population.agents,
            self.population.particles,
            self.population.resource_types,
            self.interaction.search_distance,
            self.interaction.action_distance_penalty,
            self.interaction.turns_per_seed,
            self.population.reseed_pct,
            self.motion.mass_ratio,
            self.motion.mass_ratio_linked,
            self.motion.temperature,
            self.motion.max_temperature,
            self.motion.idle_wait,
            self.interaction.collision_win_threshold,
            self.random_seed,
        )
    }
}
