//! Seed-cycle scheduling and the main run loop

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{AgentId, SeedCount};
use crate::simulation::seeding::ReseedReport;
use crate::simulation::world::{CycleTally, World};

/// What one seed cycle did and which periodic exports fall due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Seed counter after the cycle's reseed
    pub seed_count: SeedCount,
    pub reseed: ReseedReport,
    pub tally: CycleTally,
    pub violations: usize,
    pub render_due: bool,
    pub snapshot_due: bool,
    pub chain_analytics_due: bool,
    pub world_analytics_due: bool,
    /// Run-length budget reached
    pub finished: bool,
}

/// Receives the world after every seed cycle (file writers, progress, tests)
pub trait CycleObserver {
    fn on_cycle(&mut self, world: &World, report: &CycleReport) -> Result<()>;
}

impl<F> CycleObserver for F
where
    F: FnMut(&World, &CycleReport) -> Result<()>,
{
    fn on_cycle(&mut self, world: &World, report: &CycleReport) -> Result<()> {
        self(world, report)
    }
}

/// Totals of a finished [`World::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub cycles: u64,
    pub seed_count: SeedCount,
    pub output_count: u64,
    pub violations: u64,
}

impl World {
    /// One seed cycle: reseed, reset action counts, run the turns with a
    /// bond check after each, let idle agents wander, then flag due exports.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.tally = CycleTally::default();

        let reseed = self.reseed();
        self.seed_count += 1;
        self.reset_action_counts();

        let mut violations = 0;
        for _ in 0..self.config.interaction.turns_per_seed {
            self.run_turn();
            violations += self.validate_bonds().len();
        }
        self.update_idle_agents();

        let seed = self.seed_count;
        let out = &self.config.output;
        let render_due = seed % out.render_period == 0;
        let snapshot_due = seed % out.snapshot_period == 0;
        let chain_analytics_due = seed % out.chain_analytics_period == 0;
        let world_analytics_due = seed % out.world_analytics_period == 0;
        if render_due {
            self.output_count += 1;
        }

        let report = CycleReport {
            seed_count: seed,
            reseed,
            tally: self.tally,
            violations,
            render_due,
            snapshot_due,
            chain_analytics_due,
            world_analytics_due,
            finished: self.is_finished(),
        };
        tracing::trace!(
            seed,
            actions = report.tally.actions,
            moves = report.tally.agent_moves + report.tally.group_moves,
            idle_moves = report.tally.idle_moves,
            "cycle complete"
        );
        report
    }

    /// Run seed cycles until the output budget (or `max_cycles`) is used up
    pub fn run<O: CycleObserver>(&mut self, observer: &mut O, max_cycles: Option<u64>) -> Result<RunSummary> {
        tracing::info!(title = %self.config.title(self.seed_count), "Run starting");
        let mut cycles = 0;
        let mut violations = 0;

        while !self.is_finished() && max_cycles.map_or(true, |cap| cycles < cap) {
            let report = self.run_cycle();
            cycles += 1;
            violations += report.violations as u64;
            observer.on_cycle(self, &report)?;
        }

        let summary = RunSummary {
            cycles,
            seed_count: self.seed_count,
            output_count: self.output_count,
            violations,
        };
        tracing::info!(
            cycles,
            seed = summary.seed_count,
            outputs = summary.output_count,
            violations,
            "Run finished"
        );
        Ok(summary)
    }

    pub fn reset_action_counts(&mut self) {
        for agent in &mut self.agents {
            agent.action_count = 0;
        }
    }

    /// Agents that did nothing this cycle grow idler and may wander.
    ///
    /// Chance of a move is `idle / (idle_wait * mass_ratio)`, or for a
    /// chain end `idle / (idle_wait * mass_ratio_linked * (linked + 1))`.
    pub fn update_idle_agents(&mut self) {
        let order: Vec<AgentId> = self.turn_order.clone();
        let motion = self.config.motion.clone();

        for id in order {
            let agent = &mut self.agents[id.index()];
            if agent.action_count > 0 {
                continue;
            }
            agent.idle_count += 1;
            let idle = agent.idle_count as f64;
            let degree = agent.degree();

            let inertia = if degree == 1 {
                let linked = self.linked_count(id) as f64;
                motion.idle_wait as f64 * motion.mass_ratio_linked as f64 * (linked + 1.0)
            } else {
                motion.idle_wait as f64 * motion.mass_ratio as f64
            };
            if self.rng.unit() > idle / inertia {
                continue;
            }
            if self.move_randomly(id) {
                self.agents[id.index()].idle_count = 0;
                self.tally.idle_moves += 1;
            }
        }
    }
}
