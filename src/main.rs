//! Emergent Chains - Entry Point
//!
//! Builds (or resumes) a world, runs seed cycles until the output budget
//! is spent and writes periodic shots, snapshots and analytics.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use emergent_chains::analysis::StatsTracker;
use emergent_chains::core::config::WorldConfig;
use emergent_chains::core::error::Result;
use emergent_chains::persistence::{OutputSink, WorldSnapshot};
use emergent_chains::simulation::{CycleReport, World};

/// Converter agents that consume and emit particles and bond into chains
#[derive(Parser, Debug)]
#[command(name = "emergent-chains")]
#[command(about = "Run the emergent chain lattice simulation")]
struct Args {
    /// World configuration (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume from a snapshot written by an earlier run
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Random seed for a new world (ignored when resuming)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for shots, snapshots and analytics
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Stop after this many seed cycles even if outputs remain
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Run without writing any files
    #[arg(long)]
    no_files: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "emergent_chains=info"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            ),
        )
        .init();

    let (mut world, analytics) = match &args.snapshot {
        Some(path) => {
            let (mut world, analytics) = WorldSnapshot::load(path)?.into_parts();
            if args.config.is_some() || args.output_dir.is_some() {
                let mut config = match &args.config {
                    Some(path) => WorldConfig::load(path)?,
                    None => world.config().clone(),
                };
                if let Some(dir) = &args.output_dir {
                    config.output.dir = dir.clone();
                }
                world.reconfigure(config)?;
            }
            if args.seed.is_some() {
                tracing::warn!("--seed is ignored when resuming a snapshot");
            }
            (world, analytics)
        }
        None => {
            let mut config = match &args.config {
                Some(path) => WorldConfig::load(path)?,
                None => WorldConfig::default(),
            };
            if let Some(dir) = &args.output_dir {
                config.output.dir = dir.clone();
            }
            if let Some(seed) = args.seed {
                config.random_seed = seed;
            }
            (World::new(config)?, StatsTracker::new())
        }
    };

    let summary = if args.no_files {
        let mut progress = |world: &World, report: &CycleReport| -> Result<()> {
            if report.render_due {
                tracing::info!(
                    seed = report.seed_count,
                    outputs = world.output_count(),
                    actions = report.tally.actions,
                    "Progress"
                );
            }
            Ok(())
        };
        world.run(&mut progress, args.max_cycles)?
    } else {
        let mut sink = OutputSink::with_analytics(world.config().output.dir.clone(), analytics)?;
        world.run(&mut sink, args.max_cycles)?
    };

    println!(
        "Finished after {} cycles at seed {} ({} outputs, {} bond violations)",
        summary.cycles, summary.seed_count, summary.output_count, summary.violations
    );
    Ok(())
}
