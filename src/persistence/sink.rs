//! Periodic output files written while a run progresses

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{extract_chains, ChainReport, StatsTracker, WorldStats};
use crate::core::error::Result;
use crate::core::types::SeedCount;
use crate::persistence::snapshot::WorldSnapshot;
use crate::render::{write_png, RenderFrame};
use crate::simulation::{CycleObserver, CycleReport, World};

pub const WORLD_STATS_FILE: &str = "world_stats.csv";

/// Writes shots, snapshots, chain reports and the world statistics table
/// into one directory, each at its own period.
pub struct OutputSink {
    dir: PathBuf,
    tracker: StatsTracker,
    files_written: u64,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_analytics(dir, StatsTracker::new())
    }

    /// Continue the analytics of a resumed run
    pub fn with_analytics(dir: impl Into<PathBuf>, tracker: StatsTracker) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            tracker,
            files_written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    pub fn history(&self) -> &[WorldStats] {
        self.tracker.history()
    }

    fn seed_file(&self, prefix: &str, seed: SeedCount, ext: &str) -> PathBuf {
        self.dir.join(format!("{}_{:08}.{}", prefix, seed, ext))
    }

    fn append_world_stats(&mut self, stats: &WorldStats) -> Result<()> {
        let path = self.dir.join(WORLD_STATS_FILE);
        let fresh = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if fresh {
            writeln!(file, "{}", WorldStats::csv_header())?;
            self.files_written += 1;
        }
        writeln!(file, "{}", stats.csv_row())?;
        Ok(())
    }
}

impl CycleObserver for OutputSink {
    fn on_cycle(&mut self, world: &World, report: &CycleReport) -> Result<()> {
        let seed = report.seed_count;

        if report.render_due {
            let path = self.seed_file("shot", seed, "png");
            write_png(&RenderFrame::capture(world), &path)?;
            self.files_written += 1;
        }

        if report.chain_analytics_due || report.world_analytics_due {
            let extraction = extract_chains(world, world.config().output.min_chain_length);
            let stats = self.tracker.record(seed, &extraction.chains);

            if report.chain_analytics_due {
                let chain_report = ChainReport::new(
                    world.config().title(seed),
                    stats.clone(),
                    &extraction.chains,
                    &extraction.unclaimed,
                );
                let path = self.seed_file("chains", seed, "txt");
                fs::write(&path, chain_report.to_text())?;
                self.files_written += 1;
                tracing::info!(path = %path.display(), "{}", chain_report.summary());
            }

            if report.world_analytics_due {
                self.append_world_stats(&stats)?;
                tracing::info!("{}", stats);
            }
        }

        // after analytics, so the saved tracker already holds this seed
        if report.snapshot_due {
            let path = self.seed_file("snapshot", seed, "json");
            WorldSnapshot::capture_with_analytics(world, &self.tracker).save(&path)?;
            self.files_written += 1;
        }

        Ok(())
    }
}
