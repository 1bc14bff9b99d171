//! Save and resume complete world state

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::StatsTracker;
use crate::core::error::{Result, SimError};
use crate::core::types::SeedCount;
use crate::simulation::World;

/// Bumped whenever the serialized world layout changes
pub const SNAPSHOT_FORMAT_VERSION: u32 = 2;

/// Serializable snapshot of world state, RNG stream included.
///
/// Also carries the analytics tracker, so `avg_prev_corr` after a resume
/// compares against the export made before the save.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub format_version: u32,
    pub saved_at_seed: SeedCount,
    pub world: World,
    #[serde(default)]
    pub analytics: StatsTracker,
}

impl WorldSnapshot {
    /// World state only; analytics start fresh on resume
    pub fn capture(world: &World) -> Self {
        Self::capture_with_analytics(world, &StatsTracker::new())
    }

    pub fn capture_with_analytics(world: &World, analytics: &StatsTracker) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at_seed: world.seed_count(),
            world: world.clone(),
            analytics: analytics.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: WorldSnapshot = serde_json::from_str(text)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SimError::IncompatibleSnapshot(format!(
                "format version {} (expected {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        if snapshot.saved_at_seed != snapshot.world.seed_count() {
            return Err(SimError::IncompatibleSnapshot(format!(
                "saved at seed {} but world is at seed {}",
                snapshot.saved_at_seed,
                snapshot.world.seed_count()
            )));
        }
        snapshot.world.config().validate()?;
        snapshot.world.check_integrity()?;
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        tracing::info!(seed = self.saved_at_seed, path = %path.display(), "Snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&text)?;
        tracing::info!(seed = snapshot.saved_at_seed, path = %path.display(), "Snapshot loaded");
        Ok(snapshot)
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn into_parts(self) -> (World, StatsTracker) {
        (self.world, self.analytics)
    }
}
