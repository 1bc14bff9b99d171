//! Chain analytics output

use serde::{Deserialize, Serialize};

use crate::analysis::chain::{Chain, ChainStats};
use crate::analysis::stats::WorldStats;
use crate::core::types::{AgentId, SeedCount};

/// Everything the chain analytics export writes for one seed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainReport {
    pub title: String,
    pub seed: SeedCount,
    pub world: WorldStats,
    pub chains: Vec<ChainStats>,
    pub unclaimed: usize,
}

impl ChainReport {
    pub fn new(title: String, world: WorldStats, chains: &[Chain], unclaimed: &[AgentId]) -> Self {
        Self {
            title,
            seed: world.seed,
            chains: chains.iter().map(Chain::stats).collect(),
            unclaimed: unclaimed.len(),
            world,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Plain text: title, world summary, then one line per chain
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.world.to_string());
        out.push('\n');
        for (i, chain) in self.chains.iter().enumerate() {
            out.push_str(&format!(
                "{:4}: Size:{:3},{}, Strength:{:04.1}({:04.1},{:03.1}), Age:{:8}({:8},{:8}). matchPct:{:04.1} {}\n",
                i,
                chain.length,
                chain.circular,
                chain.avg_strength,
                chain.max_strength,
                chain.min_strength,
                chain.avg_age as u64,
                chain.max_age,
                chain.min_age,
                chain.match_type_pct,
                chain.type_list,
            ));
        }
        out.push_str(&format!("unclaimed agents: {}\n", self.unclaimed));
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "{} chains at seed {} (longest {}), {} agents unclaimed",
            self.world.count, self.seed, self.world.max_length, self.unclaimed
        )
    }
}
