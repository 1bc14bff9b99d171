//! Aggregate statistics over all chains of one export period

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::chain::{Chain, ChainStats};
use crate::analysis::correlator::{auto_correlation, peak_correlation};
use crate::core::types::{SeedCount, TypePair};

/// One analytics record of the whole world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub seed: SeedCount,
    pub count: usize,
    pub avg_length: f64,
    pub max_length: usize,
    pub avg_strength: f64,
    pub max_strength: f64,
    pub min_strength: f64,
    pub avg_age: f64,
    pub max_age: f64,
    pub min_age: f64,
    pub count_non_circular: usize,
    pub avg_length_non_circular: f64,
    pub max_length_non_circular: usize,
    pub avg_strength_non_circular: f64,
    pub max_strength_non_circular: f64,
    pub min_strength_non_circular: f64,
    pub avg_age_non_circular: f64,
    pub max_age_non_circular: f64,
    pub min_age_non_circular: f64,
    pub avg_match_pct: f64,
    pub max_match_pct: f64,
    pub min_match_pct: f64,
    /// Mean over chains of their off-center self-correlation
    pub avg_auto_corr: f64,
    /// Mean over chains of the best match against the previous export
    pub avg_prev_corr: f64,
}

/// Count, mean, max and min of a series; all zero when empty
#[derive(Debug, Clone, Copy, Default)]
struct Summary {
    count: usize,
    mean: f64,
    max: f64,
    min: f64,
}

impl Summary {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let mut count = 0;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for value in values {
            count += 1;
            sum += value;
            max = max.max(value);
            min = min.min(value);
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            count,
            mean: sum / count as f64,
            max,
            min,
        }
    }
}

impl WorldStats {
    /// Build the record from per-chain summaries (averages of each chain's
    /// strengths and ages feed the distributions)
    pub fn from_chains(seed: SeedCount, chains: &[Chain]) -> Self {
        let stats: Vec<ChainStats> = chains.iter().map(Chain::stats).collect();
        let open: Vec<&ChainStats> = stats.iter().filter(|s| !s.circular).collect();

        let length = Summary::of(stats.iter().map(|s| s.length as f64));
        let strength = Summary::of(stats.iter().map(|s| s.avg_strength));
        let age = Summary::of(stats.iter().map(|s| s.avg_age));
        let matching = Summary::of(stats.iter().map(|s| s.match_type_pct));

        let open_length = Summary::of(open.iter().map(|s| s.length as f64));
        let open_strength = Summary::of(open.iter().map(|s| s.avg_strength));
        let open_age = Summary::of(open.iter().map(|s| s.avg_age));

        let auto = Summary::of(chains.iter().map(|c| auto_correlation(&c.kinds)));

        Self {
            seed,
            count: stats.len(),
            avg_length: length.mean,
            max_length: length.max as usize,
            avg_strength: strength.mean,
            max_strength: strength.max,
            min_strength: strength.min,
            avg_age: age.mean,
            max_age: age.max,
            min_age: age.min,
            count_non_circular: open_length.count,
            avg_length_non_circular: open_length.mean,
            max_length_non_circular: open_length.max as usize,
            avg_strength_non_circular: open_strength.mean,
            max_strength_non_circular: open_strength.max,
            min_strength_non_circular: open_strength.min,
            avg_age_non_circular: open_age.mean,
            max_age_non_circular: open_age.max,
            min_age_non_circular: open_age.min,
            avg_match_pct: matching.mean,
            max_match_pct: matching.max,
            min_match_pct: matching.min,
            avg_auto_corr: auto.mean,
            avg_prev_corr: 0.0,
        }
    }

    pub fn csv_header() -> &'static str {
        "seed,count,avgLength,maxLength,avgStrength,maxStrength,minStrength,avgAge,maxAge,minAge,\
countNonCircular,avgLengthNonCircular,maxLengthNonCircular,avgStrengthNonCircular,\
maxStrengthNonCircular,minStrengthNonCircular,avgAgeNonCircular,maxAgeNonCircular,\
minAgeNonCircular,avgMatchPct,maxMatchPct,minMatchPct,avgAutoCorr,avgPrevCorr"
    }

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{:.1},{},{:.2},{:.2},{:.2},{:.1},{:.0},{:.0},{},{:.1},{},{:.2},{:.2},{:.2},{:.1},{:.0},{:.0},{:.1},{:.1},{:.1},{:.3},{:.3}",
            self.seed,
            self.count,
            self.avg_length,
            self.max_length,
            self.avg_strength,
            self.max_strength,
            self.min_strength,
            self.avg_age,
            self.max_age,
            self.min_age,
            self.count_non_circular,
            self.avg_length_non_circular,
            self.max_length_non_circular,
            self.avg_strength_non_circular,
            self.max_strength_non_circular,
            self.min_strength_non_circular,
            self.avg_age_non_circular,
            self.max_age_non_circular,
            self.min_age_non_circular,
            self.avg_match_pct,
            self.max_match_pct,
            self.min_match_pct,
            self.avg_auto_corr,
            self.avg_prev_corr,
        )
    }
}

impl fmt::Display for WorldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed:{:8}, chains:{:4}, avgL:{:3}, maxL:{:4}, avgStrg:{:4.1}, maxStrg:{:4.1}, avgAge:{:6}, maxAge:{:6}, avgMatch:{:3}, avgAutoC:{:3.2}, avgPrevC:{:3.2}",
            self.seed,
            self.count,
            self.avg_length as u64,
            self.max_length,
            self.avg_strength,
            self.max_strength,
            self.avg_age as u64,
            self.max_age as u64,
            self.avg_match_pct as u64,
            self.avg_auto_corr,
            self.avg_prev_corr,
        )
    }
}

/// Keeps the type sequences of the last export so the next record can
/// measure how much of the previous structure survived
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTracker {
    previous: Vec<Vec<TypePair>>,
    history: Vec<WorldStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the record for `chains` and remember them for the next call
    pub fn record(&mut self, seed: SeedCount, chains: &[Chain]) -> WorldStats {
        let mut stats = WorldStats::from_chains(seed, chains);
        if !self.previous.is_empty() && !chains.is_empty() {
            let total: f64 = chains
                .iter()
                .map(|chain| {
                    self.previous
                        .iter()
                        .map(|prev| peak_correlation(&chain.kinds, prev))
                        .fold(0.0, f64::max)
                })
                .sum();
            stats.avg_prev_corr = total / chains.len() as f64;
        }
        self.previous = chains.iter().map(|c| c.kinds.clone()).collect();
        self.history.push(stats.clone());
        stats
    }

    pub fn history(&self) -> &[WorldStats] {
        &self.history
    }
}
