//! Chain extraction, correlation and world statistics
//!
//! Everything here reads a [`World`](crate::simulation::World) and never
//! changes it.

pub mod chain;
pub mod correlator;
pub mod report;
pub mod stats;

pub use chain::{extract_chains, Chain, ChainExtraction, ChainStats};
pub use correlator::{auto_correlation, correlate, peak_correlation};
pub use report::ChainReport;
pub use stats::{StatsTracker, WorldStats};
