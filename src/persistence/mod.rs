//! Snapshots and periodic output files

pub mod sink;
pub mod snapshot;

pub use sink::{OutputSink, WORLD_STATS_FILE};
pub use snapshot::{WorldSnapshot, SNAPSHOT_FORMAT_VERSION};
