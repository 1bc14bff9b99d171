//! Emergent Chains - converter agents on a lattice forming bonded chains

pub mod analysis;
pub mod core;
pub mod entity;
pub mod persistence;
pub mod render;
pub mod simulation;
pub mod spatial;
