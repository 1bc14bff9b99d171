//! World engine: state, turns, moves, collisions, scheduling

pub mod acceptance;
pub mod bonds;
pub mod collision;
pub mod movement;
pub mod rng;
pub mod schedule;
pub mod seeding;
pub mod turn;
pub mod world;

pub use acceptance::accept_move;
pub use bonds::BondViolation;
pub use collision::collision_wins;
pub use movement::{CellVerdict, Resolution};
pub use rng::SimRng;
pub use schedule::{CycleObserver, CycleReport, RunSummary};
pub use seeding::ReseedReport;
pub use world::{CycleTally, World};
