//! Spatial lattice and occupancy

pub mod coords;
pub mod grid;

pub use coords::{Coordinates, Lattice, SPACE_DIM};
pub use grid::OccupancyGrid;
