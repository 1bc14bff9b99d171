//! Occupancy grid: at most one occupant per lattice cell

use serde::{Deserialize, Serialize};

use crate::spatial::coords::{Coordinates, Lattice};

/// Flat grid mapping each cell to an optional occupant handle.
///
/// This is the single source of truth for "who stands where"; entity
/// positions are kept in step by the world, which only moves things
/// through [`OccupancyGrid::place`], [`OccupancyGrid::take`] and
/// [`OccupancyGrid::relocate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid<T: Copy + PartialEq> {
    lattice: Lattice,
    cells: Vec<Option<T>>,
}

impl<T: Copy + PartialEq> OccupancyGrid<T> {
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            cells: vec![None; lattice.cell_count()],
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn get(&self, at: &Coordinates) -> Option<T> {
        self.lattice
            .index_of(at)
            .and_then(|i| self.cells.get(i).copied().flatten())
    }

    #[inline]
    pub fn is_occupied(&self, at: &Coordinates) -> bool {
        self.get(at).is_some()
    }

    /// Put `value` on an empty in-bounds cell.
    ///
    /// Returns the current occupant (or `value` itself when out of bounds)
    /// as the error when the cell cannot take it.
    pub fn place(&mut self, at: &Coordinates, value: T) -> Result<(), T> {
        let Some(index) = self.lattice.index_of(at) else {
            return Err(value);
        };
        match self.cells[index] {
            Some(existing) => Err(existing),
            None => {
                self.cells[index] = Some(value);
                Ok(())
            }
        }
    }

    /// Empty a cell, returning what was there
    pub fn take(&mut self, at: &Coordinates) -> Option<T> {
        let index = self.lattice.index_of(at)?;
        self.cells[index].take()
    }

    /// Overwrite a cell unconditionally (used to re-point a moved handle)
    pub fn replace(&mut self, at: &Coordinates, value: Option<T>) -> Option<T> {
        let index = self.lattice.index_of(at)?;
        std::mem::replace(&mut self.cells[index], value)
    }

    /// Move the occupant of `from` to the empty cell `to`
    pub fn relocate(&mut self, from: &Coordinates, to: &Coordinates) -> bool {
        if from == to {
            return self.is_occupied(from);
        }
        let (Some(src), Some(dst)) = (self.lattice.index_of(from), self.lattice.index_of(to)) else {
            return false;
        };
        if self.cells[dst].is_some() {
            return false;
        }
        match self.cells[src].take() {
            Some(value) => {
                self.cells[dst] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupants in lattice order
    pub fn iter(&self) -> impl Iterator<Item = (Coordinates, T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|value| (self.lattice.point_at(i), value)))
    }
}
