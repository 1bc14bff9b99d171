//! Integer lattice positions and Manhattan neighborhoods

use std::fmt;
use std::ops::{Add, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of axes of the world lattice
pub const SPACE_DIM: usize = 2;

/// A point (or translation) on the integer lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates(pub [i32; SPACE_DIM]);

impl Coordinates {
    pub const ORIGIN: Coordinates = Coordinates([0; SPACE_DIM]);

    pub fn new(axes: [i32; SPACE_DIM]) -> Self {
        Self(axes)
    }

    /// Manhattan distance
    pub fn distance(&self, other: &Coordinates) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.abs_diff(*b))
            .sum()
    }

    /// Manhattan length of a translation
    pub fn norm(&self) -> u32 {
        self.distance(&Self::ORIGIN)
    }
}

impl Add for Coordinates {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (axis, delta) in out.iter_mut().zip(rhs.0.iter()) {
            *axis += delta;
        }
        Self(out)
    }
}

impl Sub for Coordinates {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (axis, delta) in out.iter_mut().zip(rhs.0.iter()) {
            *axis -= delta;
        }
        Self(out)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "[{}]", axis)?;
        }
        Ok(())
    }
}

/// Bounded hyper-cube `[0, size)^SPACE_DIM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    size: i32,
}

impl Lattice {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.min(i32::MAX as u32) as i32,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        (self.size as usize).pow(SPACE_DIM as u32)
    }

    #[inline]
    pub fn contains(&self, point: &Coordinates) -> bool {
        point.0.iter().all(|&axis| axis >= 0 && axis < self.size)
    }

    /// Flat row-major index; last axis varies fastest
    #[inline]
    pub fn index_of(&self, point: &Coordinates) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        Some(
            point
                .0
                .iter()
                .fold(0usize, |acc, &axis| acc * self.size as usize + axis as usize),
        )
    }

    /// Inverse of [`Lattice::index_of`]
    pub fn point_at(&self, mut index: usize) -> Coordinates {
        let side = self.size.max(1) as usize;
        let mut axes = [0i32; SPACE_DIM];
        for axis in axes.iter_mut().rev() {
            *axis = (index % side) as i32;
            index /= side;
        }
        Coordinates(axes)
    }

    /// All in-bounds points with `distance(center, p) <= radius`.
    ///
    /// Points come out in lattice order of the clipped bounding box.
    pub fn vicinity(&self, center: &Coordinates, radius: u32) -> Vec<Coordinates> {
        self.ball(center, radius, |d| d <= radius)
    }

    /// All in-bounds points with `distance(center, p) == radius`
    pub fn surface(&self, center: &Coordinates, radius: u32) -> Vec<Coordinates> {
        self.ball(center, radius, |d| d == radius)
    }

    fn ball(&self, center: &Coordinates, radius: u32, keep: impl Fn(u32) -> bool) -> Vec<Coordinates> {
        let r = radius.min(i32::MAX as u32) as i32;
        let mut low = [0i32; SPACE_DIM];
        let mut high = [0i32; SPACE_DIM];
        for axis in 0..SPACE_DIM {
            low[axis] = center.0[axis].saturating_sub(r).max(0);
            high[axis] = center.0[axis].saturating_add(r).min(self.size - 1);
            if low[axis] > high[axis] {
                return Vec::new();
            }
        }

        let mut points = Vec::new();
        let mut cursor = low;
        loop {
            let point = Coordinates(cursor);
            if keep(center.distance(&point)) {
                points.push(point);
            }

            // odometer step, last axis fastest
            let mut axis = SPACE_DIM;
            loop {
                if axis == 0 {
                    return points;
                }
                axis -= 1;
                if cursor[axis] < high[axis] {
                    cursor[axis] += 1;
                    break;
                }
                cursor[axis] = low[axis];
            }
        }
    }

    /// Uniformly random in-bounds point
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinates {
        let mut axes = [0i32; SPACE_DIM];
        for axis in axes.iter_mut() {
            *axis = rng.gen_range(0..self.size);
        }
        Coordinates(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_distance_is_manhattan() {
        let a = Coordinates::new([1, 2]);
        let b = Coordinates::new([4, 0]);
        assert_eq!(a.distance(&b), 5);
        assert_eq!(b.distance(&a), 5);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_vicinity_zero_is_center() {
        let lattice = Lattice::new(10);
        let center = Coordinates::new([3, 3]);
        assert_eq!(lattice.vicinity(&center, 0), vec![center]);
    }

    #[test]
    fn test_vicinity_is_diamond() {
        let lattice = Lattice::new(10);
        let center = Coordinates::new([5, 5]);
        // 1 + 4 + 8 points for radius 2
        assert_eq!(lattice.vicinity(&center, 2).len(), 13);
        assert_eq!(lattice.surface(&center, 1).len(), 4);
        assert_eq!(lattice.surface(&center, 2).len(), 8);
    }

    #[test]
    fn test_vicinity_clipped_at_corner() {
        let lattice = Lattice::new(10);
        let corner = Coordinates::new([0, 0]);
        let points = lattice.surface(&corner, 1);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| lattice.contains(p)));
    }

    #[test]
    fn test_surface_order_last_axis_fastest() {
        let lattice = Lattice::new(10);
        let center = Coordinates::new([5, 5]);
        let points = lattice.surface(&center, 1);
        assert_eq!(
            points,
            vec![
                Coordinates::new([4, 5]),
                Coordinates::new([5, 4]),
                Coordinates::new([5, 6]),
                Coordinates::new([6, 5]),
            ]
        );
    }

    #[test]
    fn test_index_roundtrip() {
        let lattice = Lattice::new(7);
        for index in 0..lattice.cell_count() {
            let point = lattice.point_at(index);
            assert_eq!(lattice.index_of(&point), Some(index));
        }
        assert_eq!(lattice.index_of(&Coordinates::new([7, 0])), None);
        assert_eq!(lattice.index_of(&Coordinates::new([0, -1])), None);
    }

    #[test]
    fn test_random_point_in_bounds() {
        let lattice = Lattice::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            assert!(lattice.contains(&lattice.random_point(&mut rng)));
        }
    }

    #[test]
    fn test_translation() {
        let a = Coordinates::new([2, 3]);
        let b = Coordinates::new([5, 1]);
        let delta = b - a;
        assert_eq!(a + delta, b);
        assert_eq!(delta.norm(), 5);
        assert_eq!(a.to_string(), "[2][3]");
    }
}
