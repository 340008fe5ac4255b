//! Pairwise displacement records (the pair aligner's output) and their
//! tile-frame-relative `ShiftVector` form.

use std::path::PathBuf;

/// Which mosaic direction a [`Pair`] was measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Y / south: `b` is the tile directly below `a`.
    South,
    /// X / east: `b` is the tile directly to the right of `a`.
    East,
}

impl Axis {
    pub fn as_i64(self) -> i64 {
        match self {
            Axis::South => 1,
            Axis::East => 2,
        }
    }

    pub fn from_i64(v: i64) -> Option<Axis> {
        match v {
            1 => Some(Axis::South),
            2 => Some(Axis::East),
            _ => None,
        }
    }
}

/// Directed pairwise displacement measurement between two adjacent tiles.
#[derive(Debug, Clone)]
pub struct Pair {
    pub aname: PathBuf,
    pub bname: PathBuf,
    pub axis: Axis,
    pub dz: i64,
    pub dy: i64,
    pub dx: i64,
    pub score: f64,
}

/// Tile-frame-relative displacement derived from a [`Pair`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftVector {
    pub pz: f64,
    pub py: f64,
    pub px: f64,
}

impl Pair {
    /// Derive this pair's `ShiftVector`, given tile `a`'s `(xsize, ysize)`
    /// (needed to rotate the east-axis result into the shared Y/X frame).
    pub fn shift_vector(&self, xsize: usize, ysize: usize) -> ShiftVector {
        match self.axis {
            Axis::South => ShiftVector {
                pz: self.dz as f64,
                py: ysize as f64 - self.dy as f64,
                px: self.dx as f64,
            },
            Axis::East => ShiftVector {
                pz: self.dz as f64,
                py: -(self.dx as f64),
                px: xsize as f64 - self.dy as f64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(axis: Axis, dz: i64, dy: i64, dx: i64, score: f64) -> Pair {
        Pair {
            aname: PathBuf::from("a"),
            bname: PathBuf::from("b"),
            axis,
            dz,
            dy,
            dx,
            score,
        }
    }

    #[test]
    fn south_shift_vector_matches_formula() {
        let p = pair(Axis::South, 2, 480, 3, 0.9);
        let sv = p.shift_vector(512, 512);
        assert_eq!(
            sv,
            ShiftVector {
                pz: 2.0,
                py: 32.0,
                px: 3.0
            }
        );
    }

    #[test]
    fn east_shift_vector_matches_formula() {
        let p = pair(Axis::East, -1, 480, 7, 0.8);
        let sv = p.shift_vector(512, 512);
        assert_eq!(
            sv,
            ShiftVector {
                pz: -1.0,
                py: -7.0,
                px: 32.0
            }
        );
    }

    #[test]
    fn axis_round_trips_through_i64() {
        assert_eq!(Axis::from_i64(Axis::South.as_i64()), Some(Axis::South));
        assert_eq!(Axis::from_i64(Axis::East.as_i64()), Some(Axis::East));
        assert_eq!(Axis::from_i64(7), None);
    }
}
