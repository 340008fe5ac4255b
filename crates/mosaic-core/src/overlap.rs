//! Overlap geometry (component G): eight-directional overlap boxes per tile
//! in local coordinates, used downstream for fusion/blending.

use crate::grid::TileGrid;

/// Six bounds `(Z_from, Z_to, Y_from, Y_to, X_from, X_to)` in the owning
/// tile's local frame. All-zero means no usable overlap in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapBox {
    pub z_from: i64,
    pub z_to: i64,
    pub y_from: i64,
    pub y_to: i64,
    pub x_from: i64,
    pub x_to: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
            Direction::Ne => Direction::Sw,
            Direction::Sw => Direction::Ne,
            Direction::Nw => Direction::Se,
            Direction::Se => Direction::Nw,
        }
    }
}

/// The eight overlap boxes for one tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlaps {
    pub n: OverlapBox,
    pub s: OverlapBox,
    pub e: OverlapBox,
    pub w: OverlapBox,
    pub ne: OverlapBox,
    pub nw: OverlapBox,
    pub se: OverlapBox,
    pub sw: OverlapBox,
}

impl Overlaps {
    pub fn get(&self, dir: Direction) -> OverlapBox {
        match dir {
            Direction::N => self.n,
            Direction::S => self.s,
            Direction::E => self.e,
            Direction::W => self.w,
            Direction::Ne => self.ne,
            Direction::Nw => self.nw,
            Direction::Se => self.se,
            Direction::Sw => self.sw,
        }
    }
}

/// Look up the neighbor in `dir` via grid adjacency. Diagonals chain two
/// orthogonal lookups (e.g. NE = east-of(T) then north-of-that).
pub fn neighbor_in(grid: &TileGrid, idx: usize, dir: Direction) -> Option<usize> {
    match dir {
        Direction::N => grid.north_of(idx),
        Direction::S => grid.south_of(idx),
        Direction::E => grid.east_of(idx),
        Direction::W => grid.west_of(idx),
        Direction::Ne => grid.east_of(idx).and_then(|e| grid.north_of(e)),
        Direction::Nw => grid.west_of(idx).and_then(|w| grid.north_of(w)),
        Direction::Se => grid.east_of(idx).and_then(|e| grid.south_of(e)),
        Direction::Sw => grid.west_of(idx).and_then(|w| grid.south_of(w)),
    }
}

fn overlap_box(grid: &TileGrid, t_idx: usize, n_idx: Option<usize>) -> OverlapBox {
    let Some(n_idx) = n_idx else {
        return OverlapBox::default();
    };
    let t = grid.tile(t_idx);
    let n = grid.tile(n_idx);
    let (Some(t_abs), Some(n_abs)) = (t.absolute, n.absolute) else {
        return OverlapBox::default();
    };
    let t_end = t.absolute_end().expect("absolute set implies end is set");
    let n_end = n.absolute_end().expect("absolute set implies end is set");

    let x_from = t_abs.xs.max(n_abs.xs) - t_abs.xs;
    let x_to = t_end.0.min(n_end.0) - t_abs.xs;
    let y_from = t_abs.ys.max(n_abs.ys) - t_abs.ys;
    let y_to = t_end.1.min(n_end.1) - t_abs.ys;
    let z_from = t_abs.zs.max(n_abs.zs) - t_abs.zs;
    let z_to = t_end.2.min(n_end.2) - t_abs.zs;

    if x_from > x_to || y_from > y_to || z_from > z_to {
        return OverlapBox::default();
    }
    OverlapBox {
        z_from,
        z_to,
        y_from,
        y_to,
        x_from,
        x_to,
    }
}

/// Compute all eight overlap boxes for tile `idx`.
pub fn overlaps_for(grid: &TileGrid, idx: usize) -> Overlaps {
    let dirs = [
        Direction::N,
        Direction::S,
        Direction::E,
        Direction::W,
        Direction::Ne,
        Direction::Nw,
        Direction::Se,
        Direction::Sw,
    ];
    let mut out = Overlaps::default();
    for dir in dirs {
        let b = overlap_box(grid, idx, neighbor_in(grid, idx, dir));
        match dir {
            Direction::N => out.n = b,
            Direction::S => out.s = b,
            Direction::E => out.e = b,
            Direction::W => out.w = b,
            Direction::Ne => out.ne = b,
            Direction::Nw => out.nw = b,
            Direction::Se => out.se = b,
            Direction::Sw => out.sw = b,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ingest;
    use crate::source::{FrameSource, MemoryFrameSource};
    use crate::tile::Absolute;
    use ndarray::Array3;
    use std::path::Path;
    use tempfile::tempdir;

    fn opener(_: &Path) -> crate::error::Result<Box<dyn FrameSource>> {
        Ok(Box::new(MemoryFrameSource::new(Array3::<f64>::zeros((5, 100, 100)))))
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), []).unwrap();
    }

    #[test]
    fn south_and_north_overlaps_cover_the_same_absolute_region() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x_0_y_0_z_0.raw");
        touch(dir.path(), "x_0_y_80_z_0.raw");
        let mut grid = ingest(dir.path(), true, true, &opener).unwrap();

        let top = grid.index_at(0, 0).unwrap();
        let bottom = grid.index_at(1, 0).unwrap();
        grid.tile_mut(top).absolute = Some(Absolute { xs: 0, ys: 0, zs: 0 });
        grid.tile_mut(bottom).absolute = Some(Absolute { xs: 0, ys: 80, zs: 0 });

        let top_overlaps = overlaps_for(&grid, top);
        let bottom_overlaps = overlaps_for(&grid, bottom);

        let top_tile = grid.tile(top);
        let bottom_tile = grid.tile(bottom);
        let s = top_overlaps.s;
        let n = bottom_overlaps.n;

        let top_abs_y_from = top_tile.absolute.unwrap().ys + s.y_from;
        let top_abs_y_to = top_tile.absolute.unwrap().ys + s.y_to;
        let bottom_abs_y_from = bottom_tile.absolute.unwrap().ys + n.y_from;
        let bottom_abs_y_to = bottom_tile.absolute.unwrap().ys + n.y_to;

        assert_eq!(top_abs_y_from, bottom_abs_y_from);
        assert_eq!(top_abs_y_to, bottom_abs_y_to);
    }

    #[test]
    fn missing_neighbor_yields_all_zero_box() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x_0_y_0_z_0.raw");
        let mut grid = ingest(dir.path(), true, true, &opener).unwrap();
        let idx = grid.index_at(0, 0).unwrap();
        grid.tile_mut(idx).absolute = Some(Absolute { xs: 0, ys: 0, zs: 0 });

        let overlaps = overlaps_for(&grid, idx);
        assert_eq!(overlaps.n, OverlapBox::default());
        assert_eq!(overlaps.ne, OverlapBox::default());
    }

    #[test]
    fn opposite_direction_is_involutive() {
        assert_eq!(Direction::N.opposite().opposite(), Direction::N);
        assert_eq!(Direction::Ne.opposite(), Direction::Sw);
    }
}
