//! Initial position estimator (component E): breadth-first propagation of
//! pairwise shifts from a fixed root, giving the global optimizer a warm
//! start within the basin of the true optimum.

use std::collections::VecDeque;

use crate::grid::TileGrid;
use crate::pair::{Pair, ShiftVector};
use crate::tile::Absolute;

/// Populate `grid`'s tile `absolute` fields from `pairs` via breadth-first
/// traversal of the tile adjacency graph, weighted by `1 - score`.
///
/// Tiles unreachable from the root keep their nominal position and a
/// warning is logged for each.
pub fn estimate_initial_positions(grid: &mut TileGrid, pairs: &[Pair]) {
    let n = grid.len();
    if n == 0 {
        return;
    }

    let mut adj: Vec<Vec<(usize, f64, ShiftVector)>> = vec![Vec::new(); n];
    for p in pairs {
        let (Some(a_idx), Some(b_idx)) = (grid.index_by_name(&p.aname), grid.index_by_name(&p.bname)) else {
            continue;
        };
        let a_tile = grid.tile(a_idx);
        let sv = p.shift_vector(a_tile.xsize, a_tile.ysize);
        let weight = 1.0 - p.score;
        adj[a_idx].push((b_idx, weight, sv));
        adj[b_idx].push((
            a_idx,
            weight,
            ShiftVector {
                pz: -sv.pz,
                py: -sv.py,
                px: -sv.px,
            },
        ));
    }

    let root = (0..n).find(|&i| grid.tile(i).nominal == (0, 0, 0)).unwrap_or(0);

    let mut finalized: Vec<Option<(f64, f64, f64)>> = vec![None; n];
    let mut accum: Vec<Vec<(f64, f64, f64)>> = vec![Vec::new(); n];
    let mut in_queue = vec![false; n];
    let mut queue = VecDeque::new();

    accum[root].push((0.0, 0.0, 0.0));
    in_queue[root] = true;
    queue.push_back(root);

    while let Some(cur) = queue.pop_front() {
        let sum = accum[cur]
            .iter()
            .fold((0.0, 0.0, 0.0), |a, v| (a.0 + v.0, a.1 + v.1, a.2 + v.2));
        let count = accum[cur].len() as f64;
        let abs = (sum.0 / count, sum.1 / count, sum.2 / count);
        finalized[cur] = Some(abs);

        for &(nbr, _weight, sv) in &adj[cur] {
            if finalized[nbr].is_some() {
                continue;
            }
            accum[nbr].push((abs.0 + sv.px, abs.1 + sv.py, abs.2 + sv.pz));
            if !in_queue[nbr] {
                in_queue[nbr] = true;
                queue.push_back(nbr);
            }
        }
    }

    let mut raw: Vec<(f64, f64, f64)> = Vec::with_capacity(n);
    for i in 0..n {
        match finalized[i] {
            Some(v) => raw.push(v),
            None => {
                let t = grid.tile(i);
                tracing::warn!(tile = %t.name.display(), "tile unreached by initial-position BFS, using nominal position");
                raw.push((t.nominal.0 as f64, t.nominal.1 as f64, t.nominal.2 as f64));
            }
        }
    }

    let min_x = raw.iter().map(|v| v.0).fold(f64::INFINITY, f64::min);
    let min_y = raw.iter().map(|v| v.1).fold(f64::INFINITY, f64::min);
    let min_z = raw.iter().map(|v| v.2).fold(f64::INFINITY, f64::min);

    for (i, (x, y, z)) in raw.into_iter().enumerate() {
        grid.tile_mut(i).absolute = Some(Absolute {
            xs: (x - min_x).round() as i64,
            ys: (y - min_y).round() as i64,
            zs: (z - min_z).round() as i64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ingest;
    use crate::pair::Axis;
    use crate::source::{FrameSource, MemoryFrameSource};
    use ndarray::Array3;
    use std::path::Path;
    use tempfile::tempdir;

    fn opener(_: &Path) -> crate::error::Result<Box<dyn FrameSource>> {
        Ok(Box::new(MemoryFrameSource::new(Array3::<f64>::zeros((5, 100, 100)))))
    }

    fn touch(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, []).unwrap();
        path
    }

    #[test]
    fn propagates_exact_shifts_over_a_2x2_grid() {
        let dir = tempdir().unwrap();
        let p00 = touch(dir.path(), "x_0_y_0_z_0.raw");
        let p01 = touch(dir.path(), "x_100_y_0_z_0.raw");
        let p10 = touch(dir.path(), "x_0_y_100_z_0.raw");
        let p11 = touch(dir.path(), "x_100_y_100_z_0.raw");
        let mut grid = ingest(dir.path(), true, true, &opener).unwrap();

        let pairs = vec![
            Pair { aname: p00.clone(), bname: p10.clone(), axis: Axis::South, dz: 0, dy: 80, dx: 2, score: 1.0 },
            Pair { aname: p00.clone(), bname: p01.clone(), axis: Axis::East, dz: 0, dy: 80, dx: 3, score: 1.0 },
            Pair { aname: p10, bname: p11.clone(), axis: Axis::East, dz: 0, dy: 80, dx: 1, score: 1.0 },
            Pair { aname: p01, bname: p11, axis: Axis::South, dz: 0, dy: 79, dx: 1, score: 1.0 },
        ];

        estimate_initial_positions(&mut grid, &pairs);

        for tile in grid.tiles() {
            assert!(tile.absolute.is_some());
        }
        let min_xs = grid.tiles().iter().map(|t| t.absolute.unwrap().xs).min().unwrap();
        let min_ys = grid.tiles().iter().map(|t| t.absolute.unwrap().ys).min().unwrap();
        assert_eq!(min_xs, 0);
        assert_eq!(min_ys, 0);
    }

    #[test]
    fn disconnected_tile_falls_back_to_nominal() {
        let dir = tempdir().unwrap();
        let p00 = touch(dir.path(), "x_0_y_0_z_0.raw");
        touch(dir.path(), "x_100_y_100_z_0.raw");
        let mut grid = ingest(dir.path(), true, true, &opener).unwrap();

        let pairs: Vec<Pair> = vec![];
        let _ = p00;
        estimate_initial_positions(&mut grid, &pairs);

        for tile in grid.tiles() {
            let abs = tile.absolute.unwrap();
            assert_eq!((abs.xs, abs.ys, abs.zs), tile.nominal);
        }
    }
}
