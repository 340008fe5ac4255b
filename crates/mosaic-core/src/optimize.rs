//! Global optimizer (component F): simulated-annealing minimization of the
//! score-weighted sum of squared residuals over the full mosaic decision
//! vector.
//!
//! Grounded on the original archipelago-of-simulated-annealing approach:
//! several independent islands search the same problem from the same warm
//! start, and the lowest-cost champion wins. Implemented here as Rayon
//! tasks rather than a dedicated island-model library, mirroring how the
//! pair-alignment pool parallelizes independent per-pair work elsewhere in
//! this crate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::OptimizerConfig;
use crate::grid::TileGrid;
use crate::pair::{Axis, Pair, ShiftVector};
use crate::tile::Absolute;

/// A `(px, py, pz)` triple, used both for decision-vector cells and decoded
/// absolute positions.
pub type Vec3 = (f64, f64, f64);

/// A dense `(rows, cols)` grid of [`Vec3`] cells — either the decision
/// vector `x` or the decoded tile positions.
pub type Grid3 = Vec<Vec<Vec3>>;

fn add(a: Vec3, b: Vec3) -> Vec3 {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    (a.0 - b.0, a.1 - b.1, a.2 - b.2)
}

fn norm_sq(v: Vec3) -> f64 {
    v.0 * v.0 + v.1 * v.1 + v.2 * v.2
}

/// Reconstruct absolute tile positions from the decision vector: the first
/// row is a cumulative sum across columns, then every row is a cumulative
/// sum down from the row above.
pub fn decode(x: &Grid3) -> Grid3 {
    let rows = x.len();
    let cols = if rows > 0 { x[0].len() } else { 0 };
    let mut tiles = vec![vec![(0.0, 0.0, 0.0); cols]; rows];
    if rows == 0 || cols == 0 {
        return tiles;
    }

    let mut acc = (0.0, 0.0, 0.0);
    for c in 0..cols {
        acc = add(acc, x[0][c]);
        tiles[0][c] = acc;
    }
    for r in 1..rows {
        for c in 0..cols {
            tiles[r][c] = add(tiles[r - 1][c], x[r][c]);
        }
    }
    tiles
}

/// Inverse of [`decode`]: recover the per-cell incremental displacements
/// implied by an absolute-position grid with `tiles[0][0] == (0, 0, 0)`.
pub fn encode(tiles: &Grid3) -> Grid3 {
    let rows = tiles.len();
    let cols = if rows > 0 { tiles[0].len() } else { 0 };
    let mut x = vec![vec![(0.0, 0.0, 0.0); cols]; rows];
    if rows == 0 || cols == 0 {
        return x;
    }

    for c in 1..cols {
        x[0][c] = sub(tiles[0][c], tiles[0][c - 1]);
    }
    for r in 1..rows {
        for c in 0..cols {
            x[r][c] = sub(tiles[r][c], tiles[r - 1][c]);
        }
    }
    x
}

struct Bounds {
    px: (f64, f64),
    py: (f64, f64),
    pz: (f64, f64),
}

/// Per-cell bounds: cell (0,0) is pinned to zero (no bounds); the rest of
/// row 0 encodes east increments, every other row encodes south increments.
fn bounds_for(row: usize, col: usize, cfg: &OptimizerConfig) -> Option<Bounds> {
    if row == 0 && col == 0 {
        return None;
    }
    if row == 0 {
        Some(Bounds {
            px: cfg.bound_along_overlap,
            py: cfg.bound_lateral,
            pz: cfg.bound_pz,
        })
    } else {
        Some(Bounds {
            px: cfg.bound_lateral,
            py: cfg.bound_along_overlap,
            pz: cfg.bound_pz,
        })
    }
}

/// Per-direction observed shifts and scores, indexed by the originating
/// tile's (row, col).
struct PairGrids {
    rows: usize,
    cols: usize,
    south: Vec<Vec<Option<ShiftVector>>>,
    south_score: Vec<Vec<f64>>,
    east: Vec<Vec<Option<ShiftVector>>>,
    east_score: Vec<Vec<f64>>,
}

fn build_pair_grids(grid: &TileGrid, pairs: &[Pair]) -> PairGrids {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut south = vec![vec![None; cols]; rows];
    let mut south_score = vec![vec![0.0; cols]; rows];
    let mut east = vec![vec![None; cols]; rows];
    let mut east_score = vec![vec![0.0; cols]; rows];

    for pair in pairs {
        let Some(a_idx) = grid.index_by_name(&pair.aname) else {
            continue;
        };
        let a_tile = grid.tile(a_idx);
        let sv = pair.shift_vector(a_tile.xsize, a_tile.ysize);
        let (row, col) = grid.row_col_of(a_idx);
        match pair.axis {
            Axis::South => {
                south[row][col] = Some(sv);
                south_score[row][col] = pair.score;
            }
            Axis::East => {
                east[row][col] = Some(sv);
                east_score[row][col] = pair.score;
            }
        }
    }

    PairGrids {
        rows,
        cols,
        south,
        south_score,
        east,
        east_score,
    }
}

fn warm_start(grids: &PairGrids) -> Grid3 {
    let mut x0 = vec![vec![(0.0, 0.0, 0.0); grids.cols]; grids.rows];
    for c in 1..grids.cols {
        if let Some(sv) = grids.east[0][c - 1] {
            x0[0][c] = (sv.px, sv.py, sv.pz);
        }
    }
    for r in 1..grids.rows {
        for c in 0..grids.cols {
            if let Some(sv) = grids.south[r - 1][c] {
                x0[r][c] = (sv.px, sv.py, sv.pz);
            }
        }
    }
    x0
}

/// Score-weighted sum of squared residuals between `decode(x)` and the
/// observed pairwise shifts. Out-of-grid and missing-pair terms contribute
/// zero.
fn cost(x: &Grid3, grids: &PairGrids) -> f64 {
    let tiles = decode(x);
    let mut total = 0.0;
    for r in 0..grids.rows {
        for c in 0..grids.cols {
            if r + 1 < grids.rows {
                if let Some(p) = grids.south[r][c] {
                    let observed = (p.px, p.py, p.pz);
                    let residual = sub(sub(tiles[r + 1][c], tiles[r][c]), observed);
                    total += grids.south_score[r][c] * norm_sq(residual);
                }
            }
            if c + 1 < grids.cols {
                if let Some(p) = grids.east[r][c] {
                    let observed = (p.px, p.py, p.pz);
                    let residual = sub(sub(tiles[r][c + 1], tiles[r][c]), observed);
                    total += grids.east_score[r][c] * norm_sq(residual);
                }
            }
        }
    }
    total
}

fn perturb(val: f64, bound: (f64, f64), temp: f64, ts: f64, rng: &mut StdRng) -> f64 {
    let span = (bound.1 - bound.0).abs().max(1e-6);
    let scale = span * (temp / ts).clamp(1e-3, 1.0);
    let delta = rng.gen_range(-scale..=scale);
    (val + delta).clamp(bound.0.min(bound.1), bound.0.max(bound.1))
}

/// Run one simulated-annealing island from `x0`, returning the lowest-cost
/// grid it found (never worse than `x0` itself).
fn run_island(x0: &Grid3, grids: &PairGrids, cfg: &OptimizerConfig, seed: u64) -> (Grid3, f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = x0.clone();
    let mut cur_cost = cost(&x, grids);
    let mut best = x.clone();
    let mut best_cost = cur_cost;

    if grids.rows == 0 || grids.cols == 0 {
        return (best, best_cost);
    }

    let total_steps = (cfg.n_t_adj * cfg.evolution_rounds).max(1);
    for step in 0..total_steps {
        let frac = step as f64 / total_steps as f64;
        let temp = cfg.ts * (cfg.tf / cfg.ts).powf(frac);

        let row = rng.gen_range(0..grids.rows);
        let col = rng.gen_range(0..grids.cols);
        let Some(bounds) = bounds_for(row, col, cfg) else {
            continue;
        };

        let old = x[row][col];
        x[row][col] = (
            perturb(old.0, bounds.px, temp, cfg.ts, &mut rng),
            perturb(old.1, bounds.py, temp, cfg.ts, &mut rng),
            perturb(old.2, bounds.pz, temp, cfg.ts, &mut rng),
        );

        let new_cost = cost(&x, grids);
        let accept = new_cost <= cur_cost
            || rng.gen::<f64>() < ((cur_cost - new_cost) / temp.max(1e-12)).exp();

        if accept {
            cur_cost = new_cost;
            if cur_cost < best_cost {
                best_cost = cur_cost;
                best = x.clone();
            }
        } else {
            x[row][col] = old;
        }
    }

    (best, best_cost)
}

/// Run the full global optimizer: build the warm start from `pairs`, run
/// `cfg.islands` independent SA searches, and write the champion's decoded
/// absolute positions back into `grid`. Guaranteed `cost(champion) <=
/// cost(warm_start)` — falls back to the warm start outright otherwise.
pub fn optimize(grid: &mut TileGrid, pairs: &[Pair], cfg: &OptimizerConfig) {
    let grids = build_pair_grids(grid, pairs);
    if grids.rows == 0 || grids.cols == 0 {
        return;
    }
    let x0 = warm_start(&grids);
    let warm_cost = cost(&x0, &grids);

    let champion = (0..cfg.islands)
        .into_par_iter()
        .map(|i| run_island(&x0, &grids, cfg, cfg.seed.wrapping_add(i as u64)))
        .reduce(
            || (x0.clone(), f64::INFINITY),
            |a, b| if a.1 <= b.1 { a } else { b },
        );

    let (champ_x, champ_cost) = champion;
    let final_x = if champ_cost <= warm_cost { champ_x } else { x0 };
    let tiles = decode(&final_x);

    let min_x = tiles.iter().flatten().map(|v| v.0).fold(f64::INFINITY, f64::min);
    let min_y = tiles.iter().flatten().map(|v| v.1).fold(f64::INFINITY, f64::min);
    let min_z = tiles.iter().flatten().map(|v| v.2).fold(f64::INFINITY, f64::min);

    for row in 0..grids.rows {
        for col in 0..grids.cols {
            if let Some(idx) = grid.index_at(row, col) {
                let (x, y, z) = tiles[row][col];
                grid.tile_mut(idx).absolute = Some(Absolute {
                    xs: (x - min_x).round() as i64,
                    ys: (y - min_y).round() as i64,
                    zs: (z - min_z).round() as i64,
                });
            }
        }
    }
}
