//! Tile matrix: the nominal-coordinate grid of tiles (component D).
//!
//! Parses tile names, ingests a directory tree into a table of tiles, and
//! exposes the row/column indexing and south/east neighbor lookups that the
//! pair aligner and the optimizer build on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, StitchError};
use crate::source::FrameSource;
use crate::tile::Tile;

fn xyz_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)x_(\d+).*y_(\d+).*z_(\d+)").expect("valid regex"))
}

fn prefix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)_(\d+)_(\d+)").expect("valid regex"))
}

/// Parse the nominal `(X, Y, Z)` stage coordinates, in micrometers, out of a
/// tile's file stem. Accepts `…x_<int>…y_<int>…z_<int>…` or a leading
/// `<int>_<int>_<int>` prefix; returns `None` if neither matches.
pub fn parse_nominal(stem: &str) -> Option<(i64, i64, i64)> {
    let caps = xyz_pattern().captures(stem).or_else(|| prefix_pattern().captures(stem))?;
    let x = caps[1].parse().ok()?;
    let y = caps[2].parse().ok()?;
    let z = caps[3].parse().ok()?;
    Some((x, y, z))
}

/// The regular 2D mosaic of tiles, indexed by (row, col) derived from the
/// unique nominal Y and X values respectively.
pub struct TileGrid {
    tiles: Vec<Tile>,
    rows: usize,
    cols: usize,
    by_name: HashMap<PathBuf, usize>,
    by_rowcol: HashMap<(usize, usize), usize>,
}

impl TileGrid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, idx: usize) -> &Tile {
        &self.tiles[idx]
    }

    pub fn tile_mut(&mut self, idx: usize) -> &mut Tile {
        &mut self.tiles[idx]
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn index_by_name(&self, name: &Path) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn index_at(&self, row: usize, col: usize) -> Option<usize> {
        self.by_rowcol.get(&(row, col)).copied()
    }

    /// Index of tile at `(row, col)`'s `row` and `col`, given a tile index.
    pub fn row_col_of(&self, idx: usize) -> (usize, usize) {
        let t = &self.tiles[idx];
        // Recomputed from nominal rather than stored, since the grid is
        // small and this keeps a single source of truth.
        let mut ys: Vec<i64> = self.tiles.iter().map(|t| t.nominal.1).collect();
        ys.sort_unstable();
        ys.dedup();
        let mut xs: Vec<i64> = self.tiles.iter().map(|t| t.nominal.0).collect();
        xs.sort_unstable();
        xs.dedup();
        let row = ys.binary_search(&t.nominal.1).unwrap();
        let col = xs.binary_search(&t.nominal.0).unwrap();
        (row, col)
    }

    /// The tile directly south (same X, next larger Y) of `idx`, if any.
    pub fn south_of(&self, idx: usize) -> Option<usize> {
        let (row, col) = self.row_col_of(idx);
        self.index_at(row + 1, col)
    }

    /// The tile directly east (same Y, next larger X) of `idx`, if any.
    pub fn east_of(&self, idx: usize) -> Option<usize> {
        let (row, col) = self.row_col_of(idx);
        self.index_at(row, col + 1)
    }

    pub fn north_of(&self, idx: usize) -> Option<usize> {
        let (row, col) = self.row_col_of(idx);
        if row == 0 {
            return None;
        }
        self.index_at(row - 1, col)
    }

    pub fn west_of(&self, idx: usize) -> Option<usize> {
        let (row, col) = self.row_col_of(idx);
        if col == 0 {
            return None;
        }
        self.index_at(row, col - 1)
    }

    /// All (south-neighbor, east-neighbor) adjacency pairs that exist, as
    /// `(a_idx, b_idx, axis)` — drives the pair aligner.
    pub fn neighbor_pairs(&self) -> Vec<(usize, usize, crate::pair::Axis)> {
        use crate::pair::Axis;
        let mut out = Vec::new();
        for idx in 0..self.tiles.len() {
            if let Some(s) = self.south_of(idx) {
                out.push((idx, s, Axis::South));
            }
            if let Some(e) = self.east_of(idx) {
                out.push((idx, e, Axis::East));
            }
        }
        out
    }

    /// Connected components of tiles whose Z ranges transitively overlap.
    /// Each inner `Vec<usize>` is a slice's tile indices.
    pub fn slices(&self) -> Vec<Vec<usize>> {
        let n = self.tiles.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], x: usize) -> usize {
            if parent[x] != x {
                parent[x] = find(parent, parent[x]);
            }
            parent[x]
        }
        fn union(parent: &mut [usize], a: usize, b: usize) {
            let ra = find(parent, a);
            let rb = find(parent, b);
            if ra != rb {
                parent[ra] = rb;
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let (za0, za1) = (self.tiles[i].nominal.2, self.tiles[i].nominal_z_end());
                let (zb0, zb1) = (self.tiles[j].nominal.2, self.tiles[j].nominal_z_end());
                if za0 < zb1 && zb0 < za1 {
                    union(&mut parent, i, j);
                }
            }
        }

        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            groups.entry(root).or_default().push(i);
        }
        let mut result: Vec<Vec<usize>> = groups.into_values().collect();
        result.sort_by_key(|g| g[0]);
        result
    }

    /// Validate that every tile within each slice shares the same
    /// `(xsize, ysize, nfrms)` (a fatal precondition).
    pub fn check_slice_size_consistency(&self) -> Result<()> {
        for slice in self.slices() {
            let first = self.tiles[slice[0]].size();
            for &idx in &slice {
                if self.tiles[idx].size() != first {
                    return Err(StitchError::InconsistentTileSize(format!(
                        "{:?} has size {:?}, expected {:?} to match {:?}",
                        self.tiles[idx].name,
                        self.tiles[idx].size(),
                        first,
                        self.tiles[slice[0]].name,
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Walk `dir` recursively, open each candidate file via `open`, and build a
/// [`TileGrid`] out of the ones whose names parse successfully.
///
/// `ascending_x`/`ascending_y` control whether the stage axes increase with
/// the physical direction of travel; when `false`, coordinates are reflected
/// about their maximum before normalization.
pub fn ingest(
    dir: &Path,
    ascending_x: bool,
    ascending_y: bool,
    open: &dyn Fn(&Path) -> Result<Box<dyn FrameSource>>,
) -> Result<TileGrid> {
    if !dir.is_dir() {
        return Err(StitchError::Pipeline(format!("missing directory: {}", dir.display())));
    }

    let mut raw: Vec<(PathBuf, (i64, i64, i64), usize, usize, usize)> = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&d)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        for path in entries {
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            let nominal = match parse_nominal(stem) {
                Some(n) => n,
                None => {
                    tracing::warn!(path = %path.display(), "invalid tile name, skipping");
                    continue;
                }
            };
            let source = match open(&path) {
                Ok(s) => s,
                Err(err) => {
                    tracing::error!(path = %path.display(), error = %err, "failed to read frame data, dropping tile");
                    continue;
                }
            };
            let (nfrms, ysize, xsize) = source.dims();
            raw.push((path, nominal, xsize, ysize, nfrms));
        }
    }

    if raw.is_empty() {
        return Err(StitchError::EmptyTileTable);
    }

    let x_min = raw.iter().map(|t| t.1 .0).min().unwrap();
    let x_max = raw.iter().map(|t| t.1 .0).max().unwrap();
    let y_min = raw.iter().map(|t| t.1 .1).min().unwrap();
    let y_max = raw.iter().map(|t| t.1 .1).max().unwrap();
    let z_min = raw.iter().map(|t| t.1 .2).min().unwrap();

    let mut tiles: Vec<Tile> = raw
        .into_iter()
        .map(|(path, (x, y, z), xsize, ysize, nfrms)| {
            let nx = if ascending_x { x - x_min } else { x_max - x };
            let ny = if ascending_y { y - y_min } else { y_max - y };
            let nz = z - z_min;
            Tile::new(path, (nx, ny, nz), xsize, ysize, nfrms)
        })
        .collect();

    tiles.sort_by_key(|t| (t.nominal.1, t.nominal.0));

    let mut ys_unique: Vec<i64> = tiles.iter().map(|t| t.nominal.1).collect();
    ys_unique.sort_unstable();
    ys_unique.dedup();
    let mut xs_unique: Vec<i64> = tiles.iter().map(|t| t.nominal.0).collect();
    xs_unique.sort_unstable();
    xs_unique.dedup();

    let mut by_name = HashMap::new();
    let mut by_rowcol = HashMap::new();
    for (idx, t) in tiles.iter().enumerate() {
        let row = ys_unique.binary_search(&t.nominal.1).unwrap();
        let col = xs_unique.binary_search(&t.nominal.0).unwrap();
        by_rowcol.insert((row, col), idx);
        by_name.insert(t.name.clone(), idx);
    }

    let grid = TileGrid {
        tiles,
        rows: ys_unique.len(),
        cols: xs_unique.len(),
        by_name,
        by_rowcol,
    };
    grid.check_slice_size_consistency()?;
    Ok(grid)
}
