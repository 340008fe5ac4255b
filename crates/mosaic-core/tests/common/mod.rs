#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mosaic_core::error::Result;
use mosaic_core::source::{FrameSource, MemoryFrameSource};
use ndarray::Array3;

/// A deterministic, richly-textured 2D field so NCC correlation peaks are
/// unambiguous. Replicated across `nz` Z slices (optionally perturbed by
/// `noise`) to build a full tile volume.
pub fn world(ysize: usize, xsize: usize) -> Vec<f64> {
    let mut out = vec![0.0; ysize * xsize];
    for y in 0..ysize {
        for x in 0..xsize {
            out[y * xsize + x] = ((y * 31 + x * 17) % 97) as f64;
        }
    }
    out
}

/// Crop a `(ysize, xsize)`-shaped `world` plane at `(y0, x0)` into a
/// `(nz, h, w)` volume, replicating the plane across Z and adding `noise *
/// seed`-derived jitter (seed varies per tile so noise isn't identical across
/// tiles sharing an overlap).
pub fn crop_tile(
    world: &[f64],
    world_w: usize,
    y0: usize,
    x0: usize,
    h: usize,
    w: usize,
    nz: usize,
    noise: f64,
    seed: u64,
) -> Array3<f64> {
    let mut data = Array3::<f64>::zeros((nz, h, w));
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 1000) as f64 / 1000.0 - 0.5
    };
    for z in 0..nz {
        for y in 0..h {
            for x in 0..w {
                let base = world[(y0 + y) * world_w + (x0 + x)];
                data[[z, y, x]] = base + noise * next();
            }
        }
    }
    data
}

/// Builds a tile grid fixture: a directory of empty, name-parseable tile
/// files plus an opener backed by an in-memory map from path to volume, so
/// `grid::ingest`/the pipeline see realistic overlapping pixel data without
/// touching disk for anything but the directory walk.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    data: HashMap<PathBuf, Array3<f64>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            data: HashMap::new(),
        }
    }

    pub fn add_tile(&mut self, name: &str, volume: Array3<f64>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, []).unwrap();
        self.data.insert(path.clone(), volume);
        path
    }

    pub fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        Ok(Box::new(MemoryFrameSource::new(self.data[path].clone())))
    }
}
