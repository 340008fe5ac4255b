//! Tile data model: a single 3D image stack at a nominal mosaic position,
//! with an absolute position assigned once registration completes.

use std::path::PathBuf;

/// Absolute (post-registration) position of a tile, in the common
/// coordinate frame shared by the whole mosaic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Absolute {
    pub xs: i64,
    pub ys: i64,
    pub zs: i64,
}

impl Absolute {
    /// `(Xs_end, Ys_end, Zs_end)` given this tile's `(xsize, ysize, nfrms)`.
    pub fn end(&self, size: (usize, usize, usize)) -> (i64, i64, i64) {
        (
            self.xs + size.0 as i64,
            self.ys + size.1 as i64,
            self.zs + size.2 as i64,
        )
    }
}

/// One tile: a 3D image stack identified by its file name.
#[derive(Debug, Clone)]
pub struct Tile {
    pub name: PathBuf,
    /// Nominal (X, Y, Z) stage coordinates, normalized so the mosaic's
    /// top-left-front tile sits at (0, 0, 0).
    pub nominal: (i64, i64, i64),
    pub xsize: usize,
    pub ysize: usize,
    pub nfrms: usize,
    pub absolute: Option<Absolute>,
}

impl Tile {
    pub fn new(
        name: PathBuf,
        nominal: (i64, i64, i64),
        xsize: usize,
        ysize: usize,
        nfrms: usize,
    ) -> Self {
        Self {
            name,
            nominal,
            xsize,
            ysize,
            nfrms,
            absolute: None,
        }
    }

    pub fn size(&self) -> (usize, usize, usize) {
        (self.xsize, self.ysize, self.nfrms)
    }

    pub fn nominal_z_end(&self) -> i64 {
        self.nominal.2 + self.nfrms as i64
    }

    pub fn absolute_end(&self) -> Option<(i64, i64, i64)> {
        self.absolute.map(|a| a.end(self.size()))
    }
}
