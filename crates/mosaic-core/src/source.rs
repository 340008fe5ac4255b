//! Frame source adapter (component A): the boundary with the external image
//! reader. The registration pipeline only ever needs `layer`/`layer_idx`/
//! `dims`; file formats and channel selection are the caller's concern.

use ndarray::{s, Array3};

use crate::error::{Result, StitchError};

/// Read-only view over one opened tile's image stack.
pub trait FrameSource {
    /// `(nfrms, ysize, xsize)` of the first non-background channel.
    fn dims(&self) -> (usize, usize, usize);

    /// Load frames `[z_from, z_to)` as a `(z_to - z_from, ysize, xsize)`
    /// array. Errors if the range falls outside the stack.
    fn layer(&self, z_from: usize, z_to: usize) -> Result<Array3<f64>>;

    /// Load a single frame as a `(1, ysize, xsize)` array.
    fn layer_idx(&self, z: usize) -> Result<Array3<f64>> {
        self.layer(z, z + 1)
    }
}

/// In-memory [`FrameSource`] backed by a dense array, used in tests in place
/// of a real tile reader.
pub struct MemoryFrameSource {
    data: Array3<f64>,
}

impl MemoryFrameSource {
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }
}

impl FrameSource for MemoryFrameSource {
    fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    fn layer(&self, z_from: usize, z_to: usize) -> Result<Array3<f64>> {
        let (nfrms, _, _) = self.data.dim();
        if z_from > z_to || z_to > nfrms {
            return Err(StitchError::FrameIndexOutOfRange {
                index: z_to,
                total: nfrms,
            });
        }
        Ok(self.data.slice(s![z_from..z_to, .., ..]).to_owned())
    }
}
