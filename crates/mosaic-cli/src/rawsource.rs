//! Minimal on-disk frame source: a fixed little-endian header followed by
//! raw `f64` pixel data, in `(Z, Y, X)` row-major order. Grounded on
//! `jupiter-core::io::ser`'s header-then-frames layout, simplified to a
//! single fixed-size header since this format carries no per-frame
//! timestamps or color info.
//!
//! This is a reference reader, not a contract: any real deployment swaps it
//! for whatever adapter decodes the microscope's native tile format.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use mosaic_core::error::{Result, StitchError};
use mosaic_core::source::FrameSource;

const HEADER_LEN: usize = 24;

pub struct RawFileFrameSource {
    data: Array3<f64>,
}

impl RawFileFrameSource {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.len() < HEADER_LEN {
            return Err(StitchError::FrameRead {
                path: path.to_path_buf(),
                reason: "file shorter than the header".to_string(),
            });
        }
        let nfrms = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        let ysize = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
        let xsize = u64::from_le_bytes(bytes[16..24].try_into().unwrap()) as usize;

        let expected = nfrms * ysize * xsize;
        let body = &bytes[HEADER_LEN..];
        if body.len() < expected * 8 {
            return Err(StitchError::FrameRead {
                path: path.to_path_buf(),
                reason: format!("body has {} bytes, expected {}", body.len(), expected * 8),
            });
        }

        let mut values = Vec::with_capacity(expected);
        for chunk in body[..expected * 8].chunks_exact(8) {
            values.push(f64::from_le_bytes(chunk.try_into().unwrap()));
        }
        let data = Array3::from_shape_vec((nfrms, ysize, xsize), values).map_err(|e| StitchError::FrameRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(RawFileFrameSource { data })
    }
}

impl FrameSource for RawFileFrameSource {
    fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    fn layer(&self, z_from: usize, z_to: usize) -> Result<Array3<f64>> {
        let (nfrms, _, _) = self.data.dim();
        if z_from > z_to || z_to > nfrms {
            return Err(StitchError::FrameIndexOutOfRange { index: z_to, total: nfrms });
        }
        Ok(self.data.slice(ndarray::s![z_from..z_to, .., ..]).to_owned())
    }
}

/// Open `path` as a [`RawFileFrameSource`], boxed for use as the pipeline's
/// frame-source opener callback.
pub fn open(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(RawFileFrameSource::open(path)?))
}
