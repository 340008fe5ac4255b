//! Pair aligner (component C): picks overlap slabs from two adjacent tiles,
//! invokes the NCC engine, and extracts the best shift and score.
//!
//! Grounded on the original `stitch()` routine: Z-slab extraction around a
//! reference frame, a 90-degree rotation to normalize axis=2 onto axis=1
//! conventions, border cropping on both sides of the overlap, and signed
//! shift conversion from the raw arg-max indices.

use std::path::PathBuf;

use ndarray::{s, Array3};

use crate::error::Result;
use crate::ncc::{arg_max_nan_as_neg_inf, ncc3d};
use crate::pair::{Axis, Pair};
use crate::source::FrameSource;

/// Geometry parameters for one pair alignment job.
#[derive(Debug, Clone, Copy)]
pub struct AlignParams {
    /// Reference Z frame the search window is centered on.
    pub z_frame: usize,
    /// Nominal overlap, in pixels, along the stitching direction.
    pub overlap: usize,
    pub max_shift_z: usize,
    pub max_shift_x: usize,
}

/// Rotate every Z slice of `data` 90 degrees counterclockwise in the (Y, X)
/// plane, mapping axis=2 (east) geometry onto axis=1 (south) conventions.
pub fn rotate90(data: &Array3<f64>) -> Array3<f64> {
    let (z, rows, cols) = data.dim();
    let mut out = Array3::<f64>::zeros((z, cols, rows));
    for zi in 0..z {
        for i in 0..cols {
            for j in 0..rows {
                out[[zi, i, j]] = data[[zi, j, cols - 1 - i]];
            }
        }
    }
    out
}

/// Align tile `b` against tile `a` along `axis`, per the pair-aligner
/// procedure. Returns `Ok(None)` on pair underflow (the search or template
/// region degenerates to a non-positive size once cropped) — no record
/// should be emitted in that case.
pub fn align_pair(
    aname: PathBuf,
    bname: PathBuf,
    a: &dyn FrameSource,
    b: &dyn FrameSource,
    axis: Axis,
    params: &AlignParams,
) -> Result<Option<Pair>> {
    let z_from = match params.z_frame.checked_sub(params.max_shift_z) {
        Some(v) => v,
        None => return Ok(None),
    };
    let z_to = params.z_frame + params.max_shift_z + 1;

    let mut a_slab = a.layer(z_from, z_to)?;
    let mut b_frame = b.layer_idx(params.z_frame)?;

    if axis == Axis::East {
        a_slab = rotate90(&a_slab);
        b_frame = rotate90(&b_frame);
    }

    let (_, a_rows, _) = a_slab.dim();
    if params.overlap == 0 || params.overlap > a_rows {
        return Ok(None);
    }
    let a_crop = a_slab.slice(s![.., (a_rows - params.overlap).., ..]).to_owned();

    let (_, b_rows, b_cols) = b_frame.dim();
    let top_rows = params.overlap.min(b_rows);
    let b_top = b_frame.slice(s![.., ..top_rows, ..]).to_owned();

    let half_overlap = params.overlap / 2;
    let half_shift_x = params.max_shift_x / 2;
    if half_overlap == 0 || half_shift_x * 2 >= b_cols || half_overlap > top_rows {
        return Ok(None);
    }
    let template = b_top
        .slice(s![.., ..half_overlap, half_shift_x..(b_cols - half_shift_x)])
        .to_owned();

    let volume = match ncc3d(&a_crop, &template) {
        Some(v) => v,
        None => return Ok(None),
    };

    let (dz_idx, dy_idx, dx_idx, peak) = arg_max_nan_as_neg_inf(&volume);
    let score = if peak.is_finite() { peak } else { 0.0 };

    let dz = dz_idx as i64 - params.max_shift_z as i64;
    let dy = params.overlap as i64 - dy_idx as i64;
    let dx = dx_idx as i64 - half_shift_x as i64;

    Ok(Some(Pair {
        aname,
        bname,
        axis,
        dz,
        dy,
        dx,
        score,
    }))
}
