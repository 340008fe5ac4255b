//! Normalized cross-correlation engine.
//!
//! Computes the 3D NCC volume of a template against a search region via FFT,
//! one Z slice at a time (Z alignment is the caller's responsibility).
//! Grounded on the cross-power-spectrum structure of
//! `jupiter-core::align::phase_correlation`, generalized from phase-only
//! normalization to a box-kernel-convolution formulation of NCC.

use ndarray::{s, Array2, Array3};
use num_complex::Complex;
use rayon::prelude::*;

use crate::consts::EPSILON;
use crate::fft::{fft2d_forward_padded, ifft2d_inverse};

/// Compute the NCC volume of `template` (`B`) against `search` (`A`).
///
/// `search` has shape `(Z, Y_A, X_A)`, `template` has shape `(Z, Y_B, X_B)`
/// with equal Z. The output has shape `(Z, Y_A - Y_B + 1, X_A - X_B + 1)`.
/// Positions where the template variance is zero yield `NaN`; callers must
/// treat `NaN` as `-inf` for arg-max purposes.
///
/// Returns `None` if any output dimension would be non-positive (pair
/// underflow — the template no longer fits inside the search region).
pub fn ncc3d(search: &Array3<f64>, template: &Array3<f64>) -> Option<Array3<f64>> {
    let (za, ya, xa) = search.dim();
    let (zb, yb, xb) = template.dim();
    assert_eq!(za, zb, "search and template must share the Z dimension");

    if ya < yb || xa < xb || za == 0 {
        return None;
    }
    let out_h = ya - yb + 1;
    let out_w = xa - xb + 1;
    if out_h == 0 || out_w == 0 {
        return None;
    }

    let slices: Vec<Array2<f64>> = (0..za)
        .into_par_iter()
        .map(|z| {
            let a = search.slice(s![z, .., ..]).to_owned();
            let b = template.slice(s![z, .., ..]).to_owned();
            ncc2d(&a, &b, out_h, out_w)
        })
        .collect();

    let mut result = Array3::<f64>::zeros((za, out_h, out_w));
    for (z, slice) in slices.into_iter().enumerate() {
        result.slice_mut(s![z, .., ..]).assign(&slice);
    }
    Some(result)
}

/// Single-Z-slice NCC via the FFT box-kernel convolution trick.
fn ncc2d(a: &Array2<f64>, b: &Array2<f64>, out_h: usize, out_w: usize) -> Array2<f64> {
    let (ya, xa) = a.dim();
    let (yb, xb) = b.dim();
    let ones_b = Array2::<f64>::ones((yb, xb));
    let a_sq = a.mapv(|v| v * v);

    let f_a = fft2d_forward_padded(a, ya, xa);
    let f_a2 = fft2d_forward_padded(&a_sq, ya, xa);
    let f_b = fft2d_forward_padded(b, ya, xa);
    let f_1 = fft2d_forward_padded(&ones_b, ya, xa);

    let conv_full = ifft2d_inverse(&cross_conj(&f_a, &f_b));
    let sum_a_full = ifft2d_inverse(&cross_conj(&f_a, &f_1));
    let sum_a2_full = ifft2d_inverse(&cross_conj(&f_a2, &f_1));

    let sum_b: f64 = b.sum();
    let sum_b2: f64 = b.iter().map(|v| v * v).sum();
    let n = (yb * xb) as f64;
    let var_b = sum_b2 - sum_b * sum_b / n;

    let mut result = Array2::<f64>::zeros((out_h, out_w));
    for y in 0..out_h {
        for x in 0..out_w {
            let conv = conv_full[[y, x]];
            let sum_a = sum_a_full[[y, x]];
            let sum_a2 = sum_a2_full[[y, x]];

            let num = conv - sum_b * sum_a / n;
            let var_a = sum_a2 - sum_a * sum_a / n;
            let den = (var_a * var_b).sqrt();

            result[[y, x]] = if den > EPSILON { num / den } else { f64::NAN };
        }
    }
    result
}

fn cross_conj(a: &Array2<Complex<f64>>, b: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = a.dim();
    let mut out = Array2::<Complex<f64>>::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            out[[r, c]] = a[[r, c]] * b[[r, c]].conj();
        }
    }
    out
}

/// Find the arg-max of a 3D NCC volume, treating `NaN` as `-inf`.
///
/// Returns `(z, y, x, value)` of the first maximal element encountered in
/// row-major (z, y, x) order.
pub fn arg_max_nan_as_neg_inf(volume: &Array3<f64>) -> (usize, usize, usize, f64) {
    let (zd, yd, xd) = volume.dim();
    let mut best = (0, 0, 0, f64::NEG_INFINITY);
    for z in 0..zd {
        for y in 0..yd {
            for x in 0..xd {
                let v = volume[[z, y, x]];
                let v = if v.is_nan() { f64::NEG_INFINITY } else { v };
                if v > best.3 {
                    best = (z, y, x, v);
                }
            }
        }
    }
    best
}
