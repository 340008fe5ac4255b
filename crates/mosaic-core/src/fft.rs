//! Shared 2D FFT helpers used by the normalized cross-correlation engine.
//! Operates in double precision throughout, batching rows/columns with
//! Rayon for large transforms the same way `jupiter-core`'s `compute::cpu`
//! module batches its forward/inverse 2D FFTs.

use ndarray::Array2;
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::FftPlanner;
use std::sync::Arc;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Zero-pad `data` into a `(out_h, out_w)` canvas, then compute its forward
/// 2D FFT. `out_h`/`out_w` must be `>=` `data`'s own dimensions.
pub fn fft2d_forward_padded(data: &Array2<f64>, out_h: usize, out_w: usize) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    debug_assert!(out_h >= h && out_w >= w);

    let mut padded = Array2::<Complex<f64>>::zeros((out_h, out_w));
    for row in 0..h {
        for col in 0..w {
            padded[[row, col]] = Complex::new(data[[row, col]], 0.0);
        }
    }
    fft2d_forward_complex(padded)
}

/// Forward 2D FFT of an already-complex array (no padding).
pub fn fft2d_forward_complex(mut data: Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        transform_rows_then_cols_parallel(&mut data, &fft_row, &fft_col, h, w);
    } else {
        transform_rows_then_cols_sequential(&mut data, &fft_row, &fft_col, h, w);
    }

    data
}

/// 2D inverse FFT, returning the real part normalized by `1/(h*w)`.
pub fn ifft2d_inverse(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        transform_cols_then_rows_parallel(&mut work, &ifft_col, &ifft_row, h, w);
    } else {
        transform_cols_then_rows_sequential(&mut work, &ifft_col, &ifft_row, h, w);
    }

    let scale = 1.0 / (h * w) as f64;
    let mut result = Array2::<f64>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            result[[row, col]] = work[[row, col]].re * scale;
        }
    }

    result
}

fn transform_rows_then_cols_parallel(
    data: &mut Array2<Complex<f64>>,
    fft_row: &Arc<dyn rustfft::Fft<f64>>,
    fft_col: &Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    let rows: Vec<Vec<Complex<f64>>> = (0..h)
        .into_par_iter()
        .map(|row| {
            let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| data[[row, c]]).collect();
            fft_row.process(&mut row_data);
            row_data
        })
        .collect();
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }

    let cols: Vec<Vec<Complex<f64>>> = (0..w)
        .into_par_iter()
        .map(|col| {
            let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| data[[r, col]]).collect();
            fft_col.process(&mut col_data);
            col_data
        })
        .collect();
    for (col, col_data) in cols.into_iter().enumerate() {
        for (row, val) in col_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
}

fn transform_rows_then_cols_sequential(
    data: &mut Array2<Complex<f64>>,
    fft_row: &Arc<dyn rustfft::Fft<f64>>,
    fft_col: &Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| data[[row, c]]).collect();
        fft_row.process(&mut row_data);
        for (col, val) in row_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| data[[r, col]]).collect();
        fft_col.process(&mut col_data);
        for (row, val) in col_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
}

fn transform_cols_then_rows_parallel(
    data: &mut Array2<Complex<f64>>,
    ifft_col: &Arc<dyn rustfft::Fft<f64>>,
    ifft_row: &Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    let cols: Vec<Vec<Complex<f64>>> = (0..w)
        .into_par_iter()
        .map(|col| {
            let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| data[[r, col]]).collect();
            ifft_col.process(&mut col_data);
            col_data
        })
        .collect();
    for (col, col_data) in cols.into_iter().enumerate() {
        for (row, val) in col_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }

    let rows: Vec<Vec<Complex<f64>>> = (0..h)
        .into_par_iter()
        .map(|row| {
            let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| data[[row, c]]).collect();
            ifft_row.process(&mut row_data);
            row_data
        })
        .collect();
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
}

fn transform_cols_then_rows_sequential(
    data: &mut Array2<Complex<f64>>,
    ifft_col: &Arc<dyn rustfft::Fft<f64>>,
    ifft_row: &Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| data[[r, col]]).collect();
        ifft_col.process(&mut col_data);
        for (row, val) in col_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| data[[row, c]]).collect();
        ifft_row.process(&mut row_data);
        for (col, val) in row_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_then_inverse_round_trips() {
        let mut data = Array2::<f64>::zeros((8, 8));
        for r in 2..5 {
            for c in 1..4 {
                data[[r, c]] = 1.0;
            }
        }
        let spectrum = fft2d_forward_padded(&data, 8, 8);
        let back = ifft2d_inverse(&spectrum);
        for r in 0..8 {
            for c in 0..8 {
                assert!((back[[r, c]] - data[[r, c]]).abs() < 1e-9);
            }
        }
    }
}
