//! Richardson-Lucy iteration: alternating divide/reblur and
//! multiply/reblur passes against a per-pixel Gaussian kernel selected from
//! `KernelTable` by `SigmaIndexTable`.
//!
//! Grounded on `_blur_div` / `_blur_mul` in `capture.c`. The reference
//! implementation distinguishes a fast unrolled path for pixels whose full
//! 9x9 neighborhood lies in-bounds from a bounds-checked fallback near the
//! border; this port keeps that same two-path shape, with the fast path
//! skipping the per-sample bounds check rather than unrolling by hand.

use rayon::prelude::*;

use super::consts::CAPTURE_YMIN;
use super::kernel_table::KernelTable;
use super::types::SigmaIndexTable;

/// Convolve `plane` at `(row, col)` with the 9x9 kernel selected by
/// `sigma_idx`, clamping out-of-bounds taps to the nearest valid pixel
/// (equivalent to the reference's implicit zero-padding fallback, but
/// without the renormalization the reference also skips).
fn convolve_at(plane: &[f32], width: usize, height: usize, row: usize, col: usize, sigma_idx: u8, table: &KernelTable) -> f32 {
    let fast_path = col >= 4 && row >= 4 && col < width - 4 && row < height - 4;
    let mut sum = 0.0f32;

    if fast_path {
        for dr in -4i32..=4 {
            for dc in -4i32..=4 {
                let w = table.at(sigma_idx, dr.unsigned_abs() as usize, dc.unsigned_abs() as usize);
                if w == 0.0 {
                    continue;
                }
                let r = (row as i32 + dr) as usize;
                let c = (col as i32 + dc) as usize;
                sum += w * plane[r * width + c];
            }
        }
    } else {
        for dr in -4i32..=4 {
            let r = row as i32 + dr;
            if r < 0 || r >= height as i32 {
                continue;
            }
            for dc in -4i32..=4 {
                let c = col as i32 + dc;
                if c < 0 || c >= width as i32 {
                    continue;
                }
                let w = table.at(sigma_idx, dr.unsigned_abs() as usize, dc.unsigned_abs() as usize);
                sum += w * plane[r as usize * width + c as usize];
            }
        }
    }

    sum
}

/// Divide pass: reblur the current estimate and divide the observed
/// luminance by it, only where the blend mask says to sharpen at all.
/// Pixels with `blend <= 0` pass their previous value through unchanged.
pub fn blur_div(
    estimate: &[f32],
    luminance: &[f32],
    blend: &[f32],
    sigma_idx: &SigmaIndexTable,
    width: usize,
    height: usize,
) -> Vec<f32> {
    let table = KernelTable::get();
    (0..width * height)
        .into_par_iter()
        .map(|k| {
            if blend[k] <= 0.0 {
                return estimate[k];
            }
            let row = k / width;
            let col = k % width;
            let val = convolve_at(estimate, width, height, row, col, sigma_idx.get(row, col), table);
            luminance[k] / val.max(CAPTURE_YMIN)
        })
        .collect()
}

/// Multiply pass: reblur the divide-pass ratio and fold it back into the
/// estimate in place, only where `blend > 0`.
pub fn blur_mul(
    ratio: &[f32],
    blend: &[f32],
    sigma_idx: &SigmaIndexTable,
    width: usize,
    height: usize,
    estimate: &mut [f32],
) {
    let table = KernelTable::get();
    estimate.par_iter_mut().enumerate().for_each(|(k, out)| {
        if blend[k] <= 0.0 {
            return;
        }
        let row = k / width;
        let col = k % width;
        let val = convolve_at(ratio, width, height, row, col, sigma_idx.get(row, col), table);
        *out *= val;
    });
}

/// Run `iterations` rounds of divide/multiply deconvolution against
/// `luminance`, polling `cancelled` between rounds.
///
/// Returns the final estimate, or `None` if cancelled mid-iteration.
pub fn iterate(
    luminance: &[f32],
    blend: &[f32],
    sigma_idx: &SigmaIndexTable,
    width: usize,
    height: usize,
    iterations: u32,
    cancelled: &dyn Fn() -> bool,
) -> Option<Vec<f32>> {
    let mut estimate = luminance.to_vec();
    for _ in 0..iterations {
        if cancelled() {
            return None;
        }
        let ratio = blur_div(&estimate, luminance, blend, sigma_idx, width, height);
        blur_mul(&ratio, blend, sigma_idx, width, height, &mut estimate);
    }
    Some(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::capture_sharpen::sigma_index::precalc_gauss_idx;
    use crate::image_pipeline::capture_sharpen::types::Roi;

    #[test]
    fn zero_blend_leaves_estimate_untouched() {
        let width = 16;
        let height = 16;
        let luminance = vec![0.5f32; width * height];
        let blend = vec![0.0f32; width * height];
        let roi = Roi::full(width, height);
        let sigma_idx = precalc_gauss_idx(&roi, 1.0, 0.0, 0.0);
        let result = iterate(&luminance, &blend, &sigma_idx, width, height, 3, &|| false).unwrap();
        assert_eq!(result, luminance);
    }

    #[test]
    fn cancellation_stops_iteration_early() {
        let width = 16;
        let height = 16;
        let luminance = vec![0.5f32; width * height];
        let blend = vec![1.0f32; width * height];
        let roi = Roi::full(width, height);
        let sigma_idx = precalc_gauss_idx(&roi, 1.0, 0.0, 0.0);
        let result = iterate(&luminance, &blend, &sigma_idx, width, height, 5, &|| true);
        assert!(result.is_none());
    }

    #[test]
    fn flat_field_is_a_fixed_point() {
        let width = 20;
        let height = 20;
        let luminance = vec![0.4f32; width * height];
        let blend = vec![1.0f32; width * height];
        let roi = Roi::full(width, height);
        let sigma_idx = precalc_gauss_idx(&roi, 1.0, 0.0, 0.0);
        let result = iterate(&luminance, &blend, &sigma_idx, width, height, 4, &|| false).unwrap();
        for (a, b) in result.iter().zip(luminance.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
