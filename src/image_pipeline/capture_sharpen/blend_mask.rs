//! Blend-mask construction: clip/low-luminance rhombus dilation, local
//! variance-based logistic weighting, Gaussian smoothing and sigmoid
//! reinforcement.
//!
//! Grounded on `_prepare_blend` / `_modify_blend` and the mask-smoothing and
//! reinforcement loop in `_capture_sharpen` in `capture.c`.

use rayon::prelude::*;

use super::consts::CAPTURE_YMIN;
use super::types::{CfaPlane, Roi, SensorPattern};

const BT709: [f32; 3] = [0.212671, 0.715160, 0.072169];

/// Luminance plane, blend mask (both length `width*height`) and the CFA
/// whitepoint threshold per color channel, as produced by `prepare_blend`.
pub struct PreparedBlend {
    pub luminance: Vec<f32>,
    pub mask: Vec<f32>,
}

/// Seed the luminance plane and blend mask from a provisional demosaic.
///
/// `whites` gives the per-channel clip threshold (already scaled by
/// `CAPTURE_CFACLIP`). Pixels whose raw CFA sample is clipped, or whose
/// luminance is near zero, zero out a 21-cell rhombus of the mask centered
/// on them; all border pixels are zeroed unconditionally.
pub fn prepare_blend(
    cfa: &CfaPlane,
    rgb: &[f32],
    roi: &Roi,
    sensor: &SensorPattern,
    whites: [f32; 3],
) -> PreparedBlend {
    let width = roi.width;
    let height = roi.height;
    let mut luminance = vec![0.0f32; width * height];
    let mut mask = vec![1.0f32; width * height];

    luminance
        .par_iter_mut()
        .enumerate()
        .for_each(|(k, y)| {
            let base = k * 4;
            *y = (BT709[0] * rgb[base] + BT709[1] * rgb[base + 1] + BT709[2] * rgb[base + 2]).max(0.0);
        });

    for row in 0..height {
        for col in 0..width {
            let k = row * width + col;
            let interior = row > 1 && col > 1 && row < height - 2 && col < width - 2;
            if !interior {
                mask[k] = 0.0;
                continue;
            }

            let color = sensor.color_at(row, col, roi) as usize;
            let clipped = cfa.get(row, col) > whites[color.min(2)];
            if clipped || luminance[k] < CAPTURE_YMIN {
                zero_rhombus(&mut mask, k, width);
            }
        }
    }

    PreparedBlend { luminance, mask }
}

/// The 21-cell rhombus of mask indices zeroed around an interior pixel when
/// it (or a neighbor within the rhombus) is clipped or too dark.
fn zero_rhombus(mask: &mut [f32], k: usize, width: usize) {
    let w1 = width;
    let w2 = width * 2;
    let offsets: [isize; 21] = [
        -(w2 as isize) - 1,
        -(w2 as isize),
        -(w2 as isize) + 1,
        -(w1 as isize) - 2,
        -(w1 as isize) - 1,
        -(w1 as isize),
        -(w1 as isize) + 1,
        -(w1 as isize) + 2,
        -2,
        -1,
        0,
        1,
        2,
        w1 as isize - 2,
        w1 as isize - 1,
        w1 as isize,
        w1 as isize + 1,
        w1 as isize + 2,
        w2 as isize - 1,
        w2 as isize,
        w2 as isize + 1,
    ];
    for off in offsets {
        let idx = k as isize + off;
        if idx >= 0 && (idx as usize) < mask.len() {
            mask[idx as usize] = 0.0;
        }
    }
}

/// Reweight the blend mask by local coefficient-of-variation of luminance.
///
/// `dthresh` is the user-facing detail threshold; low-variance (flat, likely
/// noise-only) neighborhoods get pushed toward zero blend weight.
pub fn modify_blend(mask: &mut [f32], luminance: &mut [f32], dthresh: f32, width: usize, height: usize) {
    let threshold = 0.6 * dthresh * dthresh;
    let tscale = 200.0f32;
    let offset = -2.5 + tscale * threshold / 2.0;

    let source = luminance.to_vec();
    let updated: Vec<f32> = (0..width * height)
        .into_par_iter()
        .map(|k| {
            let row = (k / width).clamp(2, height.saturating_sub(3));
            let col = (k % width).clamp(2, width.saturating_sub(3));

            let mut sum = 0.0f32;
            let mut sum_sq = 0.0f32;
            for y in row - 1..row + 2 {
                for x in col - 2..col + 3 {
                    let v = source[y * width + x];
                    sum += v;
                    sum_sq += v * v;
                }
            }
            for &y in &[row - 2, row + 2] {
                for x in col - 1..col + 2 {
                    let v = source[y * width + x];
                    sum += v;
                    sum_sq += v * v;
                }
            }

            let n = 21.0f32;
            let sum_of_squares = (sum_sq - sum * sum / n).max(0.0);
            let std = (sum_of_squares / n).sqrt();
            let mean = (sum / n).max(f32::MIN_POSITIVE);
            let cv = std / mean.sqrt();
            let t = (1.0 + cv).ln();
            let weight = 1.0 / (1.0 + (offset - tscale * t).exp());

            (mask[k] * 1.01011 * (weight - 0.01)).clamp(0.0, 1.0)
        })
        .collect();

    mask.copy_from_slice(&updated);
    luminance.copy_from_slice(&source);
}

/// Sigmoid reinforcement of the smoothed mask against the pre-smoothing
/// mask, folding in Gaussian-blurred context without fully discarding local
/// detail.
pub fn reinforce_mask(mask: &mut [f32], smoothed: &[f32]) {
    mask.par_iter_mut().zip(smoothed.par_iter()).for_each(|(m, &s)| {
        let diff = *m - s;
        let w = 1.0 / (1.0 + (5.0 - 10.0 * diff).exp());
        *m = (w * s + (1.0 - w) * *m).clamp(0.0, 1.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_is_always_zeroed() {
        let roi = Roi::full(16, 16);
        let cfa_data = vec![0.2f32; 16 * 16];
        let cfa = CfaPlane::new(&cfa_data, 16, 16);
        let rgb = vec![0.3f32; 16 * 16 * 4];
        let sensor = SensorPattern::Bayer { filters: super::super::types::BAYER_RGGB };
        let prepared = prepare_blend(&cfa, &rgb, &roi, &sensor, [1.0, 1.0, 1.0]);
        for col in 0..16 {
            assert_eq!(prepared.mask[col], 0.0);
            assert_eq!(prepared.mask[15 * 16 + col], 0.0);
        }
    }

    #[test]
    fn modify_blend_output_stays_in_unit_range() {
        let width = 16;
        let height = 16;
        let mut mask = vec![0.8f32; width * height];
        let mut luminance: Vec<f32> = (0..width * height).map(|i| (i % 7) as f32 * 0.1).collect();
        modify_blend(&mut mask, &mut luminance, 0.2, width, height);
        assert!(mask.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn reinforce_mask_stays_in_unit_range() {
        let mut mask = vec![0.2f32, 0.9, 0.5];
        let smoothed = vec![0.6f32, 0.4, 0.5];
        reinforce_mask(&mut mask, &smoothed);
        assert!(mask.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
