//! Capture sharpening: Richardson-Lucy deconvolution of a provisional
//! demosaic, gated by a per-pixel blend mask built from local clipping and
//! variance.
//!
//! Grounded end-to-end on `_capture_sharpen` in `capture.c`; see
//! `DESIGN.md` for the module-by-module mapping.

mod blend_mask;
mod consts;
mod kernel_table;
mod radius;
mod recompose;
mod richardson_lucy;
mod sigma_index;
mod types;

pub mod gpu;

pub use consts::CAPTURE_CFACLIP;
pub use gpu::SharpenGpuBackend;
pub use types::{
    fc, CfaPlane, Params, RgbImage, Roi, SensorPattern, SharpenFlags, BAYER_BGGR, BAYER_GBRG, BAYER_GRBG,
    BAYER_RGGB,
};

use tracing::{debug, instrument, warn};

use crate::image_pipeline::common::{ConversionError, Result};

const RAWEPS: f32 = consts::RAWEPS;

/// Caller-facing sharpening configuration, as stored on `ConversionConfig`.
/// Converted to a `Params` at call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpenParams {
    pub radius: f32,
    pub iterations: u32,
    pub boost: f32,
    pub center: f32,
    pub threshold: f32,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self { radius: 0.0, iterations: 3, boost: 0.0, center: 0.0, threshold: 0.2 }
    }
}

impl From<SharpenParams> for Params {
    fn from(p: SharpenParams) -> Self {
        Params {
            radius: p.radius,
            iterations: p.iterations,
            boost: p.boost,
            center: p.center,
            threshold: p.threshold,
            white_balance: None,
        }
    }
}

/// Per-channel clip threshold derived from the sensor's white level.
fn whites_from_whitelevels(whitelevels: [u16; 4]) -> [f32; 3] {
    [
        whitelevels[0] as f32 * CAPTURE_CFACLIP / u16::MAX as f32,
        whitelevels[1] as f32 * CAPTURE_CFACLIP / u16::MAX as f32,
        whitelevels[2] as f32 * CAPTURE_CFACLIP / u16::MAX as f32,
    ]
}

/// Run capture sharpening on `rgb` in place, using `cfa` as the raw
/// single-channel reference and `sensor` to resolve per-pixel color.
///
/// `params.radius == 0.0` triggers auto-radius estimation; the estimated
/// value is written back to `*params` only when it differs from the
/// previous value by more than 0.005 and falls in `(0.1, 1.0)`, matching
/// the reference's hysteresis rule. `flags.thumb_quality_ok == Some(false)`
/// short-circuits to a no-op, matching the reference's thumbnail fast path.
#[instrument(skip(cfa, rgb, cancelled), fields(width = roi.width, height = roi.height))]
pub fn sharpen(
    cfa: &CfaPlane,
    rgb: &mut RgbImage,
    roi: Roi,
    sensor: SensorPattern,
    whitelevels: [u16; 4],
    params: &mut Params,
    flags: SharpenFlags,
    cancelled: &dyn Fn() -> bool,
) -> Result<()> {
    if flags.thumb_quality_ok == Some(false) {
        debug!("skipping capture sharpen on low-quality thumbnail path");
        return Ok(());
    }

    if params.iterations < 1 && !flags.show_variance_mask && !flags.show_sigma_mask {
        debug!("no iterations requested and no debug mask selected, skipping");
        return Ok(());
    }

    let width = roi.width;
    let height = roi.height;
    let whites = whites_from_whitelevels(whitelevels);

    if params.radius < 0.01 {
        let estimated = match &sensor {
            SensorPattern::Bayer { filters } => {
                radius::calc_radius_bayer(cfa.as_slice(), width, height, RAWEPS, whites[1], *filters)
            }
            SensorPattern::XTrans { matrix } => {
                radius::calc_radius_xtrans(cfa.as_slice(), &roi, RAWEPS, whites[1], matrix)
            }
        };
        if let Some(new_radius) = estimated {
            let valid = new_radius > 0.1 && new_radius < 1.0;
            let changed = (new_radius - params.radius).abs() > 0.005;
            if valid && changed {
                params.radius = new_radius;
            } else if !valid {
                warn!(new_radius, "auto-radius estimate out of range, keeping previous radius");
            }
        }
    }

    let prepared = blend_mask::prepare_blend(cfa, rgb.as_slice(), &roi, &sensor, whites);
    let mut mask = prepared.mask;
    let luminance = prepared.luminance;
    blend_mask::modify_blend(&mut mask, &mut luminance.clone(), params.threshold, width, height);

    let smoothed = gaussian_blur_mask(&mask, width, height, 2.0);
    blend_mask::reinforce_mask(&mut mask, &smoothed);

    let sigma_idx = sigma_index::precalc_gauss_idx(&roi, params.radius, params.boost, params.center);

    if flags.show_variance_mask {
        write_debug_alpha(rgb, &mask);
        return Ok(());
    }
    if flags.show_sigma_mask {
        let sigma_vis: Vec<f32> = sigma_idx.data.iter().map(|&v| v as f32 / 255.0).collect();
        write_debug_alpha(rgb, &sigma_vis);
        return Ok(());
    }

    let estimate = richardson_lucy::iterate(&luminance, &mask, &sigma_idx, width, height, params.iterations, cancelled)
        .ok_or(ConversionError::SharpenCancelled)?;

    recompose::recompose(rgb, &luminance, &estimate, &mask);
    Ok(())
}

fn write_debug_alpha(rgb: &mut RgbImage, values: &[f32]) {
    for (k, &v) in values.iter().enumerate() {
        rgb.set_alpha(k, v);
    }
}

/// Separable Gaussian smoothing of the blend mask prior to reinforcement;
/// this is the one stage that uses a fixed sigma (2.0) rather than the
/// per-pixel table, matching `dt_gaussian_fast_blur` in the reference.
fn gaussian_blur_mask(mask: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as i32;
    let mut weights = vec![0.0f32; (2 * radius + 1) as usize];
    let mut sum = 0.0f32;
    for (i, w) in weights.iter_mut().enumerate() {
        let d = i as i32 - radius;
        *w = (-(d * d) as f32 / (2.0 * sigma * sigma)).exp();
        sum += *w;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }

    let mut horiz = vec![0.0f32; width * height];
    for row in 0..height {
        for col in 0..width {
            let mut acc = 0.0f32;
            for (i, &w) in weights.iter().enumerate() {
                let d = i as i32 - radius;
                let c = (col as i32 + d).clamp(0, width as i32 - 1) as usize;
                acc += w * mask[row * width + c];
            }
            horiz[row * width + col] = acc;
        }
    }

    let mut out = vec![0.0f32; width * height];
    for row in 0..height {
        for col in 0..width {
            let mut acc = 0.0f32;
            for (i, &w) in weights.iter().enumerate() {
                let d = i as i32 - radius;
                let r = (row as i32 + d).clamp(0, height as i32 - 1) as usize;
                acc += w * horiz[r * width + col];
            }
            out[row * width + col] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_scene(width: usize, height: usize, value: f32) -> (Vec<f32>, Vec<f32>) {
        let cfa = vec![value; width * height];
        let rgb = vec![value, value, value, 0.0].repeat(width * height);
        (cfa, rgb)
    }

    #[test]
    fn zero_iterations_is_a_no_op() {
        let (cfa_data, mut rgb_data) = flat_scene(32, 32, 0.3);
        let original = rgb_data.clone();
        let cfa = CfaPlane::new(&cfa_data, 32, 32);
        let mut rgb = RgbImage::new(&mut rgb_data, 32, 32);
        let roi = Roi::full(32, 32);
        let mut params = Params { radius: 0.3, iterations: 0, ..Params::default() };
        let result = sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        );
        assert!(result.is_ok());
        assert_eq!(rgb.as_slice(), original.as_slice());
    }

    #[test]
    fn thumbnail_fast_path_skips_processing() {
        let (cfa_data, mut rgb_data) = flat_scene(32, 32, 0.3);
        let original = rgb_data.clone();
        let cfa = CfaPlane::new(&cfa_data, 32, 32);
        let mut rgb = RgbImage::new(&mut rgb_data, 32, 32);
        let roi = Roi::full(32, 32);
        let mut params = Params { radius: 0.3, iterations: 4, ..Params::default() };
        let flags = SharpenFlags { thumb_quality_ok: Some(false), ..Default::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            flags,
            &|| false,
        )
        .unwrap();
        assert_eq!(rgb.as_slice(), original.as_slice());
    }

    #[test]
    fn cancellation_surfaces_as_error() {
        let (cfa_data, mut rgb_data) = flat_scene(32, 32, 0.3);
        let cfa = CfaPlane::new(&cfa_data, 32, 32);
        let mut rgb = RgbImage::new(&mut rgb_data, 32, 32);
        let roi = Roi::full(32, 32);
        let mut params = Params { radius: 0.3, iterations: 4, ..Params::default() };
        let result = sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| true,
        );
        assert!(matches!(result, Err(ConversionError::SharpenCancelled)));
    }

    #[test]
    fn variance_mask_debug_mode_writes_alpha_only() {
        let (cfa_data, mut rgb_data) = flat_scene(32, 32, 0.3);
        let cfa = CfaPlane::new(&cfa_data, 32, 32);
        let mut rgb = RgbImage::new(&mut rgb_data, 32, 32);
        let roi = Roi::full(32, 32);
        let mut params = Params { radius: 0.3, iterations: 4, ..Params::default() };
        let flags = SharpenFlags { show_variance_mask: true, ..Default::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            flags,
            &|| false,
        )
        .unwrap();
        for k in 0..32 * 32 {
            let [r, g, b, _a] = rgb.pixel(k);
            assert_eq!((r, g, b), (0.3, 0.3, 0.3));
        }
    }

    // The six concrete 64x64 scenarios below exercise `sharpen` end to end,
    // one per named behavior the orchestrator must guarantee.

    #[test]
    fn impulse_pixel_is_left_unchanged() {
        let width = 64;
        let height = 64;
        let mut cfa_data = vec![0.0f32; width * height];
        cfa_data[32 * width + 32] = 0.5;
        let mut rgb_data = vec![0.0f32; width * height * 4];
        rgb_data[(32 * width + 32) * 4 + 1] = 0.5;
        let original = rgb_data.clone();

        let cfa = CfaPlane::new(&cfa_data, width, height);
        let mut rgb = RgbImage::new(&mut rgb_data, width, height);
        let roi = Roi::full(width, height);
        let mut params = Params { radius: 0.5, iterations: 10, boost: 0.0, center: 0.0, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();

        assert_eq!(rgb.as_slice(), original.as_slice());
    }

    #[test]
    fn gaussian_blob_peak_increases_without_losing_integrated_energy() {
        let width = 64;
        let height = 64;
        let sigma = 1.5f32;
        let amplitude = 0.3f32;
        let background = 0.2f32;

        let mut cfa_data = vec![0.0f32; width * height];
        let mut rgb_data = vec![0.0f32; width * height * 4];
        for row in 0..height {
            for col in 0..width {
                let dr = row as f32 - 32.0;
                let dc = col as f32 - 32.0;
                let v = background + amplitude * (-(dr * dr + dc * dc) / (2.0 * sigma * sigma)).exp();
                let k = row * width + col;
                cfa_data[k] = v;
                rgb_data[k * 4] = v;
                rgb_data[k * 4 + 1] = v;
                rgb_data[k * 4 + 2] = v;
            }
        }
        let original = rgb_data.clone();

        let box_sum = |data: &[f32]| -> f32 {
            let mut sum = 0.0f32;
            for row in 28..37 {
                for col in 28..37 {
                    sum += data[(row * width + col) * 4];
                }
            }
            sum
        };
        let original_box_sum = box_sum(&original);
        let peak_before = original[(32 * width + 32) * 4];

        let cfa = CfaPlane::new(&cfa_data, width, height);
        let mut rgb = RgbImage::new(&mut rgb_data, width, height);
        let roi = Roi::full(width, height);
        let mut params = Params { radius: 0.7, iterations: 20, boost: 0.0, center: 0.0, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();
        drop(rgb);

        let peak_after = rgb_data[(32 * width + 32) * 4];
        assert!(peak_after > peak_before, "peak did not increase: {peak_before} -> {peak_after}");

        let new_box_sum = box_sum(&rgb_data);
        let relative_change = (new_box_sum - original_box_sum).abs() / original_box_sum;
        assert!(relative_change < 0.01, "integrated luminance changed by {relative_change}");
    }

    #[test]
    fn edge_sharpening_boosts_bright_side_and_dims_dark_side_near_the_edge() {
        let width = 64;
        let height = 64;
        let dark = 0.1f32;
        let bright = 0.4f32;

        let mut cfa_data = vec![0.0f32; width * height];
        let mut rgb_data = vec![0.0f32; width * height * 4];
        for row in 0..height {
            for col in 0..width {
                let v = if col < 32 { dark } else { bright };
                let k = row * width + col;
                cfa_data[k] = v;
                rgb_data[k * 4] = v;
                rgb_data[k * 4 + 1] = v;
                rgb_data[k * 4 + 2] = v;
            }
        }
        let original = rgb_data.clone();

        let cfa = CfaPlane::new(&cfa_data, width, height);
        let mut rgb = RgbImage::new(&mut rgb_data, width, height);
        let roi = Roi::full(width, height);
        let mut params = Params { radius: 0.5, iterations: 10, boost: 0.0, center: 0.0, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();
        drop(rgb);

        let row = 32;
        let at = |data: &[f32], col: usize| data[(row * width + col) * 4];

        for col in 28..32 {
            assert!(
                at(&rgb_data, col) < at(&original, col),
                "dark-side pixel at col {col} did not strictly decrease"
            );
        }
        for col in 32..36 {
            assert!(
                at(&rgb_data, col) > at(&original, col),
                "bright-side pixel at col {col} did not strictly increase"
            );
        }
        for col in [8usize, 56usize] {
            let delta = (at(&rgb_data, col) - at(&original, col)).abs();
            assert!(delta < 1e-4, "far-field pixel at col {col} changed by {delta}");
        }
    }

    #[test]
    fn clipped_highlight_region_is_unchanged_within_two_pixels() {
        let width = 64;
        let height = 64;
        let background = 0.3f32;

        let mut cfa_data = vec![background; width * height];
        let mut rgb_data = vec![0.0f32; width * height * 4];
        for k in 0..width * height {
            rgb_data[k * 4] = background;
            rgb_data[k * 4 + 1] = background;
            rgb_data[k * 4 + 2] = background;
        }
        for row in 27..37 {
            for col in 27..37 {
                let k = row * width + col;
                cfa_data[k] = 1.0;
                rgb_data[k * 4] = 1.0;
                rgb_data[k * 4 + 1] = 1.0;
                rgb_data[k * 4 + 2] = 1.0;
            }
        }
        let original = rgb_data.clone();

        let cfa = CfaPlane::new(&cfa_data, width, height);
        let mut rgb = RgbImage::new(&mut rgb_data, width, height);
        let roi = Roi::full(width, height);
        // Whitelevel of u16::MAX scales to whites == CAPTURE_CFACLIP (0.9).
        let mut params = Params { radius: 0.5, iterations: 4, boost: 0.0, center: 0.0, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();
        drop(rgb);

        for row in 25..39 {
            for col in 25..39 {
                let k = row * width + col;
                let delta = (rgb_data[k * 4] - original[k * 4]).abs();
                assert!(delta < 1e-4, "pixel ({row},{col}) within 2 of the clipped region changed by {delta}");
            }
        }
    }

    #[test]
    fn border_ring_is_always_preserved() {
        let width = 64;
        let height = 64;
        let mut cfa_data = vec![0.2f32; width * height];
        let mut rgb_data = vec![0.0f32; width * height * 4];
        for row in 0..height {
            for col in 0..width {
                let v = if (row + col) % 8 < 4 { 0.2 } else { 0.6 };
                let k = row * width + col;
                cfa_data[k] = v;
                rgb_data[k * 4] = v;
                rgb_data[k * 4 + 1] = v;
                rgb_data[k * 4 + 2] = v;
            }
        }
        let original = rgb_data.clone();

        let cfa = CfaPlane::new(&cfa_data, width, height);
        let mut rgb = RgbImage::new(&mut rgb_data, width, height);
        let roi = Roi::full(width, height);
        let mut params = Params { radius: 0.5, iterations: 4, boost: 0.5, center: 0.1, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();
        drop(rgb);

        for col in 0..width {
            assert_eq!(rgb_data[col * 4], original[col * 4]);
            assert_eq!(rgb_data[((height - 1) * width + col) * 4], original[((height - 1) * width + col) * 4]);
        }
        for row in 0..height {
            assert_eq!(rgb_data[row * width * 4], original[row * width * 4]);
            assert_eq!(rgb_data[(row * width + width - 1) * 4], original[(row * width + width - 1) * 4]);
        }
    }

    #[test]
    fn auto_radius_on_flat_field_leaves_radius_unchanged() {
        let (cfa_data, mut rgb_data) = flat_scene(64, 64, 0.3);
        let cfa = CfaPlane::new(&cfa_data, 64, 64);
        let mut rgb = RgbImage::new(&mut rgb_data, 64, 64);
        let roi = Roi::full(64, 64);
        let mut params = Params { radius: 0.0, iterations: 1, ..Params::default() };
        sharpen(
            &cfa,
            &mut rgb,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            [u16::MAX; 4],
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )
        .unwrap();
        assert!(params.radius == 0.0 || params.radius <= 0.2);
    }
}
