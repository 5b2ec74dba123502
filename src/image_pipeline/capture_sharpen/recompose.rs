//! Final recomposition: blend the sharpened luminance back into the RGB
//! image by a per-pixel scale factor, preserving hue and chroma.
//!
//! Grounded on the final loop of `_capture_sharpen` in `capture.c`.

use rayon::prelude::*;

use super::consts::CAPTURE_YMIN;
use super::types::RgbImage;

/// Linear interpolation `t*a + (1-t)*b`, matching the reference's
/// `interpolatef`.
#[inline]
fn interpolatef(t: f32, a: f32, b: f32) -> f32 {
    t * a + (1.0 - t) * b
}

/// Recompose `rgb` in place from the original `luminance`, the sharpened
/// `estimate`, and the final (post-smoothing, post-reinforcement) `blend`
/// mask. Each pixel's RGB channels are scaled by the ratio of new to old
/// luminance, so hue is unaffected; the blend mask only interpolates how
/// much of the sharpened luminance is used before computing that ratio.
/// Pixels with zero blend weight are left untouched — this is exactly the
/// set of pixels `prepare_blend`/`modify_blend` excluded (clipped or near
/// the luminance floor), so their `luminance` entry can't be trusted as a
/// scale-factor denominator.
pub fn recompose(rgb: &mut RgbImage, luminance: &[f32], estimate: &[f32], blend: &[f32]) {
    let width = rgb.width;
    let height = rgb.height;
    let scales: Vec<Option<f32>> = (0..width * height)
        .into_par_iter()
        .map(|k| {
            if blend[k] <= 0.0 {
                return None;
            }
            let t = blend[k].clamp(0.0, 1.0);
            let luminance_new = interpolatef(t, estimate[k], luminance[k]);
            Some(luminance_new / luminance[k].max(CAPTURE_YMIN))
        })
        .collect();

    for k in 0..width * height {
        let Some(factor) = scales[k] else { continue };
        let [r, g, b, _a] = rgb.pixel(k);
        rgb.set_rgb(k, [r * factor, g * factor, b * factor]);
    }
}
