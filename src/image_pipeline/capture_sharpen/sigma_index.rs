//! Per-pixel sigma index map: radial falloff plus a taper toward the image
//! border.
//!
//! Grounded on `_cs_precalc_gauss_idx` in `capture.c`.

use super::kernel_table::sigma_to_index;
use super::types::{Roi, SigmaIndexTable};

/// Build a `SigmaIndexTable` for a ROI of a `p_width`x`p_height` full image.
///
/// `radius` is the base sigma (already resolved, auto or user-supplied),
/// `boost` amplifies the falloff away from `center`, and `center` (0 at the
/// image center, 1 at the corner) shifts where the falloff begins.
pub fn precalc_gauss_idx(roi: &Roi, radius: f32, boost: f32, center: f32) -> SigmaIndexTable {
    let rwidth = roi.p_width as f32 / 2.0;
    let rheight = roi.p_height as f32 / 2.0;
    let mdim = rwidth.min(rheight).max(1.0);
    let cboost = 1.0 + 8.0 * center * center;

    let mut data = vec![0u8; roi.width * roi.height];
    for dy in 0..roi.height {
        let frow = (roi.y + dy) as f32 - rheight;
        for dx in 0..roi.width {
            let fcol = (roi.x + dx) as f32 - rwidth;
            let sc = (frow * frow + fcol * fcol).sqrt() / mdim;
            let delta = (sc - 0.5 - center).max(0.0);
            let corr = cboost * boost * delta * delta;

            let border = (8.0f32)
                .min((roi.p_height as f32 - (roi.y + dy) as f32 - 1.0).max(0.0))
                .min((roi.p_width as f32 - (roi.x + dx) as f32 - 1.0).max(0.0))
                .min((roi.x + dx) as f32)
                .min((roi.y + dy) as f32);

            let sigma = (radius + corr) * 0.125 * border;
            data[dy * roi.width + dx] = sigma_to_index(sigma);
        }
    }

    SigmaIndexTable { data, width: roi.width, height: roi.height }
}
