//! Auto-radius estimation from local clipping-guarded diagonal ratios.
//!
//! Grounded on `_calcRadiusBayer` / `_calcRadiusXtrans` in `capture.c`. Both
//! estimators walk the green sites of the CFA, compare a site's near and far
//! diagonal neighbors of the opposite color, and track the largest ratio
//! seen among non-clipped candidates; the final radius is
//! `sqrt(1 / ln(max_ratio))`. A ratio of 1 (no local contrast) would make the
//! log blow up, so callers must guard on `max_ratio > 1.0` before trusting
//! the result — mirrored here by returning `None` in that case.
//!
//! The per-row reductions run through rayon's `fold`/`reduce` rather than a
//! shared atomic, so the result is independent of how rows are partitioned
//! across worker threads (max over the same set of values is the same value
//! regardless of reduction order).

use rayon::prelude::*;

use super::types::{fc, Roi, SensorPattern};

/// Estimate the deconvolution radius for a Bayer CFA plane.
///
/// `lower_limit`/`upper_limit` bound the raw range considered reliable
/// (unclipped, above noise floor); candidates involving a neighbor outside
/// that range are discarded.
pub fn calc_radius_bayer(
    cfa: &[f32],
    width: usize,
    height: usize,
    lower_limit: f32,
    upper_limit: f32,
    filters: u32,
) -> Option<f32> {
    let max_ratio = (4..height.saturating_sub(4))
        .into_par_iter()
        .fold(|| 1.0f32, |acc, row| acc.max(bayer_row_max_ratio(cfa, width, row, lower_limit, upper_limit, filters)))
        .reduce(|| 1.0f32, f32::max);

    if max_ratio > 1.0 {
        Some((1.0f32 / max_ratio.ln()).sqrt())
    } else {
        None
    }
}

/// Largest diagonal-ratio candidate on a single row, used as the unit of
/// work for the row-parallel fold in `calc_radius_bayer`.
fn bayer_row_max_ratio(
    cfa: &[f32],
    width: usize,
    row: usize,
    lower_limit: f32,
    upper_limit: f32,
    filters: u32,
) -> f32 {
    let mut max_ratio = 1.0f32;
    let row_color = fc(row, 0, filters) & 1;
    let mut col = 5 + row_color as usize;
    while col < width.saturating_sub(5) {
        let idx = row * width + col;
        let val00 = cfa[idx];

        if val00 > lower_limit {
            // Diagonal green neighbors one row below: (r+1,c-1) and
            // (r+1,c+1), matching `cfa[width-1]`/`cfa[width+1]` in the
            // reference (not row-minus-one).
            let val_m1 = cfa[idx + width - 1];
            let val_p1 = cfa[idx + width + 1];

            // "Minus" diagonal: (r,c) vs (r+1,c-1).
            if val_m1 > lower_limit && val00.max(val_m1) > lower_limit {
                let clipped = if val00 >= val_m1 {
                    // winner (r,c): guard (r-1,c-1), (r-1,c+1), (r+1,c+1)
                    cfa[idx - width - 1] >= upper_limit
                        || cfa[idx - width + 1] >= upper_limit
                        || cfa[idx + width + 1] >= upper_limit
                } else {
                    // winner (r+1,c-1): guard (r,c-2), (r,c), (r+2,c-2), (r+2,c)
                    cfa[idx - 2] >= upper_limit
                        || cfa[idx] >= upper_limit
                        || cfa[idx + 2 * width - 2] >= upper_limit
                        || cfa[idx + 2 * width] >= upper_limit
                };
                if !clipped {
                    let ratio = val00.max(val_m1) / val00.min(val_m1).max(f32::EPSILON);
                    if ratio > max_ratio {
                        max_ratio = ratio;
                    }
                }
            }

            // "Plus" diagonal: (r,c) vs (r+1,c+1).
            if val_p1 > lower_limit && val00.max(val_p1) > lower_limit {
                let clipped = if val00 >= val_p1 {
                    // winner (r,c): guard (r-1,c-1), (r-1,c+1), (r+1,c+1)
                    cfa[idx - width - 1] >= upper_limit
                        || cfa[idx - width + 1] >= upper_limit
                        || cfa[idx + width + 1] >= upper_limit
                } else {
                    // winner (r+1,c+1): guard (r,c), (r,c+2), (r+2,c), (r+2,c+2)
                    cfa[idx] >= upper_limit
                        || cfa[idx + 2] >= upper_limit
                        || cfa[idx + 2 * width] >= upper_limit
                        || cfa[idx + 2 * width + 2] >= upper_limit
                };
                if !clipped {
                    let ratio = val00.max(val_p1) / val00.min(val_p1).max(f32::EPSILON);
                    if ratio > max_ratio {
                        max_ratio = ratio;
                    }
                }
            }
        }

        col += 2;
    }
    max_ratio
}

/// Estimate the deconvolution radius for an X-Trans CFA plane.
///
/// Walks solitary green sites (a green pixel whose immediate cross
/// neighbors are not both green) on a 3-pixel stride, comparing the two
/// diagonal green-pair ratios at each site under the same clip guard as the
/// Bayer estimator.
pub fn calc_radius_xtrans(
    cfa: &[f32],
    roi: &Roi,
    lower_limit: f32,
    upper_limit: f32,
    matrix: &[[u8; 6]; 6],
) -> Option<f32> {
    let sensor = SensorPattern::XTrans { matrix: *matrix };
    let width = roi.width;
    let height = roi.height;

    let mut anchor = None;
    'search: for row in 6..12.min(height) {
        for col in 6..12.min(width) {
            if sensor.color_at(row, col, roi) != 1 {
                continue;
            }
            let left_green = sensor.color_at(row, col.saturating_sub(1), roi) == 1;
            let right_green = sensor.color_at(row, col + 1, roi) == 1;
            let up_green = sensor.color_at(row.saturating_sub(1), col, roi) == 1;
            let down_green = sensor.color_at(row + 1, col, roi) == 1;
            if !left_green && !right_green && !up_green && !down_green {
                anchor = Some((row, col));
                break 'search;
            }
        }
    }
    let (start_row, start_col) = match anchor {
        Some(a) => a,
        None => return None,
    };

    let rows: Vec<usize> = (start_row..height.saturating_sub(4)).step_by(3).collect();
    let max_ratio = rows
        .into_par_iter()
        .fold(|| 1.0f32, |acc, row| {
            acc.max(xtrans_row_max_ratio(cfa, width, row, start_col, lower_limit, upper_limit))
        })
        .reduce(|| 1.0f32, f32::max);

    if max_ratio > 1.0 {
        Some((1.0f32 / max_ratio.ln()).sqrt())
    } else {
        None
    }
}

fn xtrans_row_max_ratio(
    cfa: &[f32],
    width: usize,
    row: usize,
    start_col: usize,
    lower_limit: f32,
    upper_limit: f32,
) -> f32 {
    let mut max_ratio = 1.0f32;
    let mut col = start_col;
    while col < width.saturating_sub(4) {
        let idx = row * width + col;
        let val00 = cfa[idx];

        if val00 > lower_limit && val00 < upper_limit {
            let candidates = [
                (idx.wrapping_sub(width + 1), idx.wrapping_sub(2 * (width + 1))),
                (idx + width + 1, idx + 2 * (width + 1)),
            ];
            for (near, far) in candidates {
                if near >= cfa.len() || far >= cfa.len() {
                    continue;
                }
                let near_val = cfa[near];
                let far_val = cfa[far];
                let square_clipped = near_val <= lower_limit
                    || near_val >= upper_limit
                    || far_val <= lower_limit
                    || far_val >= upper_limit;
                if square_clipped {
                    continue;
                }
                let ratio = (val00 / near_val.max(f32::EPSILON)).max(near_val / val00.max(f32::EPSILON));
                if ratio > max_ratio {
                    max_ratio = ratio;
                }
            }
        }

        col += 3;
    }
    max_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::capture_sharpen::types::BAYER_RGGB;

    #[test]
    fn flat_field_has_no_usable_ratio() {
        let width = 32;
        let height = 32;
        let cfa = vec![0.5f32; width * height];
        let radius = calc_radius_bayer(&cfa, width, height, 0.01, 0.95, BAYER_RGGB);
        assert!(radius.is_none());
    }

    #[test]
    fn high_contrast_checkerboard_yields_finite_radius() {
        let width = 32;
        let height = 32;
        let mut cfa = vec![0.1f32; width * height];
        for row in 0..height {
            for col in 0..width {
                if (row + col) % 2 == 0 {
                    cfa[row * width + col] = 0.8;
                }
            }
        }
        let radius = calc_radius_bayer(&cfa, width, height, 0.01, 0.95, BAYER_RGGB);
        assert!(radius.is_some());
        assert!(radius.unwrap().is_finite());
        assert!(radius.unwrap() > 0.0);
    }

    #[test]
    fn radius_estimate_is_deterministic_across_thread_pool_sizes() {
        let width = 64;
        let height = 64;
        let mut cfa = vec![0.1f32; width * height];
        for row in 0..height {
            for col in 0..width {
                if (row * 7 + col * 13) % 5 == 0 {
                    cfa[row * width + col] = 0.9;
                }
            }
        }

        let default_pool_result = calc_radius_bayer(&cfa, width, height, 0.01, 0.95, BAYER_RGGB);

        let single_threaded_pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let single_threaded_result =
            single_threaded_pool.install(|| calc_radius_bayer(&cfa, width, height, 0.01, 0.95, BAYER_RGGB));

        assert_eq!(default_pool_result, single_threaded_result);
    }
}
