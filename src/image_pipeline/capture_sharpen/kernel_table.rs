//! Lazily-built table of 9x9 Gaussian kernels, one per quantized sigma.
//!
//! Grounded on `_calc_9x9_gauss_coeffs` / `_sigma_to_index` in the reference
//! `capture.c`. Only one symmetric quadrant of each 9x9 kernel is stored —
//! the full kernel is recovered by mirroring across both axes at lookup time
//! in `richardson_lucy.rs`.

use std::sync::OnceLock;

use super::consts::{ALIGN, CAPTURE_GAUSS_FRACTION};

const NUM_SIGMAS: usize = 256;

/// 256 precomputed 9x9 Gaussian kernel quadrants, indexed by sigma index.
///
/// Each kernel occupies a `ALIGN`-float stride; only the first 25 floats of
/// each stride are meaningful (a 5x5 quadrant `coeffs[5*k + j]` for
/// `k, j` in `0..5`, equal to the true kernel value at offset `(k, j)` from
/// center). The remaining `ALIGN - 25` floats per stride are unused padding.
pub struct KernelTable {
    data: Box<[f32]>,
}

static TABLE: OnceLock<KernelTable> = OnceLock::new();

impl KernelTable {
    /// The shared, process-wide kernel table, built on first use.
    pub fn get() -> &'static KernelTable {
        TABLE.get_or_init(KernelTable::build)
    }

    fn build() -> KernelTable {
        let mut data = vec![0.0f32; NUM_SIGMAS * ALIGN].into_boxed_slice();
        for (index, chunk) in data.chunks_mut(ALIGN).enumerate() {
            let sigma = index as f32 * CAPTURE_GAUSS_FRACTION;
            let coeffs = calc_9x9_gauss_coeffs(sigma);
            chunk[..25].copy_from_slice(&coeffs);
        }
        KernelTable { data }
    }

    /// The 25-float quadrant for the kernel at `sigma_index`.
    #[inline]
    pub fn quadrant(&self, sigma_index: u8) -> &[f32] {
        let base = sigma_index as usize * ALIGN;
        &self.data[base..base + 25]
    }

    /// Sample the quadrant at offset `(dr, dc)`, `dr, dc` in `0..5`.
    #[inline]
    pub fn at(&self, sigma_index: u8, dr: usize, dc: usize) -> f32 {
        self.quadrant(sigma_index)[5 * dr + dc]
    }
}

/// Map a continuous sigma to its table index.
#[inline]
pub fn sigma_to_index(sigma: f32) -> u8 {
    (sigma / CAPTURE_GAUSS_FRACTION).clamp(0.0, u8::MAX as f32) as u8
}

/// Build the 25-float quadrant of a 9x9 separable-symmetric Gaussian kernel
/// for the given sigma, normalized so the full 81-cell kernel sums to 1.
fn calc_9x9_gauss_coeffs(sigma: f32) -> [f32; 25] {
    let mut coeffs = [0.0f32; 25];
    if sigma <= 0.0 {
        coeffs[0] = 1.0;
        return coeffs;
    }

    let mut kernel = [[0.0f32; 9]; 9];
    let mut sum = 0.0f32;
    for k in -4i32..=4 {
        for j in -4i32..=4 {
            let r2 = (k * k + j * j) as f32;
            let v = if r2 > 20.25 { 0.0 } else { (r2 / (-2.0 * sigma * sigma)).exp() };
            kernel[(k + 4) as usize][(j + 4) as usize] = v;
            sum += v;
        }
    }

    for k in 0..5usize {
        for j in 0..5usize {
            coeffs[5 * k + j] = kernel[k + 4][j + 4] / sum;
        }
    }
    coeffs
}
