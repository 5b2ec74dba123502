//! Abstract contract for an accelerated capture-sharpen backend.
//!
//! Mirrors the OpenCL kernel set in `_capture_sharpen_cl` in `capture.c`
//! (`prefill_clip_mask`, `prepare_blend`, `modify_blend`,
//! `gaussian_fast_blur`, `final_blend`, `gaussian_9x9_div`,
//! `gaussian_9x9_mul`, `capture_result`), and is shaped like this crate's
//! existing `debayer::CudaDebayer` / `debayer::NppDebayer` split: a trait
//! describing the device contract, with no concrete implementation shipped
//! here. A real backend is expected to bind each method to one kernel
//! launch against device buffers it owns.

use crate::image_pipeline::common::Result;

/// One dispatch per capture-sharpen pipeline stage, on whatever device
/// buffers the implementor manages internally.
pub trait SharpenGpuBackend {
    fn prefill_clip_mask(&mut self) -> Result<()>;
    fn prepare_blend(&mut self) -> Result<()>;
    fn modify_blend(&mut self, dthresh: f32) -> Result<()>;
    fn gaussian_fast_blur(&mut self, sigma: f32) -> Result<()>;
    fn final_blend(&mut self) -> Result<()>;
    fn gaussian_9x9_div(&mut self) -> Result<()>;
    fn gaussian_9x9_mul(&mut self) -> Result<()>;
    fn capture_result(&mut self) -> Result<()>;
}
