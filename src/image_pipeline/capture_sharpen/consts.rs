//! Numerical constants shared across the capture-sharpening stages.
//!
//! Carried over verbatim from the reference implementation so the port
//! stays numerically comparable stage-by-stage.

/// Per-kernel stride in the kernel table, in floats.
pub const ALIGN: usize = 32;

/// Sigma step represented by one sigma-index-table entry.
pub const CAPTURE_GAUSS_FRACTION: f32 = 0.01;

/// Numerical floor on luminance to keep divisions well-conditioned.
pub const CAPTURE_YMIN: f32 = 0.001;

/// Fraction of the white level used to declare a CFA sample clipped.
pub const CAPTURE_CFACLIP: f32 = 0.9;

/// Noise floor below which a raw sample is treated as unusable for radius estimation.
pub const RAWEPS: f32 = 0.005;
