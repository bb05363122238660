//! Numeric constants shared by both stages.
//!
//! These must match the values baked into the GPU program bit for bit.

/// Distance-field pixel normalization: texels of distance per SDF unit.
pub const SDF_PX: f32 = 8.0;

/// Base edge gamma before device-pixel-ratio scaling.
pub const EDGE_GAMMA: f32 = 0.105;

/// Halo blur multiplier applied before dividing by `SDF_PX`.
pub const HALO_BLUR_SCALE: f32 = 1.19;

/// Distance threshold of the glyph edge for the fill pass.
pub const FILL_BUFFER: f32 = (256.0 - 64.0) / 256.0;

/// Distance threshold numerator for the halo pass (`(6 - w / scale) / SDF_PX`).
pub const HALO_BUFFER_BASE: f32 = 6.0;

/// Bounds applied to the perspective ratio.
pub const PERSPECTIVE_RATIO_MIN: f32 = 0.0;
pub const PERSPECTIVE_RATIO_MAX: f32 = 4.0;

/// Fixed-point divisor of the packed symbol size.
pub const SIZE_PACK_SCALE: f32 = 128.0;

/// Text sizes are authored in units of a 24px base glyph.
pub const TEXT_FONT_SCALE_BASE: f32 = 24.0;

/// Glyph offsets are stored in 1/32 px units.
pub const OFFSET_SCALE: f32 = 32.0;

/// Number of distinct opacity steps in a packed fade value.
pub const FADE_OPACITY_STEPS: f32 = 127.0;
