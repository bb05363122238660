//! Uniform block layouts.
//!
//! Each block is `#[repr(C)]` + `Pod` and must match the GPU-side struct
//! byte for byte. Booleans are stored as `u32` (0 or 1); matrices are
//! column-major `[[f32; 4]; 4]`.
//!
//! Slot | block                    | size | read by
//! -----|--------------------------|------|----------------
//!    0 | `SymbolDynamicUbo`       |   16 | vertex, fragment
//!    1 | `SymbolDrawableUbo`      |  224 | vertex, fragment
//!    2 | `SymbolTilePropsUbo`     |   32 | vertex, fragment
//!    3 | `SymbolInterpolateUbo`   |   32 | vertex
//!    4 | `SymbolEvaluatedPropsUbo`|   96 | vertex, fragment

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::color::Color;
use crate::draw::DrawPass;
use crate::error::SymbolError;

#[inline]
const fn flag(b: bool) -> u32 {
    b as u32
}

/// Common behavior of the five uniform blocks.
pub trait UniformBlock: Pod {
    /// Type name used in diagnostics.
    const NAME: &'static str;
    /// Fixed binding slot.
    const SLOT: u32;

    /// Views a host-supplied buffer as this block.
    ///
    /// The length must match exactly; there is no padding tolerance.
    fn from_bytes(bytes: &[u8]) -> Result<&Self, SymbolError> {
        let expected = std::mem::size_of::<Self>();
        if bytes.len() != expected {
            log::debug!("{}: rejecting {} byte buffer", Self::NAME, bytes.len());
            return Err(SymbolError::UniformSize {
                block: Self::NAME,
                expected,
                actual: bytes.len(),
            });
        }
        bytemuck::try_from_bytes(bytes).map_err(|err| {
            log::debug!("{}: rejecting misaligned buffer ({err})", Self::NAME);
            SymbolError::UniformAlignment { block: Self::NAME }
        })
    }

    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

// ── dynamic ───────────────────────────────────────────────────────────────

/// Per-frame values shared by every symbol draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SymbolDynamicUbo {
    /// Fade step applied this frame, in opacity units.
    pub fade_change: f32,
    pub camera_to_center_distance: f32,
    pub aspect_ratio: f32,
    pub _pad: f32,
}

impl SymbolDynamicUbo {
    pub const fn new(fade_change: f32, camera_to_center_distance: f32, aspect_ratio: f32) -> Self {
        Self { fade_change, camera_to_center_distance, aspect_ratio, _pad: 0.0 }
    }
}

impl UniformBlock for SymbolDynamicUbo {
    const NAME: &'static str = "SymbolDynamicUbo";
    const SLOT: u32 = 0;
}

// ── drawable ──────────────────────────────────────────────────────────────

/// Per-drawable (per tile) matrices and atlas parameters.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SymbolDrawableUbo {
    /// Tile to clip space.
    pub matrix: [[f32; 4]; 4],
    /// Anchor into the plane labels are laid out in.
    pub label_plane_matrix: [[f32; 4]; 4],
    /// Label plane to clip space.
    pub coord_matrix: [[f32; 4]; 4],
    /// Atlas dimensions in texels.
    pub texsize: [f32; 2],
    /// Antialiasing scale precomputed by the host.
    pub gamma_scale: f32,
    pub rotate_symbol: u32,
    pub _pad: [f32; 4],
}

impl SymbolDrawableUbo {
    pub fn new(
        matrix: Mat4,
        label_plane_matrix: Mat4,
        coord_matrix: Mat4,
        texsize: Vec2,
        gamma_scale: f32,
        rotate_symbol: bool,
    ) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
            label_plane_matrix: label_plane_matrix.to_cols_array_2d(),
            coord_matrix: coord_matrix.to_cols_array_2d(),
            texsize: texsize.to_array(),
            gamma_scale,
            rotate_symbol: flag(rotate_symbol),
            _pad: [0.0; 4],
        }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrix)
    }

    #[inline]
    pub fn label_plane_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.label_plane_matrix)
    }

    #[inline]
    pub fn coord_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.coord_matrix)
    }

    #[inline]
    pub fn texsize(&self) -> Vec2 {
        Vec2::from_array(self.texsize)
    }

    #[inline]
    pub fn rotate_symbol(&self) -> bool {
        self.rotate_symbol != 0
    }
}

impl Default for SymbolDrawableUbo {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec2::ONE, 1.0, false)
    }
}

impl UniformBlock for SymbolDrawableUbo {
    const NAME: &'static str = "SymbolDrawableUbo";
    const SLOT: u32 = 1;
}

// ── tile props ────────────────────────────────────────────────────────────

/// Per-tile layer flags and resolved size parameters.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SymbolTilePropsUbo {
    pub is_text: u32,
    pub is_halo: u32,
    pub pitch_with_map: u32,
    pub is_size_zoom_constant: u32,
    pub is_size_feature_constant: u32,
    /// Zoom interpolation fraction between the two packed size keyframes.
    pub size_t: f32,
    /// Size used when neither packed keyframe applies.
    pub size: f32,
    pub _pad: f32,
}

impl SymbolTilePropsUbo {
    /// Text layer with a size constant over zoom and features.
    pub const fn text(size: f32) -> Self {
        Self {
            is_text: 1,
            is_halo: 0,
            pitch_with_map: 0,
            is_size_zoom_constant: 1,
            is_size_feature_constant: 1,
            size_t: 0.0,
            size,
            _pad: 0.0,
        }
    }

    /// Icon layer with a size constant over zoom and features.
    pub const fn icon(size: f32) -> Self {
        Self { is_text: 0, ..Self::text(size) }
    }

    pub const fn with_size_flags(
        mut self,
        zoom_constant: bool,
        feature_constant: bool,
        size_t: f32,
    ) -> Self {
        self.is_size_zoom_constant = flag(zoom_constant);
        self.is_size_feature_constant = flag(feature_constant);
        self.size_t = size_t;
        self
    }

    pub const fn with_pitch_with_map(mut self, pitch_with_map: bool) -> Self {
        self.pitch_with_map = flag(pitch_with_map);
        self
    }

    /// Copy configured for one pass of a two-pass symbol draw.
    pub const fn for_pass(mut self, pass: DrawPass) -> Self {
        self.is_halo = flag(matches!(pass, DrawPass::Halo));
        self
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.is_text != 0
    }

    #[inline]
    pub fn is_halo(&self) -> bool {
        self.is_halo != 0
    }

    #[inline]
    pub fn pitch_with_map(&self) -> bool {
        self.pitch_with_map != 0
    }

    #[inline]
    pub fn is_size_zoom_constant(&self) -> bool {
        self.is_size_zoom_constant != 0
    }

    #[inline]
    pub fn is_size_feature_constant(&self) -> bool {
        self.is_size_feature_constant != 0
    }
}

impl UniformBlock for SymbolTilePropsUbo {
    const NAME: &'static str = "SymbolTilePropsUbo";
    const SLOT: u32 = 2;
}

// ── interpolate ───────────────────────────────────────────────────────────

/// Style-transition fractions for the data-driven paint properties.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SymbolInterpolateUbo {
    pub fill_color_t: f32,
    pub halo_color_t: f32,
    pub opacity_t: f32,
    pub halo_width_t: f32,
    pub halo_blur_t: f32,
    pub _pad: [f32; 3],
}

impl SymbolInterpolateUbo {
    /// All five properties at the same fraction.
    pub const fn uniform(t: f32) -> Self {
        Self {
            fill_color_t: t,
            halo_color_t: t,
            opacity_t: t,
            halo_width_t: t,
            halo_blur_t: t,
            _pad: [0.0; 3],
        }
    }
}

impl UniformBlock for SymbolInterpolateUbo {
    const NAME: &'static str = "SymbolInterpolateUbo";
    const SLOT: u32 = 3;
}

// ── evaluated props ───────────────────────────────────────────────────────

/// Constant paint values for one symbol kind.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EvaluatedPaint {
    pub fill_color: Color,
    pub halo_color: Color,
    pub opacity: f32,
    pub halo_width: f32,
    pub halo_blur: f32,
}

impl Default for EvaluatedPaint {
    fn default() -> Self {
        Self {
            fill_color: Color::from_premul(0.0, 0.0, 0.0, 1.0),
            halo_color: Color::transparent(),
            opacity: 1.0,
            halo_width: 0.0,
            halo_blur: 0.0,
        }
    }
}

/// Resolved constant paint values, text first, then icon.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SymbolEvaluatedPropsUbo {
    pub text_fill_color: [f32; 4],
    pub text_halo_color: [f32; 4],
    pub text_opacity: f32,
    pub text_halo_width: f32,
    pub text_halo_blur: f32,
    pub _pad0: f32,

    pub icon_fill_color: [f32; 4],
    pub icon_halo_color: [f32; 4],
    pub icon_opacity: f32,
    pub icon_halo_width: f32,
    pub icon_halo_blur: f32,
    pub _pad1: f32,
}

impl SymbolEvaluatedPropsUbo {
    pub fn new(text: EvaluatedPaint, icon: EvaluatedPaint) -> Self {
        Self {
            text_fill_color: text.fill_color.to_array(),
            text_halo_color: text.halo_color.to_array(),
            text_opacity: text.opacity,
            text_halo_width: text.halo_width,
            text_halo_blur: text.halo_blur,
            _pad0: 0.0,
            icon_fill_color: icon.fill_color.to_array(),
            icon_halo_color: icon.halo_color.to_array(),
            icon_opacity: icon.opacity,
            icon_halo_width: icon.halo_width,
            icon_halo_blur: icon.halo_blur,
            _pad1: 0.0,
        }
    }

    /// The text or icon half of the block.
    pub fn paint(&self, is_text: bool) -> EvaluatedPaint {
        if is_text {
            EvaluatedPaint {
                fill_color: Color::from_array(self.text_fill_color),
                halo_color: Color::from_array(self.text_halo_color),
                opacity: self.text_opacity,
                halo_width: self.text_halo_width,
                halo_blur: self.text_halo_blur,
            }
        } else {
            EvaluatedPaint {
                fill_color: Color::from_array(self.icon_fill_color),
                halo_color: Color::from_array(self.icon_halo_color),
                opacity: self.icon_opacity,
                halo_width: self.icon_halo_width,
                halo_blur: self.icon_halo_blur,
            }
        }
    }
}

impl UniformBlock for SymbolEvaluatedPropsUbo {
    const NAME: &'static str = "SymbolEvaluatedPropsUbo";
    const SLOT: u32 = 4;
}

// ── layout checks ─────────────────────────────────────────────────────────

const _: () = assert!(std::mem::size_of::<SymbolDynamicUbo>() == 16);
const _: () = assert!(std::mem::size_of::<SymbolDrawableUbo>() == 224);
const _: () = assert!(std::mem::size_of::<SymbolTilePropsUbo>() == 32);
const _: () = assert!(std::mem::size_of::<SymbolInterpolateUbo>() == 32);
const _: () = assert!(std::mem::size_of::<SymbolEvaluatedPropsUbo>() == 96);

/// The five blocks bound for one draw call.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SymbolUniforms {
    pub dynamic: SymbolDynamicUbo,
    pub drawable: SymbolDrawableUbo,
    pub tile_props: SymbolTilePropsUbo,
    pub interpolate: SymbolInterpolateUbo,
    pub evaluated: SymbolEvaluatedPropsUbo,
}

impl SymbolUniforms {
    /// Same uniforms with `is_halo` set for `pass`.
    pub fn for_pass(&self, pass: DrawPass) -> Self {
        Self { tile_props: self.tile_props.for_pass(pass), ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn drawable_field_offsets() {
        assert_eq!(offset_of!(SymbolDrawableUbo, label_plane_matrix), 64);
        assert_eq!(offset_of!(SymbolDrawableUbo, coord_matrix), 128);
        assert_eq!(offset_of!(SymbolDrawableUbo, texsize), 192);
        assert_eq!(offset_of!(SymbolDrawableUbo, gamma_scale), 200);
        assert_eq!(offset_of!(SymbolDrawableUbo, rotate_symbol), 204);
    }

    #[test]
    fn tile_props_field_offsets() {
        assert_eq!(offset_of!(SymbolTilePropsUbo, is_size_feature_constant), 16);
        assert_eq!(offset_of!(SymbolTilePropsUbo, size_t), 20);
        assert_eq!(offset_of!(SymbolTilePropsUbo, size), 24);
    }

    #[test]
    fn evaluated_props_icon_half_starts_at_48() {
        assert_eq!(offset_of!(SymbolEvaluatedPropsUbo, icon_fill_color), 48);
        assert_eq!(offset_of!(SymbolEvaluatedPropsUbo, icon_halo_blur), 88);
    }

    #[test]
    fn from_bytes_accepts_exact_length() {
        let ubo = SymbolDynamicUbo::new(0.25, 3.0, 1.5);
        let bytes = ubo.as_bytes().to_vec();
        // Vec<u8> has align 1; copy into an f32 buffer to guarantee alignment.
        let words: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let parsed = SymbolDynamicUbo::from_bytes(bytemuck::cast_slice(&words)).unwrap();
        assert_eq!(*parsed, ubo);
    }

    #[test]
    fn from_bytes_rejects_padding_mismatch() {
        let words = [0.0f32; 5];
        let err = SymbolDynamicUbo::from_bytes(bytemuck::cast_slice(&words)).unwrap_err();
        assert_eq!(
            err,
            SymbolError::UniformSize { block: "SymbolDynamicUbo", expected: 16, actual: 20 }
        );
    }

    #[test]
    fn from_bytes_rejects_misaligned_buffer() {
        let words = [0.0f32; 5];
        let bytes: &[u8] = bytemuck::cast_slice(&words);
        // Right length, but one byte past a 4-byte boundary.
        let err = SymbolDynamicUbo::from_bytes(&bytes[1..17]).unwrap_err();
        assert_eq!(err, SymbolError::UniformAlignment { block: "SymbolDynamicUbo" });
    }

    #[test]
    fn drawable_matrix_roundtrips_through_columns() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let ubo = SymbolDrawableUbo::new(m, Mat4::IDENTITY, Mat4::IDENTITY, Vec2::ONE, 1.0, true);
        assert_eq!(ubo.matrix(), m);
        assert!(ubo.rotate_symbol());
    }

    #[test]
    fn evaluated_paint_selects_kind() {
        let text = EvaluatedPaint { opacity: 0.5, ..EvaluatedPaint::default() };
        let icon = EvaluatedPaint { opacity: 0.75, ..EvaluatedPaint::default() };
        let ubo = SymbolEvaluatedPropsUbo::new(text, icon);
        assert_eq!(ubo.paint(true).opacity, 0.5);
        assert_eq!(ubo.paint(false).opacity, 0.75);
    }

    #[test]
    fn for_pass_toggles_halo_flag() {
        let props = SymbolTilePropsUbo::text(16.0);
        assert!(props.for_pass(DrawPass::Halo).is_halo());
        assert!(!props.for_pass(DrawPass::Halo).for_pass(DrawPass::Fill).is_halo());
    }
}
