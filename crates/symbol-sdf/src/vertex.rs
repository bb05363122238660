//! Vertex stage: places one symbol quad corner and builds its shading bundle.

use glam::{Mat2, Mat4, Vec2, Vec4};

use crate::color::Color;
use crate::consts::{
    OFFSET_SCALE, PERSPECTIVE_RATIO_MAX, PERSPECTIVE_RATIO_MIN, SIZE_PACK_SCALE,
    TEXT_FONT_SCALE_BASE,
};
use crate::layout::SymbolVertex;
use crate::packing::{unpack_fade_opacity, unpack_mix_color, unpack_mix_float, unpack_size, PackedSize};
use crate::specialization::{PropertySource, SymbolSpecialization};
use crate::uniforms::{SymbolTilePropsUbo, SymbolUniforms};

/// Output of the vertex stage and input of the fragment stage.
///
/// The data-driven fields are `Some` exactly when the specialization marks
/// the property as attribute-sourced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SymbolVaryings {
    /// Clip-space position.
    pub position: Vec4,

    pub fill_color: Option<Color>,
    pub halo_color: Option<Color>,
    pub opacity: Option<f32>,
    pub halo_width: Option<f32>,
    pub halo_blur: Option<f32>,

    /// Atlas coordinate normalized to `[0, 1]`.
    pub tex: Vec2,
    /// Clip-space `w`, widens the antialiasing band with distance.
    pub gamma_scale: f32,
    pub font_scale: f32,
    pub fade_opacity: f32,
}

/// Symbol size before perspective correction.
///
/// The two flags select one of three fixed policies; the result is not
/// blended across them.
#[inline]
pub fn resolve_size(tile_props: &SymbolTilePropsUbo, size: PackedSize) -> f32 {
    match (tile_props.is_size_zoom_constant(), tile_props.is_size_feature_constant()) {
        (false, false) => (size.min + (size.max - size.min) * tile_props.size_t) / SIZE_PACK_SCALE,
        (true, false) => size.min / SIZE_PACK_SCALE,
        _ => tile_props.size,
    }
}

/// Scale correction for labels whose layout space diverges from the
/// viewport under camera tilt, clamped to `[0, 4]`.
///
/// Pitched labels are laid out in pitched space and shrink with distance,
/// so they are scaled up by the anchor/center ratio. Viewport-aligned
/// labels grow relative to their surroundings and use the inverse.
#[inline]
pub fn perspective_ratio(
    camera_to_anchor_distance: f32,
    camera_to_center_distance: f32,
    pitch_with_map: bool,
) -> f32 {
    let distance_ratio = if pitch_with_map {
        camera_to_anchor_distance / camera_to_center_distance
    } else {
        camera_to_center_distance / camera_to_anchor_distance
    };
    (0.5 + 0.5 * distance_ratio).clamp(PERSPECTIVE_RATIO_MIN, PERSPECTIVE_RATIO_MAX)
}

#[inline]
pub fn font_scale(size: f32, is_text: bool) -> f32 {
    if is_text { size / TEXT_FONT_SCALE_BASE } else { size }
}

/// Screen-space angle of the tile's +x axis at `anchor`.
///
/// Projects the anchor and a point one tile unit to its right and measures
/// the angle between them after the perspective divide.
pub fn map_aligned_rotation(matrix: Mat4, anchor: Vec2, aspect_ratio: f32) -> f32 {
    let a = matrix * Vec4::new(anchor.x, anchor.y, 0.0, 1.0);
    let b = matrix * Vec4::new(anchor.x + 1.0, anchor.y, 0.0, 1.0);
    let a = a.truncate().truncate() / a.w;
    let b = b.truncate().truncate() / b.w;
    ((b.y - a.y) / aspect_ratio).atan2(b.x - a.x)
}

/// Column-major 2x2 rotation used to orient glyph offsets.
#[inline]
pub fn rotation_matrix(angle: f32) -> Mat2 {
    let (sin, cos) = angle.sin_cos();
    Mat2::from_cols(Vec2::new(cos, -sin), Vec2::new(sin, cos))
}

/// Advances a packed fade value by one frame step, clamped to `[0, 1]`.
#[inline]
pub fn update_fade_opacity(packed: f32, fade_change: f32) -> f32 {
    let fade = unpack_fade_opacity(packed);
    let step = if fade.increasing { fade_change } else { -fade_change };
    (fade.opacity + step).clamp(0.0, 1.0)
}

#[inline]
fn data_driven<T>(source: PropertySource, read: impl FnOnce() -> T) -> Option<T> {
    match source {
        PropertySource::Uniform => None,
        PropertySource::Attribute => Some(read()),
    }
}

/// Runs the vertex stage for one quad corner.
pub fn transform_vertex(
    vertex: &SymbolVertex,
    uniforms: &SymbolUniforms,
    specialization: &SymbolSpecialization,
) -> SymbolVaryings {
    let dynamic = &uniforms.dynamic;
    let drawable = &uniforms.drawable;
    let tile_props = &uniforms.tile_props;
    let interp = &uniforms.interpolate;

    let [ax, ay, ox, oy] = vertex.pos_offset;
    let anchor = Vec2::new(ax, ay);
    let offset = Vec2::new(ox, oy);
    let [tx, ty, sx, sy] = vertex.data;
    let atlas_pos = Vec2::new(tx, ty);
    let pixel_offset = Vec2::new(vertex.pixeloffset[0], vertex.pixeloffset[1]);
    let segment_angle = -vertex.projected_pos[2];

    let matrix = drawable.matrix();
    let projected_anchor = matrix * Vec4::new(anchor.x, anchor.y, 0.0, 1.0);
    let ratio = perspective_ratio(
        projected_anchor.w,
        dynamic.camera_to_center_distance,
        tile_props.pitch_with_map(),
    );
    let size = resolve_size(tile_props, unpack_size([sx, sy])) * ratio;
    let font_scale = font_scale(size, tile_props.is_text());

    let symbol_rotation = if drawable.rotate_symbol() {
        map_aligned_rotation(matrix, anchor, dynamic.aspect_ratio)
    } else {
        0.0
    };
    let rotation = rotation_matrix(segment_angle + symbol_rotation);

    let label_anchor = drawable.label_plane_matrix()
        * Vec4::new(vertex.projected_pos[0], vertex.projected_pos[1], 0.0, 1.0);
    let corner = offset / OFFSET_SCALE * font_scale + pixel_offset;
    let plane_pos = label_anchor.truncate().truncate() / label_anchor.w + rotation * corner;
    let position = drawable.coord_matrix() * Vec4::new(plane_pos.x, plane_pos.y, 0.0, 1.0);

    SymbolVaryings {
        position,
        fill_color: data_driven(specialization.fill_color, || {
            unpack_mix_color(vertex.fill_color, interp.fill_color_t)
        }),
        halo_color: data_driven(specialization.halo_color, || {
            unpack_mix_color(vertex.halo_color, interp.halo_color_t)
        }),
        opacity: data_driven(specialization.opacity, || {
            unpack_mix_float(vertex.opacity, interp.opacity_t)
        }),
        halo_width: data_driven(specialization.halo_width, || {
            unpack_mix_float(vertex.halo_width, interp.halo_width_t)
        }),
        halo_blur: data_driven(specialization.halo_blur, || {
            unpack_mix_float(vertex.halo_blur, interp.halo_blur_t)
        }),
        tex: atlas_pos / drawable.texsize(),
        gamma_scale: position.w,
        font_scale,
        fade_opacity: update_fade_opacity(vertex.fade_opacity, dynamic.fade_change),
    }
}
