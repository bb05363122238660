//! Demo scene: a text layer with halos and a data-driven icon layer.

use glam::{Mat4, Vec2};
use symbol_sdf::consts::{FILL_BUFFER, SDF_PX};
use symbol_sdf::packing::{pack_fade_opacity, pack_size};
use symbol_sdf::specialization::PaintProperty;
use symbol_sdf::uniforms::EvaluatedPaint;
use symbol_sdf::{
    AlphaAtlas, Color, PropertySource, SamplerConfig, SymbolDrawableUbo, SymbolDynamicUbo,
    SymbolError, SymbolEvaluatedPropsUbo, SymbolInterpolateUbo, SymbolSpecialization,
    SymbolTilePropsUbo, SymbolUniforms, SymbolVertex,
};

/// Edge length of one atlas cell in texels.
const CELL: u32 = 32;

/// Atlas cells, left to right.
const RING: u32 = 0;
const DISC: u32 = 1;

/// One draw call worth of symbols.
pub struct Layer {
    pub name: &'static str,
    pub uniforms: SymbolUniforms,
    pub specialization: SymbolSpecialization,
    pub vertices: Vec<SymbolVertex>,
}

/// Encodes a signed distance (texels, positive outside) the way glyph
/// atlases do: the edge sits at `FILL_BUFFER` and each texel outward
/// drops the value by `1 / SDF_PX`.
fn encode_distance(d: f32) -> u8 {
    ((FILL_BUFFER - d / SDF_PX).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Two procedural shapes: a ring and a disc.
pub fn build_atlas() -> Result<AlphaAtlas, SymbolError> {
    AlphaAtlas::from_fn(CELL * 2, CELL, SamplerConfig::default(), |x, y| {
        let cell = x / CELL;
        let local = Vec2::new((x % CELL) as f32 + 0.5, y as f32 + 0.5);
        let r = local.distance(Vec2::splat(CELL as f32 * 0.5));
        let d = match cell {
            RING => (r - 10.0).max(5.0 - r),
            _ => r - 10.0,
        };
        encode_distance(d)
    })
}

/// Four corners of a symbol quad centered on `anchor`.
fn quad(
    anchor: Vec2,
    cell: u32,
    angle: f32,
    size: [f32; 2],
    fade: f32,
    opacity: [f32; 2],
) -> [SymbolVertex; 4] {
    let half = (CELL / 2) as f32;
    let origin = (cell * CELL) as f32;
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    corners.map(|(sx, sy)| SymbolVertex {
        // Offsets are in 1/32 px at font scale 1.
        pos_offset: [anchor.x, anchor.y, sx * half * 32.0, sy * half * 32.0],
        data: [
            origin + (sx + 1.0) * half,
            (sy + 1.0) * half,
            size[0],
            size[1],
        ],
        projected_pos: [anchor.x, anchor.y, angle],
        fade_opacity: fade,
        opacity,
        ..SymbolVertex::default()
    })
}

fn drawable(width: u32, height: u32, atlas: &AlphaAtlas) -> SymbolDrawableUbo {
    // Tile and label plane are both canvas pixels here; only the final
    // coordinate matrix maps to clip space.
    let to_clip = Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
    SymbolDrawableUbo::new(Mat4::IDENTITY, Mat4::IDENTITY, to_clip, atlas.size(), 1.0, false)
}

pub fn build_scene(width: u32, height: u32, atlas: &AlphaAtlas, overdraw: bool) -> Vec<Layer> {
    let dynamic = SymbolDynamicUbo::new(0.1, 1.0, width as f32 / height as f32);
    let drawable = drawable(width, height, atlas);

    // ── text layer: rings with a white halo ───────────────────────────────
    let text_paint = EvaluatedPaint {
        fill_color: Color::from_straight(0.1, 0.2, 0.6, 1.0),
        halo_color: Color::white(),
        opacity: 1.0,
        halo_width: 2.0,
        halo_blur: 0.5,
    };
    let text = Layer {
        name: "text",
        uniforms: SymbolUniforms {
            dynamic,
            drawable,
            tile_props: SymbolTilePropsUbo::text(48.0),
            interpolate: SymbolInterpolateUbo::default(),
            evaluated: SymbolEvaluatedPropsUbo::new(text_paint, EvaluatedPaint::default()),
        },
        specialization: SymbolSpecialization::default().with_overdraw_inspector(overdraw),
        vertices: [0.0f32, 0.4, 0.8]
            .iter()
            .enumerate()
            .flat_map(|(i, &angle)| {
                let anchor = Vec2::new(60.0 + i as f32 * 80.0, 60.0);
                quad(anchor, RING, angle, [0.0, 0.0], pack_fade_opacity(0.9, true), [1.0, 1.0])
            })
            .collect(),
    };

    // ── icon layer: discs with per-feature opacity, fading at different rates
    let icon_paint = EvaluatedPaint {
        fill_color: Color::from_straight(0.8, 0.2, 0.1, 1.0),
        ..EvaluatedPaint::default()
    };
    let icon = Layer {
        name: "icon",
        uniforms: SymbolUniforms {
            dynamic,
            drawable,
            // Composite size: halfway between 128/128 and 256/128.
            tile_props: SymbolTilePropsUbo::icon(0.0).with_size_flags(false, false, 0.5),
            interpolate: SymbolInterpolateUbo::uniform(1.0),
            evaluated: SymbolEvaluatedPropsUbo::new(EvaluatedPaint::default(), icon_paint),
        },
        specialization: SymbolSpecialization::default()
            .with_source(PaintProperty::Opacity, PropertySource::Attribute)
            .with_overdraw_inspector(overdraw),
        vertices: (0..4)
            .flat_map(|i| {
                let anchor = Vec2::new(40.0 + i as f32 * 60.0, 150.0);
                let opacity = [1.0, 0.25 + 0.25 * i as f32];
                let fade = pack_fade_opacity(0.3 * i as f32, i % 2 == 0);
                quad(anchor, DISC, 0.0, pack_size(128.0, 256.0), fade, opacity)
            })
            .collect(),
    };

    vec![text, icon]
}
