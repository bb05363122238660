//! Fragment stage: antialiased SDF compositing for one pixel.

use crate::color::Color;
use crate::consts::{EDGE_GAMMA, FILL_BUFFER, HALO_BLUR_SCALE, HALO_BUFFER_BASE, SDF_PX};
use crate::specialization::{PropertySource, SymbolSpecialization};
use crate::texture::SdfSampler;
use crate::uniforms::SymbolUniforms;
use crate::vertex::SymbolVaryings;

/// Hermite step: 0 at or below `edge0`, 1 at or above `edge1`, cubic between.
///
/// A zero-width band degenerates to a hard step at `edge0`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Paint values in effect for one pixel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolvedPaint {
    pub fill_color: Color,
    pub halo_color: Color,
    pub opacity: f32,
    pub halo_width: f32,
    pub halo_blur: f32,
}

#[inline]
fn pick<T>(source: PropertySource, uniform: T, varying: Option<T>) -> T {
    match (source, varying) {
        (PropertySource::Attribute, Some(v)) => v,
        (PropertySource::Attribute, None) => {
            debug_assert!(false, "attribute-sourced property missing from varyings");
            uniform
        }
        (PropertySource::Uniform, _) => uniform,
    }
}

/// Chooses each property's value from the uniform block or the varyings,
/// as the specialization dictates.
pub fn resolve_paint(
    input: &SymbolVaryings,
    uniforms: &SymbolUniforms,
    specialization: &SymbolSpecialization,
) -> ResolvedPaint {
    let constants = uniforms.evaluated.paint(uniforms.tile_props.is_text());
    ResolvedPaint {
        fill_color: pick(specialization.fill_color, constants.fill_color, input.fill_color),
        halo_color: pick(specialization.halo_color, constants.halo_color, input.halo_color),
        opacity: pick(specialization.opacity, constants.opacity, input.opacity),
        halo_width: pick(specialization.halo_width, constants.halo_width, input.halo_width),
        halo_blur: pick(specialization.halo_blur, constants.halo_blur, input.halo_blur),
    }
}

/// Width of the antialiasing band before the per-vertex `w` scaling.
#[inline]
pub fn edge_gamma(
    is_halo: bool,
    halo_blur: f32,
    font_gamma: f32,
    device_pixel_ratio: f32,
) -> f32 {
    let blur = if is_halo { halo_blur * HALO_BLUR_SCALE / SDF_PX } else { 0.0 };
    (blur + EDGE_GAMMA / device_pixel_ratio) / font_gamma
}

/// Distance threshold of the drawn edge.
#[inline]
pub fn edge_buffer(is_halo: bool, halo_width: f32, font_scale: f32) -> f32 {
    if is_halo {
        (HALO_BUFFER_BASE - halo_width / font_scale) / SDF_PX
    } else {
        FILL_BUFFER
    }
}

/// Coverage of one pixel given its distance sample.
#[inline]
pub fn coverage(dist: f32, buff: f32, gamma_scaled: f32) -> f32 {
    smoothstep(buff - gamma_scaled, buff + gamma_scaled, dist)
}

/// Runs the fragment stage for one pixel, returning a premultiplied color.
pub fn shade_fragment<S: SdfSampler + ?Sized>(
    input: &SymbolVaryings,
    uniforms: &SymbolUniforms,
    specialization: &SymbolSpecialization,
    texture: &S,
) -> Color {
    if specialization.overdraw_inspector {
        return Color::white();
    }
    shade_sdf(input, uniforms, specialization, texture)
}

fn shade_sdf<S: SdfSampler + ?Sized>(
    input: &SymbolVaryings,
    uniforms: &SymbolUniforms,
    specialization: &SymbolSpecialization,
    texture: &S,
) -> Color {
    let paint = resolve_paint(input, uniforms, specialization);
    let is_halo = uniforms.tile_props.is_halo();

    let font_gamma = input.font_scale * uniforms.drawable.gamma_scale;
    let color = if is_halo { paint.halo_color } else { paint.fill_color };
    let gamma = edge_gamma(is_halo, paint.halo_blur, font_gamma, specialization.device_pixel_ratio);
    let buff = edge_buffer(is_halo, paint.halo_width, input.font_scale);

    let dist = texture.sample_alpha(input.tex);
    let alpha = coverage(dist, buff, gamma * input.gamma_scale);

    color * (alpha * paint.opacity * input.fade_opacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialization::PaintProperty;
    use crate::uniforms::{EvaluatedPaint, SymbolEvaluatedPropsUbo, SymbolTilePropsUbo};
    use glam::{Vec2, Vec4};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    /// Atlas that returns the same distance everywhere.
    struct Flat(f32);

    impl SdfSampler for Flat {
        fn sample_alpha(&self, _uv: Vec2) -> f32 {
            self.0
        }
    }

    fn varyings() -> SymbolVaryings {
        SymbolVaryings {
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            fill_color: None,
            halo_color: None,
            opacity: None,
            halo_width: None,
            halo_blur: None,
            tex: Vec2::ZERO,
            gamma_scale: 1.0,
            font_scale: 1.0,
            fade_opacity: 1.0,
        }
    }

    fn text_uniforms(paint: EvaluatedPaint) -> SymbolUniforms {
        SymbolUniforms {
            tile_props: SymbolTilePropsUbo::text(24.0),
            evaluated: SymbolEvaluatedPropsUbo::new(paint, EvaluatedPaint::default()),
            ..SymbolUniforms::default()
        }
    }

    // ── smoothstep ────────────────────────────────────────────────────────

    #[test]
    fn smoothstep_saturates_outside_band() {
        assert_eq!(smoothstep(0.35, 0.45, 0.5), 1.0);
        assert_eq!(smoothstep(0.35, 0.45, 0.45), 1.0);
        assert_eq!(smoothstep(0.35, 0.45, 0.35), 0.0);
        assert_eq!(smoothstep(0.35, 0.45, -1.0), 0.0);
    }

    #[test]
    fn smoothstep_midpoint_is_half() {
        assert!(approx(smoothstep(0.0, 1.0, 0.5), 0.5));
    }

    #[test]
    fn smoothstep_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=200 {
            let x = i as f32 / 200.0;
            let v = smoothstep(0.3, 0.7, x);
            assert!(v >= prev, "x={x}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn smoothstep_zero_band_is_hard_step() {
        assert_eq!(smoothstep(0.5, 0.5, 0.49), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
    }

    // ── edge parameters ───────────────────────────────────────────────────

    #[test]
    fn fill_buffer_constant() {
        assert_eq!(edge_buffer(false, 123.0, 7.0), 0.75);
    }

    #[test]
    fn halo_buffer_shrinks_with_width() {
        assert!(approx(edge_buffer(true, 0.0, 1.0), 0.75));
        assert!(approx(edge_buffer(true, 2.0, 1.0), 0.5));
        assert!(approx(edge_buffer(true, 2.0, 2.0), 0.625));
    }

    #[test]
    fn edge_gamma_terms() {
        assert!(approx(edge_gamma(false, 5.0, 1.0, 1.0), 0.105));
        assert!(approx(edge_gamma(false, 0.0, 1.0, 2.0), 0.0525));
        assert!(approx(edge_gamma(true, 8.0, 2.0, 1.0), (1.19 + 0.105) / 2.0));
    }

    #[test]
    fn halo_pass_coverage() {
        assert_eq!(coverage(0.5, 0.4, 0.05), 1.0);
    }

    // ── full stage ────────────────────────────────────────────────────────

    #[test]
    fn fill_inside_glyph_is_fully_covered() {
        let fill = Color::from_straight(1.0, 0.0, 0.0, 1.0);
        let u = text_uniforms(EvaluatedPaint { fill_color: fill, ..EvaluatedPaint::default() });
        let out = shade_fragment(&varyings(), &u, &SymbolSpecialization::default(), &Flat(1.0));
        assert_eq!(out, fill);
    }

    #[test]
    fn fill_outside_glyph_is_transparent() {
        let u = text_uniforms(EvaluatedPaint::default());
        let out = shade_fragment(&varyings(), &u, &SymbolSpecialization::default(), &Flat(0.2));
        assert_eq!(out, Color::transparent());
    }

    #[test]
    fn output_scales_by_opacity_and_fade() {
        let u = text_uniforms(EvaluatedPaint {
            fill_color: Color::white(),
            opacity: 0.5,
            ..EvaluatedPaint::default()
        });
        let mut v = varyings();
        v.fade_opacity = 0.5;
        let out = shade_fragment(&v, &u, &SymbolSpecialization::default(), &Flat(1.0));
        assert_eq!(out, Color::white() * 0.25);
    }

    #[test]
    fn halo_pass_uses_halo_color_and_width() {
        let halo = Color::from_straight(0.0, 0.0, 1.0, 1.0);
        let mut u = text_uniforms(EvaluatedPaint {
            fill_color: Color::white(),
            halo_color: halo,
            halo_width: 2.0,
            ..EvaluatedPaint::default()
        });
        u.tile_props.is_halo = 1;
        // buff = (6 - 2) / 8 = 0.5 with a 0.105 band; 0.7 is past it.
        let out = shade_fragment(&varyings(), &u, &SymbolSpecialization::default(), &Flat(0.7));
        assert_eq!(out, halo);
    }

    #[test]
    fn attribute_values_override_uniforms() {
        let u = text_uniforms(EvaluatedPaint { opacity: 1.0, ..EvaluatedPaint::default() });
        let specialization = SymbolSpecialization::default()
            .with_source(PaintProperty::FillColor, PropertySource::Attribute)
            .with_source(PaintProperty::Opacity, PropertySource::Attribute);
        let mut v = varyings();
        v.fill_color = Some(Color::white());
        v.opacity = Some(0.5);
        let out = shade_fragment(&v, &u, &specialization, &Flat(1.0));
        assert_eq!(out, Color::white() * 0.5);
    }

    #[test]
    fn icon_uses_icon_constants() {
        let icon = EvaluatedPaint { fill_color: Color::white(), ..EvaluatedPaint::default() };
        let u = SymbolUniforms {
            tile_props: SymbolTilePropsUbo::icon(1.0),
            evaluated: SymbolEvaluatedPropsUbo::new(EvaluatedPaint::default(), icon),
            ..SymbolUniforms::default()
        };
        let out = shade_fragment(&varyings(), &u, &SymbolSpecialization::default(), &Flat(1.0));
        assert_eq!(out, Color::white());
    }

    #[test]
    fn overdraw_inspector_is_opaque_white() {
        let specialization = SymbolSpecialization::default().with_overdraw_inspector(true);
        let u = text_uniforms(EvaluatedPaint { opacity: 0.0, ..EvaluatedPaint::default() });
        let mut v = varyings();
        v.fade_opacity = 0.0;
        for dist in [0.0, 0.5, 1.0] {
            assert_eq!(shade_fragment(&v, &u, &specialization, &Flat(dist)), Color::white());
        }
    }

    #[test]
    fn far_fragments_get_wider_antialiasing() {
        let u = text_uniforms(EvaluatedPaint { fill_color: Color::white(), ..EvaluatedPaint::default() });
        let specialization = SymbolSpecialization::default();
        let near = varyings();
        let mut far = varyings();
        far.gamma_scale = 4.0;
        // Slightly outside the fill edge: the far pixel bleeds more coverage.
        let a_near = shade_fragment(&near, &u, &specialization, &Flat(0.7)).a;
        let a_far = shade_fragment(&far, &u, &specialization, &Flat(0.7)).a;
        assert!(a_far > a_near);
    }
}
