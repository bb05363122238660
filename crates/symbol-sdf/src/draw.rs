//! Draw-call level helpers.
//!
//! A draw call fixes the uniforms, the specialization and the atlas; every
//! vertex and every fragment inside it is then independent. `SymbolDraw`
//! fans the per-item work out over rayon and returns results in input
//! order.

use rayon::prelude::*;

use crate::color::Color;
use crate::fragment::shade_fragment;
use crate::layout::SymbolVertex;
use crate::specialization::SymbolSpecialization;
use crate::texture::SdfSampler;
use crate::uniforms::{SymbolEvaluatedPropsUbo, SymbolUniforms};
use crate::vertex::{transform_vertex, SymbolVaryings};

/// One of the two passes a symbol layer is drawn in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawPass {
    /// Outline behind the glyph; issued first.
    Halo,
    Fill,
}

/// Passes to issue for a layer, in draw order.
///
/// The halo pass is skipped only when it is provably invisible: both halo
/// width and halo color are uniform-sourced and either the width is zero
/// or the color is fully transparent. Data-driven halos are always drawn
/// since some features may carry one.
pub fn draw_passes(
    evaluated: &SymbolEvaluatedPropsUbo,
    specialization: &SymbolSpecialization,
    is_text: bool,
) -> Vec<DrawPass> {
    let paint = evaluated.paint(is_text);
    let uniform_halo = !specialization.halo_width.is_attribute() && !specialization.halo_color.is_attribute();
    let invisible = paint.halo_width <= 0.0 || paint.halo_color.a <= 0.0;

    if uniform_halo && invisible {
        log::trace!("skipping invisible halo pass (text: {is_text})");
        vec![DrawPass::Fill]
    } else {
        vec![DrawPass::Halo, DrawPass::Fill]
    }
}

/// Immutable state of one draw call.
#[derive(Debug, Copy, Clone)]
pub struct SymbolDraw<'a> {
    pub uniforms: &'a SymbolUniforms,
    pub specialization: &'a SymbolSpecialization,
}

impl<'a> SymbolDraw<'a> {
    pub fn new(uniforms: &'a SymbolUniforms, specialization: &'a SymbolSpecialization) -> Self {
        log::debug!(
            "symbol draw: text={} halo={} attribute mask={:#07b} inspector={}",
            uniforms.tile_props.is_text(),
            uniforms.tile_props.is_halo(),
            specialization.attribute_mask(),
            specialization.overdraw_inspector,
        );
        Self { uniforms, specialization }
    }

    #[inline]
    pub fn transform(&self, vertex: &SymbolVertex) -> SymbolVaryings {
        transform_vertex(vertex, self.uniforms, self.specialization)
    }

    #[inline]
    pub fn shade<S: SdfSampler + ?Sized>(&self, fragment: &SymbolVaryings, texture: &S) -> Color {
        shade_fragment(fragment, self.uniforms, self.specialization, texture)
    }

    /// Vertex stage over a whole buffer.
    pub fn transform_all(&self, vertices: &[SymbolVertex]) -> Vec<SymbolVaryings> {
        vertices.par_iter().map(|v| self.transform(v)).collect()
    }

    /// Fragment stage over a batch of interpolated bundles.
    pub fn shade_all<S: SdfSampler + Sync + ?Sized>(
        &self,
        fragments: &[SymbolVaryings],
        texture: &S,
    ) -> Vec<Color> {
        fragments.par_iter().map(|f| self.shade(f, texture)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::pack_fade_opacity;
    use crate::specialization::{PaintProperty, PropertySource};
    use crate::uniforms::{EvaluatedPaint, SymbolDynamicUbo, SymbolTilePropsUbo};
    use glam::Vec2;

    struct Flat(f32);

    impl SdfSampler for Flat {
        fn sample_alpha(&self, _uv: Vec2) -> f32 {
            self.0
        }
    }

    fn halo(width: f32, alpha: f32) -> SymbolEvaluatedPropsUbo {
        let text = EvaluatedPaint {
            halo_width: width,
            halo_color: Color::from_straight(1.0, 1.0, 1.0, alpha),
            ..EvaluatedPaint::default()
        };
        SymbolEvaluatedPropsUbo::new(text, EvaluatedPaint::default())
    }

    #[test]
    fn visible_halo_draws_both_passes_halo_first() {
        let passes = draw_passes(&halo(1.0, 1.0), &SymbolSpecialization::default(), true);
        assert_eq!(passes, vec![DrawPass::Halo, DrawPass::Fill]);
    }

    #[test]
    fn zero_width_or_transparent_halo_is_skipped() {
        let specialization = SymbolSpecialization::default();
        assert_eq!(draw_passes(&halo(0.0, 1.0), &specialization, true), vec![DrawPass::Fill]);
        assert_eq!(draw_passes(&halo(2.0, 0.0), &specialization, true), vec![DrawPass::Fill]);
    }

    #[test]
    fn data_driven_halo_is_never_skipped() {
        let specialization = SymbolSpecialization::default()
            .with_source(PaintProperty::HaloWidth, PropertySource::Attribute);
        assert_eq!(draw_passes(&halo(0.0, 1.0), &specialization, true).len(), 2);
    }

    #[test]
    fn icon_halo_reads_icon_half() {
        // Text has a visible halo, icon does not.
        let passes = draw_passes(&halo(1.0, 1.0), &SymbolSpecialization::default(), false);
        assert_eq!(passes, vec![DrawPass::Fill]);
    }

    #[test]
    fn batch_results_keep_input_order() {
        let uniforms = SymbolUniforms {
            dynamic: SymbolDynamicUbo::new(0.0, 1.0, 1.0),
            tile_props: SymbolTilePropsUbo::icon(1.0),
            ..SymbolUniforms::default()
        };
        let specialization = SymbolSpecialization::default();
        let draw = SymbolDraw::new(&uniforms, &specialization);

        let vertices: Vec<SymbolVertex> = (0..64)
            .map(|i| SymbolVertex {
                pos_offset: [0.0, 0.0, 32.0 * i as f32, 0.0],
                fade_opacity: pack_fade_opacity(1.0, true),
                ..SymbolVertex::default()
            })
            .collect();
        let out = draw.transform_all(&vertices);
        assert_eq!(out.len(), 64);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(v.position.x, i as f32);
        }

        let colors = draw.shade_all(&out, &Flat(1.0));
        assert_eq!(colors.len(), 64);
        assert!(colors.iter().all(|c| c.a == 1.0));
    }
}
