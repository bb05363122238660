//! Boundary between the two stages.
//!
//! A rasterizer blends the vertex outputs of a primitive's corners before
//! handing them to the fragment stage. This module does the same thing
//! explicitly: plain linear blending of every bundle field by caller
//! supplied weights (no perspective correction).

use glam::{Vec2, Vec4};

use crate::color::Color;
use crate::vertex::SymbolVaryings;

trait Blend: Copy {
    const ZERO: Self;
    fn mul_add(self, w: f32, acc: Self) -> Self;
}

impl Blend for f32 {
    const ZERO: Self = 0.0;
    #[inline]
    fn mul_add(self, w: f32, acc: Self) -> Self {
        acc + self * w
    }
}

impl Blend for Vec2 {
    const ZERO: Self = Vec2::ZERO;
    #[inline]
    fn mul_add(self, w: f32, acc: Self) -> Self {
        acc + self * w
    }
}

impl Blend for Vec4 {
    const ZERO: Self = Vec4::ZERO;
    #[inline]
    fn mul_add(self, w: f32, acc: Self) -> Self {
        acc + self * w
    }
}

impl Blend for Color {
    const ZERO: Self = Color::transparent();
    #[inline]
    fn mul_add(self, w: f32, acc: Self) -> Self {
        let s = self * w;
        Color::from_premul(acc.r + s.r, acc.g + s.g, acc.b + s.b, acc.a + s.a)
    }
}

fn blend<T: Blend, const N: usize>(
    corners: &[SymbolVaryings; N],
    weights: &[f32; N],
    field: impl Fn(&SymbolVaryings) -> T,
) -> T {
    corners
        .iter()
        .zip(weights)
        .fold(T::ZERO, |acc, (c, &w)| field(c).mul_add(w, acc))
}

/// Data-driven fields are present on every corner or on none, since all
/// corners of a primitive share one specialization.
fn blend_opt<T: Blend, const N: usize>(
    corners: &[SymbolVaryings; N],
    weights: &[f32; N],
    field: impl Fn(&SymbolVaryings) -> Option<T>,
) -> Option<T> {
    let first = field(corners.first()?);
    first.map(|_| blend(corners, weights, |c| field(c).unwrap_or(T::ZERO)))
}

/// Blends the corner bundles of one primitive with `weights`.
///
/// Weights normally sum to 1 (barycentric for triangles, bilinear for
/// quads).
pub fn interpolate<const N: usize>(
    corners: &[SymbolVaryings; N],
    weights: [f32; N],
) -> SymbolVaryings {
    let w = &weights;
    SymbolVaryings {
        position: blend(corners, w, |c| c.position),
        fill_color: blend_opt(corners, w, |c| c.fill_color),
        halo_color: blend_opt(corners, w, |c| c.halo_color),
        opacity: blend_opt(corners, w, |c| c.opacity),
        halo_width: blend_opt(corners, w, |c| c.halo_width),
        halo_blur: blend_opt(corners, w, |c| c.halo_blur),
        tex: blend(corners, w, |c| c.tex),
        gamma_scale: blend(corners, w, |c| c.gamma_scale),
        font_scale: blend(corners, w, |c| c.font_scale),
        fade_opacity: blend(corners, w, |c| c.fade_opacity),
    }
}

/// Barycentric weights of `p` in triangle `abc`.
///
/// Weights are returned for points outside the triangle too (some will be
/// negative). `None` for a degenerate triangle.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<[f32; 3]> {
    let area = (b - a).perp_dot(c - a);
    if area.abs() <= f32::EPSILON {
        return None;
    }
    let wa = (b - p).perp_dot(c - p) / area;
    let wb = (c - p).perp_dot(a - p) / area;
    Some([wa, wb, 1.0 - wa - wb])
}

/// Bilinear weights for a quad with corners ordered
/// top-left, top-right, bottom-right, bottom-left.
pub fn bilinear(u: f32, v: f32) -> [f32; 4] {
    [(1.0 - u) * (1.0 - v), u * (1.0 - v), u * v, (1.0 - u) * v]
}
