//! Minimal software rasterizer for symbol quads.
//!
//! Covers pixel centers with the two triangles of each quad, blends the
//! corner bundles barycentrically and composites the shaded result
//! source-over into a premultiplied canvas. Coverage is decided in fixed
//! point with a top-left rule, so a pixel on the shared diagonal belongs
//! to exactly one triangle.

use glam::{Vec2, Vec4};
use symbol_sdf::{interpolate, Color, SdfSampler, SymbolDraw, SymbolVaryings};

/// Subpixel steps per pixel for coverage tests.
const SUBPIXEL: f32 = 256.0;

/// Screen coordinates beyond this are clamped before snapping.
const MAX_COORD: f32 = 1.0e6;

/// Fixed-point screen position.
type Fixed = (i64, i64);

fn snap(p: Vec2) -> Fixed {
    let p = p.clamp(Vec2::splat(-MAX_COORD), Vec2::splat(MAX_COORD)) * SUBPIXEL;
    (p.x.round() as i64, p.y.round() as i64)
}

/// Twice the signed area of `s, t, p`; exact, so a shared edge evaluates
/// to exactly zero in both triangles.
fn edge(s: Fixed, t: Fixed, p: Fixed) -> i64 {
    (t.0 - s.0) * (p.1 - s.1) - (t.1 - s.1) * (p.0 - s.0)
}

/// Top-left fill rule (+Y down). `sign` normalizes the winding so the
/// triangle interior is on the positive side of every edge.
fn is_top_left(s: Fixed, t: Fixed, sign: i64) -> bool {
    let (dx, dy) = ((t.0 - s.0) * sign, (t.1 - s.1) * sign);
    (dy == 0 && dx > 0) || dy < 0
}

/// Premultiplied RGBA pixel buffer, row-major, top-left origin.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, clear: Color) -> Self {
        Self { width, height, pixels: vec![clear; width as usize * height as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clip space to pixel coordinates (+Y down).
    fn to_screen(&self, clip: Vec4) -> Vec2 {
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
        )
    }

    /// Rasterizes quads given as corner bundles in
    /// top-left, top-right, bottom-right, bottom-left order.
    ///
    /// Returns the number of fragments shaded.
    pub fn draw_quads<S: SdfSampler + Sync>(
        &mut self,
        draw: &SymbolDraw<'_>,
        corners: &[SymbolVaryings],
        texture: &S,
    ) -> usize {
        let mut fragments = Vec::new();
        let mut targets = Vec::new();

        for quad in corners.chunks_exact(4) {
            for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
                self.cover_triangle(&tri, &mut fragments, &mut targets);
            }
        }

        // Shading is independent per fragment; blending is not.
        let colors = draw.shade_all(&fragments, texture);
        for (idx, color) in targets.into_iter().zip(colors) {
            self.pixels[idx] = color.over(self.pixels[idx]);
        }
        fragments.len()
    }

    fn cover_triangle(
        &self,
        tri: &[SymbolVaryings; 3],
        fragments: &mut Vec<SymbolVaryings>,
        targets: &mut Vec<usize>,
    ) {
        let screen = (*tri).map(|v| self.to_screen(v.position));
        if !screen.iter().all(|p| p.is_finite()) {
            return;
        }
        let [a, b, c] = screen.map(snap);
        let area = edge(a, b, c);
        if area == 0 {
            return;
        }
        let sign = area.signum();

        // Edge opposite each corner, in the order of the weights.
        let edges = [(b, c), (c, a), (a, b)];
        let bias = edges.map(|(s, e)| if is_top_left(s, e, sign) { 0 } else { -1 });
        let area = (area * sign) as f32;

        let [sa, sb, sc] = screen;
        let min = sa.min(sb).min(sc).max(Vec2::ZERO).floor();
        let max = sa.max(sb).max(sc).min(Vec2::new(self.width as f32, self.height as f32)).ceil();

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let p = snap(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let e = edges.map(|(s, t)| edge(s, t, p) * sign);
                if e.iter().zip(bias).any(|(&e, bias)| e + bias < 0) {
                    continue;
                }
                fragments.push(interpolate(tri, e.map(|e| e as f32 / area)));
                targets.push(y as usize * self.width as usize + x as usize);
            }
        }
    }

    /// Straight-alpha 8-bit RGBA bytes for encoding.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.pixels
            .iter()
            .flat_map(|c| {
                let (r, g, b, a) = c.to_straight();
                [byte(r), byte(g), byte(b), byte(a)]
            })
            .collect()
    }
}
