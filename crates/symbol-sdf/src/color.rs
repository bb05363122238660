use core::ops::Mul;

/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are already multiplied by `a`.
///
/// Style colors arrive premultiplied from the evaluator, and the fragment
/// stage only ever scales them by a coverage factor, so the output stays
/// premultiplied without a conversion step.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Opaque white; the overdraw inspector output.
    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// Creates a color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Reads a `[r, g, b, a]` uniform field, already premultiplied.
    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Self { r: c[0], g: c[1], b: c[2], a: c[3] }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Component-wise `mix(self, other, t)`.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// Source-over composite of `self` onto `dst`, both premultiplied.
    #[inline]
    pub fn over(self, dst: Color) -> Self {
        let k = 1.0 - self.a;
        Self {
            r: self.r + dst.r * k,
            g: self.g + dst.g * k,
            b: self.b + dst.b * k,
            a: self.a + dst.a * k,
        }
    }
}

/// Uniform scale of all four channels. Keeps premultiplication intact.
impl Mul<f32> for Color {
    type Output = Color;
    #[inline]
    fn mul(self, k: f32) -> Color {
        Color::from_premul(self.r * k, self.g * k, self.b * k, self.a * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_straight_premultiplies() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn scaling_keeps_rgb_below_alpha() {
        let c = Color::from_straight(0.8, 0.2, 0.4, 0.9) * 0.3;
        assert!(c.r <= c.a && c.g <= c.a && c.b <= c.a);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Color::from_premul(0.0, 0.0, 0.0, 0.0);
        let b = Color::white();
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5).a, 0.5);
    }

    #[test]
    fn over_opaque_source_hides_destination() {
        let src = Color::white();
        let dst = Color::from_premul(0.2, 0.1, 0.0, 1.0);
        assert_eq!(src.over(dst), src);
    }

    #[test]
    fn over_transparent_source_is_identity() {
        let dst = Color::from_premul(0.2, 0.1, 0.0, 0.5);
        assert_eq!(Color::transparent().over(dst), dst);
    }

    #[test]
    fn to_straight_of_transparent_is_zero() {
        assert_eq!(Color::transparent().to_straight(), (0.0, 0.0, 0.0, 0.0));
    }
}
