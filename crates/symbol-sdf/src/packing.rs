//! Packed attribute encodings.
//!
//! Several per-vertex values are squeezed into fewer float components by
//! the upstream buffer builder. Each format gets a pure unpack function
//! (what the vertex stage does) and, where producers need it, the
//! matching pack function.
//!
//! Layouts:
//!
//! - size pair: `[min * 2, max]`. The low bit of the first component is
//!   reserved, so `min = floor(raw[0] / 2)`.
//! - fade opacity: `opacity_bits * 2 + target_bit`, `opacity_bits` in
//!   `0..=127`, `target_bit` set when the symbol is fading in.
//! - color: two floats, each holding two bytes as `hi * 256 + lo`, in
//!   `r g | b a` order.

use crate::color::Color;
use crate::consts::FADE_OPACITY_STEPS;

/// Two size keyframes decoded from a vertex's `data.zw`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PackedSize {
    pub min: f32,
    pub max: f32,
}

#[inline]
pub fn unpack_size(raw: [f32; 2]) -> PackedSize {
    PackedSize { min: (raw[0] * 0.5).floor(), max: raw[1] }
}

#[inline]
pub fn pack_size(min: f32, max: f32) -> [f32; 2] {
    [min * 2.0, max]
}

/// Current fade opacity and the direction it is animating in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeState {
    pub opacity: f32,
    pub increasing: bool,
}

#[inline]
pub fn unpack_fade_opacity(packed: f32) -> FadeState {
    // Integer halving drops the target bit.
    let bits = (packed as i32) / 2;
    FadeState {
        opacity: bits as f32 / FADE_OPACITY_STEPS,
        increasing: packed % 2.0 > 0.5,
    }
}

#[inline]
pub fn pack_fade_opacity(opacity: f32, increasing: bool) -> f32 {
    let bits = (opacity.clamp(0.0, 1.0) * FADE_OPACITY_STEPS).floor();
    bits * 2.0 + if increasing { 1.0 } else { 0.0 }
}

#[inline]
fn unpack_byte_pair(v: f32) -> (f32, f32) {
    let v = v as i32;
    let hi = v / 256;
    (hi as f32, (v - hi * 256) as f32)
}

/// Decodes four bytes packed in two floats into a color in `[0, 1]`.
#[inline]
pub fn decode_color(packed: [f32; 2]) -> Color {
    let (r, g) = unpack_byte_pair(packed[0]);
    let (b, a) = unpack_byte_pair(packed[1]);
    Color::from_premul(r / 255.0, g / 255.0, b / 255.0, a / 255.0)
}

#[inline]
pub fn encode_color(c: Color) -> [f32; 2] {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round();
    [byte(c.r) * 256.0 + byte(c.g), byte(c.b) * 256.0 + byte(c.a)]
}

/// Decodes the start/end colors in `packed.xy` / `packed.zw` and mixes them.
#[inline]
pub fn unpack_mix_color(packed: [f32; 4], t: f32) -> Color {
    let start = decode_color([packed[0], packed[1]]);
    let end = decode_color([packed[2], packed[3]]);
    start.lerp(end, t)
}

#[inline]
pub fn unpack_mix_float(packed: [f32; 2], t: f32) -> f32 {
    packed[0] + (packed[1] - packed[0]) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── size ──────────────────────────────────────────────────────────────

    #[test]
    fn size_min_is_floor_half() {
        assert_eq!(unpack_size([20.0, 40.0]), PackedSize { min: 10.0, max: 40.0 });
        // Reserved low bit is discarded.
        assert_eq!(unpack_size([21.0, 40.0]).min, 10.0);
    }

    #[test]
    fn pack_size_inverts_unpack() {
        assert_eq!(unpack_size(pack_size(10.0, 20.0)), PackedSize { min: 10.0, max: 20.0 });
    }

    // ── fade opacity ──────────────────────────────────────────────────────

    #[test]
    fn fade_unpacks_direction_bit() {
        assert!(unpack_fade_opacity(229.0).increasing);
        assert!(!unpack_fade_opacity(228.0).increasing);
    }

    #[test]
    fn fade_unpacks_opacity_bits() {
        let s = unpack_fade_opacity(127.0 * 2.0 + 1.0);
        assert!(approx(s.opacity, 1.0));
        assert!(s.increasing);

        let s = unpack_fade_opacity(0.0);
        assert_eq!(s, FadeState { opacity: 0.0, increasing: false });
    }

    #[test]
    fn fade_pack_quantizes_down() {
        // 0.9 * 127 = 114.3 -> 114
        assert_eq!(pack_fade_opacity(0.9, true), 229.0);
        let s = unpack_fade_opacity(229.0);
        assert!(approx(s.opacity, 114.0 / 127.0));
    }

    #[test]
    fn fade_pack_clamps_input() {
        assert_eq!(pack_fade_opacity(3.0, false), 254.0);
        assert_eq!(pack_fade_opacity(-1.0, true), 1.0);
    }

    // ── color ─────────────────────────────────────────────────────────────

    #[test]
    fn decode_color_bytes() {
        // r=255 g=0 | b=128 a=255
        let c = decode_color([255.0 * 256.0, 128.0 * 256.0 + 255.0]);
        assert!(approx(c.r, 1.0));
        assert!(approx(c.g, 0.0));
        assert!(approx(c.b, 128.0 / 255.0));
        assert!(approx(c.a, 1.0));
    }

    #[test]
    fn encode_color_rounds_to_bytes() {
        let packed = encode_color(Color::from_premul(1.0, 0.0, 0.5, 1.0));
        assert_eq!(packed, [255.0 * 256.0, 128.0 * 256.0 + 255.0]);
    }

    #[test]
    fn mix_color_interpolates_between_keyframes() {
        let black = encode_color(Color::from_premul(0.0, 0.0, 0.0, 1.0));
        let white = encode_color(Color::white());
        let c = unpack_mix_color([black[0], black[1], white[0], white[1]], 0.25);
        assert!(approx(c.r, 0.25));
        assert!(approx(c.a, 1.0));
    }

    #[test]
    fn mix_float_endpoints() {
        assert_eq!(unpack_mix_float([2.0, 6.0], 0.0), 2.0);
        assert_eq!(unpack_mix_float([2.0, 6.0], 1.0), 6.0);
        assert_eq!(unpack_mix_float([2.0, 6.0], 0.5), 4.0);
    }
}
