//! SDF atlas sampling.
//!
//! The fragment stage only reads one scalar per pixel, the alpha channel
//! of the distance field, so anything that can answer `sample_alpha` can
//! stand in for the GPU texture.

use glam::Vec2;

use crate::error::SymbolError;

/// Read-only distance field lookup.
pub trait SdfSampler {
    /// Distance value at normalized atlas coordinate `uv`, in `[0, 1]`.
    fn sample_alpha(&self, uv: Vec2) -> f32;
}

/// Filtering and addressing used when sampling the atlas.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Single-channel (R8) SDF atlas held in CPU memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaAtlas {
    width: u32,
    height: u32,
    texels: Vec<u8>,
    sampler: SamplerConfig,
}

impl AlphaAtlas {
    /// Wraps row-major texels; `texels.len()` must equal `width * height`.
    pub fn new(
        width: u32,
        height: u32,
        texels: Vec<u8>,
        sampler: SamplerConfig,
    ) -> Result<Self, SymbolError> {
        let expected = width as usize * height as usize;
        if expected == 0 || texels.len() != expected {
            return Err(SymbolError::AtlasSize { width, height, actual: texels.len() });
        }
        log::debug!("sdf atlas {width}x{height} ({:?}, {:?})", sampler.filter, sampler.address_mode);
        Ok(Self { width, height, texels, sampler })
    }

    /// Builds an atlas by evaluating `f(x, y)` at every texel.
    pub fn from_fn(
        width: u32,
        height: u32,
        sampler: SamplerConfig,
        mut f: impl FnMut(u32, u32) -> u8,
    ) -> Result<Self, SymbolError> {
        let mut texels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self::new(width, height, texels, sampler)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Atlas dimensions in texels, as stored in `SymbolDrawableUbo::texsize`.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn sampler(&self) -> SamplerConfig {
        self.sampler
    }

    /// Texel value in `[0, 1]` at a possibly out-of-range integer coordinate.
    fn texel(&self, x: i64, y: i64) -> f32 {
        let mode = self.sampler.address_mode;
        match (address(x, self.width, mode), address(y, self.height, mode)) {
            (Some(x), Some(y)) => {
                self.texels[y as usize * self.width as usize + x as usize] as f32 / 255.0
            }
            // Transparent border.
            _ => 0.0,
        }
    }
}

/// Maps an integer texel coordinate into `0..n` according to `mode`.
fn address(i: i64, n: u32, mode: wgpu::AddressMode) -> Option<u32> {
    let n = n as i64;
    let i = match mode {
        wgpu::AddressMode::ClampToEdge => i.clamp(0, n - 1),
        wgpu::AddressMode::Repeat => i.rem_euclid(n),
        wgpu::AddressMode::MirrorRepeat => {
            let m = i.rem_euclid(2 * n);
            if m < n { m } else { 2 * n - 1 - m }
        }
        wgpu::AddressMode::ClampToBorder => {
            if !(0..n).contains(&i) {
                return None;
            }
            i
        }
    };
    Some(i as u32)
}

impl SdfSampler for AlphaAtlas {
    fn sample_alpha(&self, uv: Vec2) -> f32 {
        let px = texel_space(uv.x, self.width);
        let py = texel_space(uv.y, self.height);
        match self.sampler.filter {
            wgpu::FilterMode::Nearest => self.texel(px.floor() as i64, py.floor() as i64),
            wgpu::FilterMode::Linear => {
                // Texel centers sit at half-integer coordinates.
                let fx = px - 0.5;
                let fy = py - 0.5;
                let x0 = fx.floor();
                let y0 = fy.floor();
                let tx = fx - x0;
                let ty = fy - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));

                let top = lerp(self.texel(x0, y0), self.texel(x1, y0), tx);
                let bottom = lerp(self.texel(x0, y1), self.texel(x1, y1), tx);
                lerp(top, bottom, ty)
            }
        }
    }
}

/// Largest texel-space magnitude kept; every `f32` past it is an integer.
const TEXEL_SPACE_LIMIT: f32 = 16_777_216.0;

/// Normalized coordinate to texel space, finite and bounded. NaN lands on
/// the origin.
#[inline]
fn texel_space(v: f32, n: u32) -> f32 {
    let p = v * n as f32;
    if p.is_nan() {
        0.0
    } else {
        p.clamp(-TEXEL_SPACE_LIMIT, TEXEL_SPACE_LIMIT)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
