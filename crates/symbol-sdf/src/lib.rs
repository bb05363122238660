//! Symbol SDF shading crate.
//!
//! CPU rendition of the two-stage symbol program used to draw map text
//! glyphs and point icons from a signed-distance-field atlas:
//!
//! - `vertex` places one quad corner on screen and produces the shading
//!   bundle (`SymbolVaryings`).
//! - `interpolate` stands in for the rasterizer between the two stages.
//! - `fragment` turns an interpolated bundle plus one atlas sample into a
//!   premultiplied color.
//!
//! Both stages are pure. Everything they read is supplied per draw call
//! (`uniforms`, `specialization`, `texture`) and is never mutated.

pub mod consts;
pub mod color;
pub mod draw;
pub mod error;
pub mod fragment;
pub mod interpolate;
pub mod layout;
pub mod logging;
pub mod packing;
pub mod specialization;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use color::Color;
pub use draw::{draw_passes, DrawPass, SymbolDraw};
pub use error::SymbolError;
pub use fragment::{shade_fragment, smoothstep};
pub use interpolate::{barycentric, interpolate};
pub use layout::{SymbolVertex, SHADER_INFO};
pub use specialization::{PropertySource, SymbolSpecialization};
pub use texture::{AlphaAtlas, SamplerConfig, SdfSampler};
pub use uniforms::{
    SymbolDrawableUbo, SymbolDynamicUbo, SymbolEvaluatedPropsUbo, SymbolInterpolateUbo,
    SymbolTilePropsUbo, SymbolUniforms,
};
pub use vertex::{transform_vertex, SymbolVaryings};
