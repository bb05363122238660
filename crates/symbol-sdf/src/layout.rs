//! Attribute and binding interface of the symbol program.
//!
//! Vertex data layout (120 bytes, one `SymbolVertex` per quad corner):
//!
//!  offset   0  pos_offset     [f32; 4]   loc 5   anchor.xy, offset.xy
//!  offset  16  data           [f32; 4]   loc 6   atlas origin.xy, packed size.xy
//!  offset  32  pixeloffset    [f32; 4]   loc 7   extra px offset in .xy
//!  offset  48  projected_pos  [f32; 3]   loc 8   projected anchor.xy, angle
//!  offset  60  fade_opacity   f32        loc 9   packed fade
//!  offset  64  fill_color     [f32; 4]   loc 10  data-driven only
//!  offset  80  halo_color     [f32; 4]   loc 11  data-driven only
//!  offset  96  opacity        [f32; 2]   loc 12  data-driven only
//!  offset 104  halo_width     [f32; 2]   loc 13  data-driven only
//!  offset 112  halo_blur      [f32; 2]   loc 14  data-driven only
//!
//! The data-driven slots are always present in memory; only the ones the
//! specialization marks as attribute-sourced are bound.

use std::mem::{offset_of, size_of};
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use wgpu::{ShaderStages, VertexAttribute, VertexFormat};

use crate::specialization::{PaintProperty, SymbolSpecialization};
use crate::uniforms::{
    SymbolDrawableUbo, SymbolDynamicUbo, SymbolEvaluatedPropsUbo, SymbolInterpolateUbo,
    SymbolTilePropsUbo, UniformBlock,
};

// ── attribute slots ───────────────────────────────────────────────────────

pub const ATTR_POS_OFFSET: u32 = 5;
pub const ATTR_DATA: u32 = 6;
pub const ATTR_PIXEL_OFFSET: u32 = 7;
pub const ATTR_PROJECTED_POS: u32 = 8;
pub const ATTR_FADE_OPACITY: u32 = 9;
pub const ATTR_FILL_COLOR: u32 = 10;
pub const ATTR_HALO_COLOR: u32 = 11;
pub const ATTR_OPACITY: u32 = 12;
pub const ATTR_HALO_WIDTH: u32 = 13;
pub const ATTR_HALO_BLUR: u32 = 14;

// ── texture bindings ──────────────────────────────────────────────────────

pub const BINDING_SDF_TEXTURE: u32 = 5;
pub const BINDING_SDF_SAMPLER: u32 = 6;

// ── vertex ────────────────────────────────────────────────────────────────

/// One quad corner as produced by the tessellation stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SymbolVertex {
    pub pos_offset: [f32; 4],
    pub data: [f32; 4],
    pub pixeloffset: [f32; 4],
    pub projected_pos: [f32; 3],
    pub fade_opacity: f32,

    pub fill_color: [f32; 4],
    pub halo_color: [f32; 4],
    pub opacity: [f32; 2],
    pub halo_width: [f32; 2],
    pub halo_blur: [f32; 2],
}

const _: () = assert!(size_of::<SymbolVertex>() == 120);

impl SymbolVertex {
    const BASE_ATTRS: [VertexAttribute; 5] = [
        attr(ATTR_POS_OFFSET, offset_of!(SymbolVertex, pos_offset), VertexFormat::Float32x4),
        attr(ATTR_DATA, offset_of!(SymbolVertex, data), VertexFormat::Float32x4),
        attr(ATTR_PIXEL_OFFSET, offset_of!(SymbolVertex, pixeloffset), VertexFormat::Float32x4),
        attr(ATTR_PROJECTED_POS, offset_of!(SymbolVertex, projected_pos), VertexFormat::Float32x3),
        attr(ATTR_FADE_OPACITY, offset_of!(SymbolVertex, fade_opacity), VertexFormat::Float32),
    ];

    /// Bound attributes for `specialization`, ordered by slot.
    pub fn attributes(specialization: &SymbolSpecialization) -> Vec<VertexAttribute> {
        let mut attrs = Self::BASE_ATTRS.to_vec();
        attrs.extend(
            PaintProperty::ALL
                .into_iter()
                .filter(|&p| specialization.source(p).is_attribute())
                .map(override_attribute),
        );
        attrs
    }

    /// Buffer layout over `attributes`, which must outlive the layout.
    pub fn layout(attributes: &[VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<SymbolVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

const fn attr(slot: u32, offset: usize, format: VertexFormat) -> VertexAttribute {
    VertexAttribute { format, offset: offset as u64, shader_location: slot }
}

fn override_attribute(prop: PaintProperty) -> VertexAttribute {
    match prop {
        PaintProperty::FillColor => attr(
            ATTR_FILL_COLOR,
            offset_of!(SymbolVertex, fill_color),
            VertexFormat::Float32x4,
        ),
        PaintProperty::HaloColor => attr(
            ATTR_HALO_COLOR,
            offset_of!(SymbolVertex, halo_color),
            VertexFormat::Float32x4,
        ),
        PaintProperty::Opacity => {
            attr(ATTR_OPACITY, offset_of!(SymbolVertex, opacity), VertexFormat::Float32x2)
        }
        PaintProperty::HaloWidth => {
            attr(ATTR_HALO_WIDTH, offset_of!(SymbolVertex, halo_width), VertexFormat::Float32x2)
        }
        PaintProperty::HaloBlur => {
            attr(ATTR_HALO_BLUR, offset_of!(SymbolVertex, halo_blur), VertexFormat::Float32x2)
        }
    }
}

// ── bindings ──────────────────────────────────────────────────────────────

fn ubo_min_binding_size<T: UniformBlock>() -> NonZeroU64 {
    // Every block has a compile-time size assertion well above zero.
    NonZeroU64::new(size_of::<T>() as u64).unwrap_or(NonZeroU64::MIN)
}

fn ubo_entry<T: UniformBlock>(visibility: ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: T::SLOT,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(ubo_min_binding_size::<T>()),
        },
        count: None,
    }
}

/// Bind group layout for one symbol draw: five uniform blocks, the SDF
/// atlas and its sampler.
pub fn bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 7] {
    let both = ShaderStages::VERTEX | ShaderStages::FRAGMENT;
    [
        ubo_entry::<SymbolDynamicUbo>(both),
        ubo_entry::<SymbolDrawableUbo>(both),
        ubo_entry::<SymbolTilePropsUbo>(both),
        ubo_entry::<SymbolInterpolateUbo>(ShaderStages::VERTEX),
        ubo_entry::<SymbolEvaluatedPropsUbo>(both),
        wgpu::BindGroupLayoutEntry {
            binding: BINDING_SDF_TEXTURE,
            visibility: ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: BINDING_SDF_SAMPLER,
            visibility: ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

// ── program description ───────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniformBlockInfo {
    pub name: &'static str,
    pub slot: u32,
    pub size: usize,
    pub vertex: bool,
    pub fragment: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: &'static str,
    pub slot: u32,
    pub format: VertexFormat,
    /// Paint property this slot overrides, if it is a data-driven slot.
    pub property: Option<PaintProperty>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub name: &'static str,
    pub binding: u32,
}

/// Static description of the symbol SDF program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderInfo {
    pub name: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub uniforms: [UniformBlockInfo; 5],
    pub attributes: [AttributeInfo; 10],
    pub textures: [TextureInfo; 1],
}

const fn block<T: UniformBlock>(fragment: bool) -> UniformBlockInfo {
    UniformBlockInfo {
        name: T::NAME,
        slot: T::SLOT,
        size: size_of::<T>(),
        vertex: true,
        fragment,
    }
}

const fn attribute(
    name: &'static str,
    slot: u32,
    format: VertexFormat,
    property: Option<PaintProperty>,
) -> AttributeInfo {
    AttributeInfo { name, slot, format, property }
}

pub const SHADER_INFO: ShaderInfo = ShaderInfo {
    name: "SymbolSDFIconShader",
    vertex_entry: "vertexMain",
    fragment_entry: "fragmentMain",
    uniforms: [
        block::<SymbolDynamicUbo>(true),
        block::<SymbolDrawableUbo>(true),
        block::<SymbolTilePropsUbo>(true),
        block::<SymbolInterpolateUbo>(false),
        block::<SymbolEvaluatedPropsUbo>(true),
    ],
    attributes: [
        attribute("a_pos_offset", ATTR_POS_OFFSET, VertexFormat::Float32x4, None),
        attribute("a_data", ATTR_DATA, VertexFormat::Float32x4, None),
        attribute("a_pixeloffset", ATTR_PIXEL_OFFSET, VertexFormat::Float32x4, None),
        attribute("a_projected_pos", ATTR_PROJECTED_POS, VertexFormat::Float32x3, None),
        attribute("a_fade_opacity", ATTR_FADE_OPACITY, VertexFormat::Float32, None),
        attribute(
            "a_fill_color",
            ATTR_FILL_COLOR,
            VertexFormat::Float32x4,
            Some(PaintProperty::FillColor),
        ),
        attribute(
            "a_halo_color",
            ATTR_HALO_COLOR,
            VertexFormat::Float32x4,
            Some(PaintProperty::HaloColor),
        ),
        attribute("a_opacity", ATTR_OPACITY, VertexFormat::Float32x2, Some(PaintProperty::Opacity)),
        attribute(
            "a_halo_width",
            ATTR_HALO_WIDTH,
            VertexFormat::Float32x2,
            Some(PaintProperty::HaloWidth),
        ),
        attribute(
            "a_halo_blur",
            ATTR_HALO_BLUR,
            VertexFormat::Float32x2,
            Some(PaintProperty::HaloBlur),
        ),
    ],
    textures: [TextureInfo { name: "u_texture", binding: BINDING_SDF_TEXTURE }],
};
