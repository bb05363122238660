//! Compile-time specialization of the symbol program.
//!
//! Every paint property is fed either by a uniform constant or by a
//! per-vertex attribute, never both. The choice is made once per draw
//! call, and the same `SymbolSpecialization` must be handed to both
//! stages.

use crate::error::SymbolError;

/// Where a paint property's value comes from for one draw call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PropertySource {
    /// Constant from `SymbolEvaluatedPropsUbo`.
    #[default]
    Uniform,
    /// Packed per-vertex attribute, mixed by the matching interpolate t.
    Attribute,
}

impl PropertySource {
    #[inline]
    pub fn is_attribute(self) -> bool {
        self == PropertySource::Attribute
    }
}

/// The five paint properties that can be data-driven.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaintProperty {
    FillColor,
    HaloColor,
    Opacity,
    HaloWidth,
    HaloBlur,
}

impl PaintProperty {
    pub const ALL: [PaintProperty; 5] = [
        PaintProperty::FillColor,
        PaintProperty::HaloColor,
        PaintProperty::Opacity,
        PaintProperty::HaloWidth,
        PaintProperty::HaloBlur,
    ];

    /// Define that marks the property as uniform-sourced.
    pub const fn uniform_define(self) -> &'static str {
        match self {
            PaintProperty::FillColor => "HAS_UNIFORM_u_fill_color",
            PaintProperty::HaloColor => "HAS_UNIFORM_u_halo_color",
            PaintProperty::Opacity => "HAS_UNIFORM_u_opacity",
            PaintProperty::HaloWidth => "HAS_UNIFORM_u_halo_width",
            PaintProperty::HaloBlur => "HAS_UNIFORM_u_halo_blur",
        }
    }
}

pub const OVERDRAW_INSPECTOR_DEFINE: &str = "OVERDRAW_INSPECTOR";

/// Specialization shared by the vertex and fragment stages.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SymbolSpecialization {
    pub fill_color: PropertySource,
    pub halo_color: PropertySource,
    pub opacity: PropertySource,
    pub halo_width: PropertySource,
    pub halo_blur: PropertySource,

    /// Debug override: every covered pixel becomes opaque white.
    pub overdraw_inspector: bool,

    /// Divides the base edge gamma. Fixed per program build.
    pub device_pixel_ratio: f32,
}

impl Default for SymbolSpecialization {
    /// All properties uniform-sourced, inspector off, 1x display.
    fn default() -> Self {
        Self {
            fill_color: PropertySource::Uniform,
            halo_color: PropertySource::Uniform,
            opacity: PropertySource::Uniform,
            halo_width: PropertySource::Uniform,
            halo_blur: PropertySource::Uniform,
            overdraw_inspector: false,
            device_pixel_ratio: 1.0,
        }
    }
}

impl SymbolSpecialization {
    /// Every property fed from vertex attributes.
    pub fn all_attributes() -> Self {
        let mut specialization = Self::default();
        for prop in PaintProperty::ALL {
            specialization.set_source(prop, PropertySource::Attribute);
        }
        specialization
    }

    pub fn source(&self, prop: PaintProperty) -> PropertySource {
        match prop {
            PaintProperty::FillColor => self.fill_color,
            PaintProperty::HaloColor => self.halo_color,
            PaintProperty::Opacity => self.opacity,
            PaintProperty::HaloWidth => self.halo_width,
            PaintProperty::HaloBlur => self.halo_blur,
        }
    }

    pub fn set_source(&mut self, prop: PaintProperty, source: PropertySource) {
        let slot = match prop {
            PaintProperty::FillColor => &mut self.fill_color,
            PaintProperty::HaloColor => &mut self.halo_color,
            PaintProperty::Opacity => &mut self.opacity,
            PaintProperty::HaloWidth => &mut self.halo_width,
            PaintProperty::HaloBlur => &mut self.halo_blur,
        };
        *slot = source;
    }

    pub fn with_source(mut self, prop: PaintProperty, source: PropertySource) -> Self {
        self.set_source(prop, source);
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_overdraw_inspector(mut self, enabled: bool) -> Self {
        self.overdraw_inspector = enabled;
        self
    }

    /// Builds a specialization from a program define list.
    ///
    /// Properties without a `HAS_UNIFORM_*` define are attribute-sourced,
    /// which mirrors how the GPU program is compiled.
    pub fn from_defines(defines: &[&str]) -> Result<Self, SymbolError> {
        let mut specialization = Self::all_attributes();
        for &define in defines {
            if define == OVERDRAW_INSPECTOR_DEFINE {
                specialization.overdraw_inspector = true;
                continue;
            }
            let prop = PaintProperty::ALL
                .into_iter()
                .find(|p| p.uniform_define() == define)
                .ok_or_else(|| SymbolError::UnknownDefine(define.to_owned()))?;
            specialization.set_source(prop, PropertySource::Uniform);
        }
        log::debug!("symbol specialization from defines {defines:?}: {specialization:?}");
        Ok(specialization)
    }

    /// Define list equivalent to this specialization.
    pub fn defines(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = PaintProperty::ALL
            .into_iter()
            .filter(|&p| self.source(p) == PropertySource::Uniform)
            .map(PaintProperty::uniform_define)
            .collect();
        if self.overdraw_inspector {
            out.push(OVERDRAW_INSPECTOR_DEFINE);
        }
        out
    }

    /// Bitmask of attribute-sourced properties, in `PaintProperty::ALL` order.
    ///
    /// Suitable as a pipeline cache key together with the inspector flag.
    pub fn attribute_mask(&self) -> u8 {
        PaintProperty::ALL
            .into_iter()
            .enumerate()
            .filter(|&(_, p)| self.source(p).is_attribute())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_uniform() {
        let specialization = SymbolSpecialization::default();
        assert_eq!(specialization.attribute_mask(), 0);
        assert_eq!(specialization.defines().len(), 5);
    }

    #[test]
    fn missing_define_means_attribute() {
        let specialization = SymbolSpecialization::from_defines(&[
            "HAS_UNIFORM_u_fill_color",
            "HAS_UNIFORM_u_opacity",
        ])
        .unwrap();
        assert_eq!(specialization.fill_color, PropertySource::Uniform);
        assert_eq!(specialization.opacity, PropertySource::Uniform);
        assert_eq!(specialization.halo_color, PropertySource::Attribute);
        assert_eq!(specialization.halo_width, PropertySource::Attribute);
        assert_eq!(specialization.halo_blur, PropertySource::Attribute);
        assert!(!specialization.overdraw_inspector);
    }

    #[test]
    fn overdraw_define_sets_flag() {
        let specialization = SymbolSpecialization::from_defines(&["OVERDRAW_INSPECTOR"]).unwrap();
        assert!(specialization.overdraw_inspector);
        assert_eq!(specialization.defines(), vec!["OVERDRAW_INSPECTOR"]);
    }

    #[test]
    fn unknown_define_is_rejected() {
        let err = SymbolSpecialization::from_defines(&["HAS_UNIFORM_u_color"]).unwrap_err();
        assert_eq!(err, SymbolError::UnknownDefine("HAS_UNIFORM_u_color".into()));
    }

    #[test]
    fn defines_roundtrip() {
        let specialization = SymbolSpecialization::default()
            .with_source(PaintProperty::HaloBlur, PropertySource::Attribute)
            .with_overdraw_inspector(true);
        let defines = specialization.defines();
        assert_eq!(SymbolSpecialization::from_defines(&defines).unwrap(), specialization);
    }

    #[test]
    fn attribute_mask_bits_follow_property_order() {
        let specialization = SymbolSpecialization::default()
            .with_source(PaintProperty::HaloColor, PropertySource::Attribute)
            .with_source(PaintProperty::HaloBlur, PropertySource::Attribute);
        assert_eq!(specialization.attribute_mask(), 0b1_0010);
        assert_eq!(SymbolSpecialization::all_attributes().attribute_mask(), 0b1_1111);
    }
}
