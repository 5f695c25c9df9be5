//! Sampler state descriptions

use super::api::{SamplerFilter, SamplerWrapMode};
use crate::config::DeviceConfig;

/// Full description of a sampler state object; the sampler cache key
///
/// All fields are enums or integers, so equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerStateInitializer {
    /// Filtering quality
    pub filter: SamplerFilter,
    /// U addressing
    pub wrap_u: SamplerWrapMode,
    /// V addressing
    pub wrap_v: SamplerWrapMode,
    /// W addressing
    pub wrap_w: SamplerWrapMode,
    /// Mip LOD bias
    pub mip_bias: i32,
    /// Lowest mip level sampled
    pub min_mip_level: u32,
    /// Highest mip level sampled
    pub max_mip_level: u32,
    /// Anisotropy for [`SamplerFilter::Anisotropic`]
    pub max_anisotropy: u32,
}

impl SamplerStateInitializer {
    /// Sampler with `filter`, repeat wrapping, and the full mip range
    pub const fn new(filter: SamplerFilter) -> Self {
        Self {
            filter,
            wrap_u: SamplerWrapMode::Repeat,
            wrap_v: SamplerWrapMode::Repeat,
            wrap_w: SamplerWrapMode::Repeat,
            mip_bias: 0,
            min_mip_level: 0,
            max_mip_level: u32::MAX,
            max_anisotropy: 16,
        }
    }

    /// Set the same wrap mode on all axes
    pub const fn with_wrap(mut self, wrap: SamplerWrapMode) -> Self {
        self.wrap_u = wrap;
        self.wrap_v = wrap;
        self.wrap_w = wrap;
        self
    }

    /// Set the anisotropy
    pub const fn with_max_anisotropy(mut self, max_anisotropy: u32) -> Self {
        self.max_anisotropy = max_anisotropy;
        self
    }

    /// Set the mip bias
    pub const fn with_mip_bias(mut self, mip_bias: i32) -> Self {
        self.mip_bias = mip_bias;
        self
    }

    /// Default sampler described by `config`, anisotropy clamped to `[1, device_max]`
    pub fn from_config(config: &DeviceConfig, device_max_anisotropy: u32) -> Self {
        Self::new(config.default_filter)
            .with_wrap(config.default_wrap)
            .with_mip_bias(config.mip_bias)
            .with_max_anisotropy(config.max_anisotropy.clamp(1, device_max_anisotropy.max(1)))
    }
}

impl Default for SamplerStateInitializer {
    fn default() -> Self {
        Self::new(SamplerFilter::Point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::hash::content_hash;

    #[test]
    fn test_equal_descriptions_hash_equal() {
        let a = SamplerStateInitializer::new(SamplerFilter::Trilinear).with_wrap(SamplerWrapMode::Clamp);
        let b = SamplerStateInitializer {
            filter: SamplerFilter::Trilinear,
            wrap_u: SamplerWrapMode::Clamp,
            wrap_v: SamplerWrapMode::Clamp,
            wrap_w: SamplerWrapMode::Clamp,
            mip_bias: 0,
            min_mip_level: 0,
            max_mip_level: u32::MAX,
            max_anisotropy: 16,
        };
        assert_eq!(a, b);
        assert_eq!(content_hash(&a, 0), content_hash(&b, 0));
    }

    #[test]
    fn test_mip_bias_distinguishes() {
        let a = SamplerStateInitializer::new(SamplerFilter::Bilinear);
        assert_ne!(a, a.with_mip_bias(-1));
    }

    #[test]
    fn test_from_config_clamps_anisotropy() {
        let config = DeviceConfig {
            max_anisotropy: 16,
            ..DeviceConfig::default()
        };
        assert_eq!(SamplerStateInitializer::from_config(&config, 8).max_anisotropy, 8);

        let config = DeviceConfig {
            max_anisotropy: 0,
            ..DeviceConfig::default()
        };
        assert_eq!(SamplerStateInitializer::from_config(&config, 8).max_anisotropy, 1);
        assert_eq!(SamplerStateInitializer::from_config(&config, 0).max_anisotropy, 1);
    }
}
