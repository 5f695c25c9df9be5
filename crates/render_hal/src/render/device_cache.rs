//! Vertex declaration and sampler state caches
//!
//! Two independent [`ResourceCache`] instances sitting in front of a
//! [`RenderDevice`]. The device itself never deduplicates; callers that want
//! shared declarations or samplers go through here.

use std::sync::Arc;

use super::api::{RenderDevice, RenderResult, SamplerState, VertexDeclaration};
use super::cache::ResourceCache;
use super::sampler::SamplerStateInitializer;
use super::vertex_layout::VertexLayout;
use crate::config::DeviceConfig;

/// Caches for device state objects keyed by their description
#[derive(Debug)]
pub struct DeviceCache {
    vertex_declarations: ResourceCache<VertexLayout, dyn VertexDeclaration>,
    sampler_states: ResourceCache<SamplerStateInitializer, dyn SamplerState>,
}

impl DeviceCache {
    /// Create empty caches whose key hashes use `seed`
    pub fn new(seed: u32) -> Self {
        Self {
            vertex_declarations: ResourceCache::with_seed("vertex declaration", seed),
            sampler_states: ResourceCache::with_seed("sampler state", seed),
        }
    }

    /// Shared vertex declaration for `layout`, created on first request
    pub fn vertex_declaration(
        &mut self,
        device: &mut dyn RenderDevice,
        layout: &VertexLayout,
    ) -> RenderResult<Arc<dyn VertexDeclaration>> {
        self.vertex_declarations
            .get_or_try_insert_with(layout.clone(), |layout| device.create_vertex_declaration(layout))
    }

    /// Shared sampler state for `initializer`, created on first request
    pub fn sampler_state(
        &mut self,
        device: &mut dyn RenderDevice,
        initializer: &SamplerStateInitializer,
    ) -> RenderResult<Arc<dyn SamplerState>> {
        self.sampler_states
            .get_or_try_insert_with(*initializer, |initializer| device.create_sampler_state(initializer))
    }

    /// Sampler described by `config`, anisotropy clamped to the device limit
    pub fn default_sampler(
        &mut self,
        device: &mut dyn RenderDevice,
        config: &DeviceConfig,
    ) -> RenderResult<Arc<dyn SamplerState>> {
        let initializer = SamplerStateInitializer::from_config(config, device.max_anisotropy());
        self.sampler_state(device, &initializer)
    }

    /// Sweep both caches; returns `(declarations, samplers)` released
    pub fn flush(&mut self) -> (usize, usize) {
        (self.vertex_declarations.sweep(), self.sampler_states.sweep())
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.vertex_declarations.clear();
        self.sampler_states.clear();
    }

    /// Number of cached vertex declarations
    pub fn vertex_declaration_count(&self) -> usize {
        self.vertex_declarations.len()
    }

    /// Number of cached sampler states
    pub fn sampler_state_count(&self) -> usize {
        self.sampler_states.len()
    }
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{SamplerFilter, VertexElementFormat, VertexElementUsage};
    use crate::render::headless::HeadlessDevice;
    use crate::render::vertex_layout::VertexElement;

    fn layout_a() -> VertexLayout {
        VertexLayout::new(
            vec![
                VertexElement::new(VertexElementUsage::Position, VertexElementFormat::Float3, 0),
                VertexElement::new(VertexElementUsage::TexCoord0, VertexElementFormat::Float2, 12),
            ],
            20,
        )
    }

    #[test]
    fn test_equal_layouts_share_declaration() {
        let mut device = HeadlessDevice::new();
        let mut cache = DeviceCache::default();

        let first = cache.vertex_declaration(&mut device, &layout_a()).unwrap();
        let second = cache
            .vertex_declaration(
                &mut device,
                &VertexLayout::packed(&[
                    (VertexElementUsage::Position, VertexElementFormat::Float3),
                    (VertexElementUsage::TexCoord0, VertexElementFormat::Float2),
                ]),
            )
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(device.stats().vertex_declarations_created, 1);
        assert_eq!(cache.vertex_declaration_count(), 1);
    }

    #[test]
    fn test_distinct_samplers_are_distinct_objects() {
        let mut device = HeadlessDevice::new();
        let mut cache = DeviceCache::default();

        let point = cache
            .sampler_state(&mut device, &SamplerStateInitializer::new(SamplerFilter::Point))
            .unwrap();
        let linear = cache
            .sampler_state(&mut device, &SamplerStateInitializer::new(SamplerFilter::Trilinear))
            .unwrap();
        let point_again = cache
            .sampler_state(&mut device, &SamplerStateInitializer::new(SamplerFilter::Point))
            .unwrap();

        assert!(!Arc::ptr_eq(&point, &linear));
        assert!(Arc::ptr_eq(&point, &point_again));
        assert_eq!(device.stats().sampler_states_created, 2);
    }

    #[test]
    fn test_default_sampler_clamps_to_device() {
        let mut device = HeadlessDevice::with_max_anisotropy(4);
        let mut cache = DeviceCache::default();

        let sampler = cache.default_sampler(&mut device, &DeviceConfig::default()).unwrap();
        assert_eq!(sampler.initializer().max_anisotropy, 4);
        assert_eq!(sampler.initializer().filter, SamplerFilter::Anisotropic);
    }

    #[test]
    fn test_flush_releases_unreferenced() {
        let mut device = HeadlessDevice::new();
        let mut cache = DeviceCache::default();

        let kept = cache.vertex_declaration(&mut device, &layout_a()).unwrap();
        let _ = cache
            .sampler_state(&mut device, &SamplerStateInitializer::default())
            .unwrap();

        assert_eq!(cache.flush(), (0, 1));
        assert_eq!(cache.vertex_declaration_count(), 1);
        assert_eq!(cache.sampler_state_count(), 0);

        drop(kept);
        assert_eq!(cache.flush(), (1, 0));

        // A fresh request after eviction creates a new object
        let _ = cache.vertex_declaration(&mut device, &layout_a()).unwrap();
        assert_eq!(device.stats().vertex_declarations_created, 2);
    }
}
