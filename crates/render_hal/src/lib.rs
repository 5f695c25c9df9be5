//! # Render HAL
//!
//! A device-independent rendering layer: GPU resource creation behind a
//! backend trait, content-hashed caches that deduplicate equivalent resource
//! descriptions, and a model pipeline that compiles Wavefront OBJ meshes into
//! welded, indexed vertex buffers grouped by material.
//!
//! ## Features
//!
//! - **Device Abstraction**: Buffers, vertex layouts, shaders, textures and samplers
//!   behind the [`render::RenderDevice`] trait
//! - **Resource Caching**: MurmurHash2A-keyed caches with reference-count sweeping
//! - **Mesh Compilation**: Fan triangulation, vertex welding, tangent generation
//! - **Texture Cache**: Path-keyed texture deduplication with `image` decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_hal::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenderHalConfig::default();
//!     let mut device = HeadlessDevice::new();
//!     device.init()?;
//!
//!     let raw = load_model("models/teapot.obj")?;
//!     let compiled = MeshCompiler::compile(&raw);
//!
//!     let mut device_cache = DeviceCache::new(config.assets.hash_seed);
//!     let mut textures = TextureCache::new(&config.assets);
//!     let surfaces = upload_compiled_model(
//!         &mut device,
//!         &mut device_cache,
//!         &mut textures,
//!         &compiled,
//!         "models",
//!         &config.device,
//!     )?;
//!     println!("{} surfaces ready", surfaces.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::{
            load_model, AssetError, CompiledModel, CompiledSurface, MeshCompiler, ObjLoader,
            ObjMaterial, RawModel,
        },
        config::{AssetConfig, Config, ConfigError, DeviceConfig, RenderHalConfig},
        foundation::{
            hash::{calculate_murmur_hash, MurmurHash2A},
            math::{Vec2, Vec3},
        },
        render::{
            upload_compiled_model, Buffer, Camera, DeviceCache, HeadlessDevice, RenderDevice,
            RenderError, RenderResult, ResourceCache, SamplerStateInitializer, ShaderProgram,
            Surface, TextureCache, VertexElement, VertexLayout,
        },
    };
}
