//! Backend abstraction traits for the rendering system
//!
//! This module defines the traits that rendering backends must implement
//! to provide a consistent interface to the caches and the model uploader.
//! Resources are handed out as `Arc<dyn Trait>`; a handle stays alive as long
//! as any owner (a cache or a surface) holds it, and the backend releases the
//! GPU object when the last owner drops it.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::types::{BufferUsage, ClearTargets, PixelFormat, TextureDesc, TextureKind};
use super::RenderResult;
use crate::foundation::math::{Mat3, Mat4, Vec3};
use crate::render::sampler::SamplerStateInitializer;
use crate::render::shader::ShaderStages;
use crate::render::surface::Surface;
use crate::render::vertex_layout::VertexLayout;

/// GPU buffer holding vertex or index data
pub trait Buffer: Debug + Any {
    /// Usage flags the buffer was created with
    fn usage(&self) -> BufferUsage;

    /// Size in bytes
    fn size(&self) -> usize;

    /// Overwrite `data.len()` bytes starting at `offset`
    ///
    /// Fails with [`RenderError::InvalidBuffer`](super::RenderError::InvalidBuffer)
    /// on a `READ_ONLY` buffer or when the range runs past the end.
    fn update(&self, offset: usize, data: &[u8]) -> RenderResult<()>;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}

/// Backend object describing how vertex buffer bytes map to shader inputs
pub trait VertexDeclaration: Debug + Any {
    /// Layout this declaration was built from
    fn layout(&self) -> &VertexLayout;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}

/// Linked shader program
pub trait ShaderProgram: Debug + Any {
    /// Location of a uniform parameter, `None` if the program has no such parameter
    fn parameter_location(&self, name: &str) -> Option<i32>;

    /// Set a boolean uniform; a `None` location is ignored
    fn set_bool(&self, location: Option<i32>, value: bool);

    /// Set a float uniform; a `None` location is ignored
    fn set_float(&self, location: Option<i32>, value: f32);

    /// Set a vec3 uniform; a `None` location is ignored
    fn set_vec3(&self, location: Option<i32>, value: &Vec3);

    /// Set a 3x3 matrix uniform; a `None` location is ignored
    fn set_mat3(&self, location: Option<i32>, value: &Mat3);

    /// Set a 4x4 matrix uniform; a `None` location is ignored
    fn set_mat4(&self, location: Option<i32>, value: &Mat4);

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}

/// 2D texture or cube map
pub trait Texture: Debug + Any {
    /// Texture dimensionality
    fn kind(&self) -> TextureKind;

    /// Width of the base level in pixels
    fn width(&self) -> u32;

    /// Height of the base level in pixels
    fn height(&self) -> u32;

    /// Number of mip levels
    fn num_mips(&self) -> u32;

    /// Pixel format
    fn format(&self) -> PixelFormat;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}

/// Immutable sampler state object
pub trait SamplerState: Debug + Any {
    /// Description the sampler was created from
    fn initializer(&self) -> &SamplerStateInitializer;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}

/// Uniform receiving [`Camera::projection_matrix`] on every draw
pub const PROJ_MATRIX_PARAM: &str = "ProjMatrix";

/// Uniform receiving [`Camera::view_matrix`] on every draw
pub const VIEW_MATRIX_PARAM: &str = "ModelViewMatrix";

/// View parameters needed to draw a surface
pub trait Camera {
    /// Eye position in world space
    fn view_position(&self) -> Vec3;

    /// World-to-view matrix
    fn view_matrix(&self) -> Mat4;

    /// View-to-clip matrix
    fn projection_matrix(&self) -> Mat4;
}

/// Main rendering device trait
///
/// Exactly one backend implements this at a time. Every creation call is
/// synchronous. Failures are reported as [`RenderError`](super::RenderError)
/// and abort the caller's load; the caches never see a failed creation.
pub trait RenderDevice {
    /// Initialize backend state (default sampler bindings, vertex array objects)
    fn init(&mut self) -> RenderResult<()>;

    /// Release backend state; safe to call more than once
    fn shutdown(&mut self);

    /// Create a buffer initialized with `data`
    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> RenderResult<Arc<dyn Buffer>>;

    /// Create a vertex declaration for `layout`
    ///
    /// Not cached at this level; go through
    /// [`DeviceCache`](crate::render::DeviceCache) to share declarations.
    fn create_vertex_declaration(&mut self, layout: &VertexLayout) -> RenderResult<Arc<dyn VertexDeclaration>>;

    /// Compile and link a shader program
    fn create_shader_program(&mut self, stages: &ShaderStages) -> RenderResult<Arc<dyn ShaderProgram>>;

    /// Make `program` current for subsequent draws
    fn set_shader_program(&mut self, program: &Arc<dyn ShaderProgram>);

    /// Create a mipmapped 2D texture from tightly packed pixels
    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> RenderResult<Arc<dyn Texture>>;

    /// Create a cube map
    ///
    /// Face order: +X (right), -X (left), +Y (top), -Y (bottom), +Z (back), -Z (front).
    fn create_texture_cube(&mut self, desc: &TextureDesc, faces: [&[u8]; 6]) -> RenderResult<Arc<dyn Texture>>;

    /// Bind `texture` to `slot`, or unbind the slot with `None`
    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture>>);

    /// Create a sampler state object
    ///
    /// Not cached at this level; go through
    /// [`DeviceCache`](crate::render::DeviceCache) to share samplers.
    fn create_sampler_state(&mut self, initializer: &SamplerStateInitializer) -> RenderResult<Arc<dyn SamplerState>>;

    /// Bind a sampler to `slot`
    fn set_sampler_state(&mut self, slot: u32, state: &Arc<dyn SamplerState>);

    /// Clear the selected targets
    fn clear(&mut self, targets: ClearTargets, color: [f32; 4], depth: f32);

    /// Draw one surface with the current shader program
    ///
    /// The camera matrices go to [`PROJ_MATRIX_PARAM`] and
    /// [`VIEW_MATRIX_PARAM`] when the program declares them.
    fn render(&mut self, surface: &Surface, camera: &dyn Camera) -> RenderResult<()>;

    /// Highest anisotropy the device supports
    fn max_anisotropy(&self) -> u32;

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn Any;
}
