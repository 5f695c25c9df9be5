//! Rendering layer
//!
//! The device API, the content-keyed caches in front of it, and the upload
//! path from compiled models to drawable [`Surface`]s.

pub mod api;
pub mod vertex_layout;
pub mod sampler;
pub mod cache;
pub mod device_cache;
pub mod texture_cache;
pub mod shader;
pub mod surface;
pub mod model_upload;
pub mod headless;

pub use api::{
    Buffer, BufferUsage, Camera, IndexFormat, PixelFormat, RenderDevice, RenderError, RenderResult,
    SamplerFilter, SamplerState, SamplerWrapMode, ShaderProgram, Texture, TextureDesc,
    VertexDeclaration, VertexElementFormat, VertexElementUsage, PROJ_MATRIX_PARAM, VIEW_MATRIX_PARAM,
};
pub use cache::ResourceCache;
pub use device_cache::DeviceCache;
pub use headless::{HeadlessDevice, HeadlessStats, UniformValue};
pub use model_upload::upload_compiled_model;
pub use sampler::SamplerStateInitializer;
pub use shader::{create_shader_program_from_files, ShaderBytecode, ShaderStages};
pub use surface::{DrawStateFlags, RasterizerState, Surface, SurfaceMaterial};
pub use texture_cache::TextureCache;
pub use vertex_layout::{VertexElement, VertexLayout};
