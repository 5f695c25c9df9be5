//! Renderable surfaces
//!
//! A [`Surface`] is one GPU-ready, single-material triangle list: buffers,
//! the vertex declaration that describes them, and the material state bound
//! when it is drawn.

use std::sync::Arc;

use bitflags::bitflags;

use super::api::{Buffer, CullMode, FillMode, IndexFormat, SamplerState, Texture, VertexDeclaration};
use crate::foundation::math::Vec3;

bitflags! {
    /// Fixed-function state toggles applied when drawing a surface
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawStateFlags: u32 {
        /// Depth test enabled
        const DEPTH_TEST = 1 << 0;
        /// Depth writes enabled
        const DEPTH_WRITE = 1 << 1;
        /// Alpha blending enabled
        const BLEND = 1 << 2;
    }
}

impl Default for DrawStateFlags {
    fn default() -> Self {
        Self::DEPTH_TEST | Self::DEPTH_WRITE
    }
}

/// Rasterizer configuration for a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Culled winding
    pub cull_mode: CullMode,
    /// Fill mode
    pub fill_mode: FillMode,
    /// Point size for [`FillMode::Point`]
    pub point_size: f32,
    /// Line width for [`FillMode::Wireframe`]
    pub line_width: f32,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::default(),
            fill_mode: FillMode::default(),
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

/// Texture slot conventions used by the model uploader
pub mod slots {
    /// Diffuse/albedo map
    pub const DIFFUSE: usize = 0;
    /// Specular map
    pub const SPECULAR: usize = 1;
    /// Bump/normal map
    pub const BUMP: usize = 2;
    /// Ambient map
    pub const AMBIENT: usize = 3;
}

/// Material state bound with a surface
#[derive(Debug, Clone)]
pub struct SurfaceMaterial {
    /// Sampler per texture slot
    pub samplers: [Option<Arc<dyn SamplerState>>; SurfaceMaterial::MAX_TEXTURES],
    /// Texture per slot
    pub textures: [Option<Arc<dyn Texture>>; SurfaceMaterial::MAX_TEXTURES],
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

impl SurfaceMaterial {
    /// Number of texture slots
    pub const MAX_TEXTURES: usize = 4;
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            samplers: Default::default(),
            textures: Default::default(),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::zeros(),
            shininess: 0.0,
        }
    }
}

/// GPU-ready indexed triangle list with its material
#[derive(Debug, Clone)]
pub struct Surface {
    /// Debug name, usually the source face group
    pub name: String,
    /// Fixed-function toggles
    pub draw_state: DrawStateFlags,
    /// Rasterizer state
    pub rasterizer: RasterizerState,
    /// Interleaved vertices
    pub vertex_buffer: Arc<dyn Buffer>,
    /// Layout of `vertex_buffer`
    pub vertex_declaration: Arc<dyn VertexDeclaration>,
    /// Triangle indices
    pub index_buffer: Arc<dyn Buffer>,
    /// Width of the indices in `index_buffer`
    pub index_format: IndexFormat,
    /// Number of vertices in `vertex_buffer`
    pub num_vertices: u32,
    /// Number of indices in `index_buffer`
    pub num_indices: u32,
    /// Number of triangles
    pub primitive_count: u32,
    /// Material state
    pub material: SurfaceMaterial,
}
