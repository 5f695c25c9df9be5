//! Public device API
//!
//! The capability surface everything else programs against: resource traits,
//! the [`RenderDevice`] backend trait, and the shared enums and errors.

pub mod types;
pub mod render_device;

pub use types::{
    calculate_num_mip_levels, BufferUsage, ClearTargets, CullMode, FillMode, IndexFormat,
    PixelFormat, SamplerFilter, SamplerWrapMode, TextureDesc, TextureKind, VertexElementFormat,
    VertexElementUsage,
};
pub use render_device::{
    Buffer, Camera, RenderDevice, SamplerState, ShaderProgram, Texture, VertexDeclaration,
    PROJ_MATRIX_PARAM, VIEW_MATRIX_PARAM,
};

use thiserror::Error;

/// Result type for device operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by device and resource-loading operations
///
/// Every variant aborts the load that raised it; there is no degraded
/// fallback for a half-built surface.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The device was used before `init` or after `shutdown`
    #[error("Render device not initialized")]
    NotInitialized,

    /// A shader stage failed to compile
    #[error("Shader compilation failed ({stage}): {log}")]
    ShaderCompile {
        /// Stage name (vertex, geometry, fragment)
        stage: &'static str,
        /// Compiler info log
        log: String,
    },

    /// Compiled stages failed to link into a program
    #[error("Shader link failed: {0}")]
    ShaderLink(String),

    /// Image bytes could not be decoded
    #[error("Failed to load texture {path}: {reason}")]
    TextureDecode {
        /// Path or name of the texture
        path: String,
        /// Decoder failure reason
        reason: String,
    },

    /// Pixel data does not match the texture description
    #[error("Invalid texture data: expected {expected} bytes, got {actual}")]
    InvalidTextureData {
        /// Bytes required by the description
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Buffer creation request was invalid
    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    /// IO error while reading a resource file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}
