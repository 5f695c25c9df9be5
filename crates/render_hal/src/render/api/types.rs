//! Enumerations and flag sets shared by the device interface

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// How a buffer is bound and whether its contents may change
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Vertex attribute data
        const VERTEX = 1 << 0;
        /// Index data
        const INDEX = 1 << 1;
        /// Contents never change after creation (static upload)
        const READ_ONLY = 1 << 2;
    }
}

bitflags! {
    /// Framebuffer targets cleared by [`RenderDevice::clear`](super::RenderDevice::clear)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearTargets: u32 {
        /// Color attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

/// Pixel layout of texture data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA
    R8G8B8A8,
    /// 8-bit single channel
    R8,
    /// 32-bit float RGBA
    R32G32B32A32F,
    /// 24-bit depth
    Depth24,
}

impl PixelFormat {
    /// Bytes per pixel in client memory
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R8G8B8A8 => 4,
            Self::R8 => 1,
            Self::R32G32B32A32F => 16,
            Self::Depth24 => 4,
        }
    }
}

/// Semantic of a vertex attribute; backends map each to a fixed shader location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexElementUsage {
    /// Object-space position
    Position,
    /// Surface normal
    Normal,
    /// Tangent for normal mapping
    Tangent,
    /// First texture coordinate set
    TexCoord0,
    /// Second texture coordinate set
    TexCoord1,
    /// Third texture coordinate set
    TexCoord2,
    /// Fourth texture coordinate set
    TexCoord3,
    /// Vertex color
    Color,
}

impl VertexElementUsage {
    /// Attribute location a backend binds this usage to
    pub const fn attrib_location(self) -> u32 {
        self as u32
    }

    /// Shader attribute name a backend binds this usage to
    pub const fn attrib_name(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Normal => "Normal",
            Self::Tangent => "Tangent",
            Self::TexCoord0 => "TexCoord0",
            Self::TexCoord1 => "TexCoord1",
            Self::TexCoord2 => "TexCoord2",
            Self::TexCoord3 => "TexCoord3",
            Self::Color => "Color",
        }
    }
}

/// Storage format of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexElementFormat {
    /// One f32
    Float1,
    /// Two f32
    Float2,
    /// Three f32
    Float3,
    /// Four f32
    Float4,
    /// Four u8
    UByte4,
    /// Four u8, normalized to [0, 1]
    UByte4N,
    /// Two u16
    Short2,
    /// Four u16
    Short4,
}

impl VertexElementFormat {
    /// Size of one attribute of this format in bytes
    pub const fn size_bytes(self) -> u32 {
        match self {
            Self::Float1 | Self::UByte4 | Self::UByte4N | Self::Short2 => 4,
            Self::Float2 | Self::Short4 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }

    /// Number of components
    pub const fn components(self) -> u32 {
        match self {
            Self::Float1 => 1,
            Self::Float2 | Self::Short2 => 2,
            Self::Float3 => 3,
            Self::Float4 | Self::UByte4 | Self::UByte4N | Self::Short4 => 4,
        }
    }
}

/// Texture filtering quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplerFilter {
    /// Nearest texel, nearest mip
    Point,
    /// Linear texel, nearest mip
    Bilinear,
    /// Linear texel, linear mip
    Trilinear,
    /// Trilinear plus anisotropic sampling
    Anisotropic,
}

/// Texture coordinate addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplerWrapMode {
    /// Tile
    Repeat,
    /// Tile, mirroring every other repetition
    RepeatMirror,
    /// Clamp to the edge texel
    Clamp,
}

/// Which winding is culled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull clockwise faces
    Cw,
    /// Cull counter-clockwise faces
    #[default]
    Ccw,
}

/// Polygon rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Vertices only
    Point,
    /// Edges only
    Wireframe,
    /// Filled triangles
    #[default]
    Solid,
}

/// Width of the indices in an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexFormat {
    /// Size of one index in bytes
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Dimensionality of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// 2D texture
    Texture2D,
    /// Cube map with six square faces
    Cube,
}

/// Description of a texture to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format of the supplied data
    pub format: PixelFormat,
}

impl TextureDesc {
    /// Create a texture description
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self { width, height, format }
    }

    /// Byte size of one full image (one face for cube maps)
    pub const fn image_size_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Number of mip levels of a full chain down to 1x1, including the base level
pub const fn calculate_num_mip_levels(width: u32, height: u32) -> u32 {
    let mut width = width;
    let mut height = height;
    let mut levels = 1;
    while width > 1 || height > 1 {
        width >>= 1;
        height >>= 1;
        levels += 1;
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_levels() {
        assert_eq!(calculate_num_mip_levels(1, 1), 1);
        assert_eq!(calculate_num_mip_levels(2, 2), 2);
        assert_eq!(calculate_num_mip_levels(256, 256), 9);
        assert_eq!(calculate_num_mip_levels(256, 1), 9);
        assert_eq!(calculate_num_mip_levels(300, 17), 9);
    }

    #[test]
    fn test_format_sizes() {
        assert_eq!(VertexElementFormat::Float3.size_bytes(), 12);
        assert_eq!(VertexElementFormat::Float2.components(), 2);
        assert_eq!(PixelFormat::R32G32B32A32F.bytes_per_pixel(), 16);
        assert_eq!(TextureDesc::new(4, 2, PixelFormat::R8G8B8A8).image_size_bytes(), 32);
    }

    #[test]
    fn test_usage_locations_are_stable() {
        assert_eq!(VertexElementUsage::Position.attrib_location(), 0);
        assert_eq!(VertexElementUsage::Normal.attrib_location(), 1);
        assert_eq!(VertexElementUsage::TexCoord0.attrib_name(), "TexCoord0");
    }
}
