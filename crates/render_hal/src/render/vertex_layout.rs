//! Backend-agnostic vertex layout descriptions
//!
//! A [`VertexLayout`] is the cache key for vertex declarations. Two layouts
//! built independently from the same elements compare and hash equal, so
//! the [`DeviceCache`](super::DeviceCache) hands both the same declaration.
//!
//! ```
//! use render_hal::render::{VertexElement, VertexLayout};
//! use render_hal::render::api::{VertexElementFormat, VertexElementUsage};
//!
//! let layout = VertexLayout::packed(&[
//!     (VertexElementUsage::Position, VertexElementFormat::Float3),
//!     (VertexElementUsage::Normal, VertexElementFormat::Float3),
//!     (VertexElementUsage::TexCoord0, VertexElementFormat::Float2),
//! ]);
//! assert_eq!(layout.stride, 32);
//! assert_eq!(layout.elements[2], VertexElement::new(
//!     VertexElementUsage::TexCoord0,
//!     VertexElementFormat::Float2,
//!     24,
//! ));
//! ```

use super::api::{VertexElementFormat, VertexElementUsage};

/// One attribute inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Attribute semantic
    pub usage: VertexElementUsage,
    /// Storage format
    pub format: VertexElementFormat,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

impl VertexElement {
    /// Create a vertex element
    pub const fn new(usage: VertexElementUsage, format: VertexElementFormat, offset: u32) -> Self {
        Self { usage, format, offset }
    }

    /// First byte past this element
    pub const fn end(&self) -> u32 {
        self.offset + self.format.size_bytes()
    }
}

/// Ordered list of vertex elements plus the vertex stride
///
/// Equality is exact and field-wise; element order matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// Elements in declaration order
    pub elements: Vec<VertexElement>,
    /// Distance in bytes between consecutive vertices
    pub stride: u32,
}

impl VertexLayout {
    /// Create a layout from explicit elements and stride
    pub fn new(elements: Vec<VertexElement>, stride: u32) -> Self {
        debug_assert!(
            elements.iter().all(|e| e.end() <= stride),
            "vertex element extends past stride {stride}"
        );
        Self { elements, stride }
    }

    /// Tightly pack `attributes` in order; the stride is their total size
    pub fn packed(attributes: &[(VertexElementUsage, VertexElementFormat)]) -> Self {
        let mut offset = 0;
        let elements = attributes
            .iter()
            .map(|&(usage, format)| {
                let element = VertexElement::new(usage, format, offset);
                offset += format.size_bytes();
                element
            })
            .collect();
        Self { elements, stride: offset }
    }

    /// Find the element with the given usage
    pub fn element(&self, usage: VertexElementUsage) -> Option<&VertexElement> {
        self.elements.iter().find(|e| e.usage == usage)
    }

    /// Whether the layout carries an attribute with the given usage
    pub fn has(&self, usage: VertexElementUsage) -> bool {
        self.element(usage).is_some()
    }
}
