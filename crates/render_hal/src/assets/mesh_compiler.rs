//! Mesh compilation: OBJ face groups to welded, indexed triangle lists
//!
//! # Pipeline
//!
//! Each [`FaceGroup`] of a [`RawModel`] becomes one [`CompiledSurface`]:
//!
//! 1. Faces are fan-triangulated: `(0,1,2), (0,2,3), ..., (0,N-2,N-1)`.
//! 2. Every triangle corner is welded by its [`VertexRef`]; equal position,
//!    texcoord and normal indices share one output vertex, assigned in
//!    first-seen order.
//! 3. Triangles with a repeated index are dropped. Their vertices stay.
//! 4. Corners without a normal index get an area-weighted smooth normal,
//!    summed over every triangle touching the same position index, so a UV
//!    seam does not split the shading.
//! 5. Tangents are accumulated from the UV gradients and orthogonalized
//!    against the normal.
//!
//! Vertex and index bytes handed to buffers are little-endian.
//!
//! # Limitations
//!
//! Fan triangulation assumes convex faces. A concave face still yields valid
//! indices, but the triangles may cover the wrong area.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use super::model::{FaceGroup, ObjMaterial, RawModel, VertexRef};
use crate::foundation::math::{any_perpendicular, normalize_or, Vec2, Vec3};
use crate::render::api::{IndexFormat, VertexElementFormat, VertexElementUsage};
use crate::render::vertex_layout::VertexLayout;

/// Largest vertex count addressable with 16-bit indices
const MAX_U16_VERTICES: usize = u16::MAX as usize + 1;

/// Interleaved output vertex
///
/// Field order matches the full [`CompiledSurface::vertex_layout`], so a
/// textured surface's vertex buffer is this struct cast to bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct CompiledVertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Unit normal
    pub normal: [f32; 3],
    /// Unit tangent, perpendicular to `normal`
    pub tangent: [f32; 3],
    /// Texture coordinate, (0,0) when the corner had none
    pub tex_coord: [f32; 2],
}

/// Index buffer contents at the narrowest width that fits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    /// 16-bit indices
    U16(Vec<u16>),
    /// 32-bit indices
    U32(Vec<u32>),
}

impl IndexData {
    /// Index width
    pub const fn format(&self) -> IndexFormat {
        match self {
            Self::U16(_) => IndexFormat::U16,
            Self::U32(_) => IndexFormat::U32,
        }
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        match self {
            Self::U16(indices) => indices.len(),
            Self::U32(indices) => indices.len(),
        }
    }

    /// Whether there are no indices
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Little-endian bytes, ready for buffer upload
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::U16(indices) => le_bytes(indices, 2),
            Self::U32(indices) => le_bytes(indices, 4),
        }
    }
}

/// One material's worth of triangles
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSurface {
    /// Name of the source face group
    pub name: String,
    /// Material snapshot taken at compile time
    pub material: ObjMaterial,
    /// Welded vertices in first-seen order
    pub vertices: Vec<CompiledVertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
    /// Every corner of the group carried a normal index
    pub has_normals: bool,
    /// Every corner of the group carried a texcoord index
    pub has_tex_coords: bool,
}

impl CompiledSurface {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the surface has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex layout of [`Self::interleaved_vertex_bytes`]
    ///
    /// Position and normal always; tangent and texcoord only when the group
    /// had texture coordinates, since tangents are meaningless without them.
    pub fn vertex_layout(&self) -> VertexLayout {
        let mut attributes = vec![
            (VertexElementUsage::Position, VertexElementFormat::Float3),
            (VertexElementUsage::Normal, VertexElementFormat::Float3),
        ];
        if self.has_tex_coords {
            attributes.push((VertexElementUsage::Tangent, VertexElementFormat::Float3));
            attributes.push((VertexElementUsage::TexCoord0, VertexElementFormat::Float2));
        }
        VertexLayout::packed(&attributes)
    }

    /// Vertices packed per [`Self::vertex_layout`], little-endian floats
    pub fn interleaved_vertex_bytes(&self) -> Vec<u8> {
        if self.has_tex_coords {
            return le_bytes(&self.vertices, 4);
        }

        let packed: Vec<[f32; 6]> = self
            .vertices
            .iter()
            .map(|v| {
                let [px, py, pz] = v.position;
                let [nx, ny, nz] = v.normal;
                [px, py, pz, nx, ny, nz]
            })
            .collect();
        le_bytes(&packed, 4)
    }

    /// Indices at 16-bit width when every vertex is addressable, else 32-bit
    pub fn index_data(&self) -> IndexData {
        if self.vertices.len() <= MAX_U16_VERTICES {
            IndexData::U16(self.indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexData::U32(self.indices.clone())
        }
    }
}

/// Compiled model: one surface per face group, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    /// Model name
    pub name: String,
    /// Surfaces, including empty ones
    pub surfaces: Vec<CompiledSurface>,
}

impl CompiledModel {
    /// Total vertex count across surfaces
    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.vertices.len()).sum()
    }

    /// Total triangle count across surfaces
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(CompiledSurface::triangle_count).sum()
    }
}

/// Turns a [`RawModel`] into [`CompiledModel`] surfaces
pub struct MeshCompiler;

impl MeshCompiler {
    /// Compile every face group of `raw`
    pub fn compile(raw: &RawModel) -> CompiledModel {
        let surfaces: Vec<_> = raw
            .face_groups
            .iter()
            .map(|group| Self::compile_group(raw, group))
            .collect();

        let model = CompiledModel {
            name: raw.name.clone(),
            surfaces,
        };
        log::info!(
            "Compiled model '{}': {} surfaces, {} vertices, {} triangles",
            model.name,
            model.surfaces.len(),
            model.vertex_count(),
            model.triangle_count()
        );
        model
    }

    fn compile_group(raw: &RawModel, group: &FaceGroup) -> CompiledSurface {
        let mut builder = SurfaceBuilder::new(raw);

        for face in &group.faces {
            let corners = &face.vertices;
            for i in 1..corners.len().saturating_sub(1) {
                builder.add_triangle([corners[0], corners[i], corners[i + 1]]);
            }
        }

        let material = Self::resolve_material(raw, group);
        builder.finish(group.name.clone(), material)
    }

    fn resolve_material(raw: &RawModel, group: &FaceGroup) -> ObjMaterial {
        let requested = group.material_name.as_deref().unwrap_or_default();
        if let Some(material) = raw.materials.get(requested) {
            return material.clone();
        }
        log::warn!(
            "Face group '{}' of '{}': material '{}' not found, using default",
            group.name,
            raw.name,
            requested
        );
        ObjMaterial::named(requested)
    }
}

/// Per-surface welding state
struct SurfaceBuilder<'a> {
    raw: &'a RawModel,
    lookup: HashMap<VertexRef, u32>,
    refs: Vec<VertexRef>,
    vertices: Vec<CompiledVertex>,
    indices: Vec<u32>,
    all_normals: bool,
    all_tex_coords: bool,
}

impl<'a> SurfaceBuilder<'a> {
    fn new(raw: &'a RawModel) -> Self {
        Self {
            raw,
            lookup: HashMap::new(),
            refs: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            all_normals: true,
            all_tex_coords: true,
        }
    }

    fn add_triangle(&mut self, corners: [VertexRef; 3]) {
        let [a, b, c] = corners.map(|corner| self.weld(corner));
        if a == b || b == c || a == c {
            log::trace!("Dropping degenerate triangle ({}, {}, {})", a, b, c);
            return;
        }
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn weld(&mut self, corner: VertexRef) -> u32 {
        self.all_normals &= corner.normal.is_some();
        self.all_tex_coords &= corner.tex_coord.is_some();

        if let Some(&index) = self.lookup.get(&corner) {
            return index;
        }

        let index = self.vertices.len() as u32;
        let position = pool_get(&self.raw.positions, Some(corner.position)).unwrap_or_else(Vec3::zeros);
        let tex_coord = pool_get(&self.raw.tex_coords, corner.tex_coord).unwrap_or_else(Vec2::zeros);
        let normal = pool_get(&self.raw.normals, corner.normal)
            .map_or_else(Vec3::zeros, |n| normalize_or(&n, Vec3::y()));

        self.vertices.push(CompiledVertex {
            position: position.into(),
            normal: normal.into(),
            tangent: [0.0; 3],
            tex_coord: tex_coord.into(),
        });
        self.refs.push(corner);
        self.lookup.insert(corner, index);
        index
    }

    fn finish(mut self, name: String, material: ObjMaterial) -> CompiledSurface {
        self.generate_missing_normals();
        self.generate_tangents();

        let has_any = !self.vertices.is_empty();
        CompiledSurface {
            name,
            material,
            vertices: self.vertices,
            indices: self.indices,
            has_normals: has_any && self.all_normals,
            has_tex_coords: has_any && self.all_tex_coords,
        }
    }

    fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    fn position(&self, index: usize) -> Vec3 {
        Vec3::from(self.vertices[index].position)
    }

    fn generate_missing_normals(&mut self) {
        if self.refs.iter().all(|r| r.normal.is_some()) {
            return;
        }

        // Keyed by position index: corners split only by texcoord share a normal
        let mut sums: HashMap<u32, Vec3> = HashMap::new();
        for [a, b, c] in self.triangles() {
            // Cross product length is twice the area, giving area weighting
            let face_normal = (self.position(b) - self.position(a)).cross(&(self.position(c) - self.position(a)));
            for i in [a, b, c] {
                *sums.entry(self.refs[i].position).or_insert_with(Vec3::zeros) += face_normal;
            }
        }

        for (vertex, corner) in self.vertices.iter_mut().zip(&self.refs) {
            if corner.normal.is_none() {
                let sum = sums.get(&corner.position).copied().unwrap_or_else(Vec3::zeros);
                vertex.normal = normalize_or(&sum, Vec3::y()).into();
            }
        }
    }

    fn generate_tangents(&mut self) {
        let mut sums = vec![Vec3::zeros(); self.vertices.len()];

        for [a, b, c] in self.triangles() {
            let uv = |i: usize| Vec2::from(self.vertices[i].tex_coord);
            let edge1 = self.position(b) - self.position(a);
            let edge2 = self.position(c) - self.position(a);
            let duv1 = uv(b) - uv(a);
            let duv2 = uv(c) - uv(a);

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
            for i in [a, b, c] {
                sums[i] += tangent;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(&sums) {
            let normal = normalize_or(&Vec3::from(vertex.normal), Vec3::y());
            let orthogonal = sum - normal * normal.dot(sum);
            let tangent = normalize_or(&orthogonal, any_perpendicular(&normal));
            vertex.tangent = tangent.into();
        }
    }
}

fn pool_get<T: Copy>(pool: &[T], index: Option<u32>) -> Option<T> {
    index.and_then(|i| pool.get(i as usize).copied())
}

/// `values` as bytes with every `word_size`-byte scalar in little-endian order
fn le_bytes<T: Pod>(values: &[T], word_size: usize) -> Vec<u8> {
    let mut bytes = bytemuck::cast_slice::<T, u8>(values).to_vec();
    if cfg!(target_endian = "big") {
        for word in bytes.chunks_exact_mut(word_size) {
            word.reverse();
        }
    }
    bytes
}
