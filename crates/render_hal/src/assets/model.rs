//! Parsed OBJ model data
//!
//! Index pools and face groups exactly as the file declared them, before any
//! triangulation or welding.

use std::collections::HashMap;

use crate::foundation::math::{Vec2, Vec3};

/// One face corner: 0-based indices into the model's pools
///
/// Two corners weld into the same output vertex exactly when their
/// `VertexRef`s are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRef {
    /// Index into [`RawModel::positions`]
    pub position: u32,
    /// Index into [`RawModel::tex_coords`]
    pub tex_coord: Option<u32>,
    /// Index into [`RawModel::normals`]
    pub normal: Option<u32>,
}

impl VertexRef {
    /// Corner with a position only
    pub const fn position(position: u32) -> Self {
        Self {
            position,
            tex_coord: None,
            normal: None,
        }
    }
}

/// Convex polygon with at least three corners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// Corners in winding order
    pub vertices: Vec<VertexRef>,
}

/// Named run of faces sharing one material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceGroup {
    /// Group name from `g`/`o`, or `default`
    pub name: String,
    /// Material selected with `usemtl`
    pub material_name: Option<String>,
    /// Faces in file order
    pub faces: Vec<Face>,
}

impl FaceGroup {
    /// Empty group with no material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material_name: None,
            faces: Vec::new(),
        }
    }
}

/// Phong material as read from an MTL file
#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    /// Material name
    pub name: String,
    /// Ambient color (Ka)
    pub ambient: Vec3,
    /// Diffuse color (Kd)
    pub diffuse: Vec3,
    /// Specular color (Ks)
    pub specular: Vec3,
    /// Ambient map (map_Ka)
    pub ambient_texture: Option<String>,
    /// Diffuse map (map_Kd)
    pub diffuse_texture: Option<String>,
    /// Specular map (map_Ks)
    pub specular_texture: Option<String>,
    /// Bump map (map_Bump or bump)
    pub bump_texture: Option<String>,
    /// Opacity, 1.0 is opaque
    pub dissolve: f32,
    /// Specular exponent (Ns)
    pub shininess: f32,
}

impl ObjMaterial {
    /// Default material carrying `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ObjMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::zeros(),
            ambient_texture: None,
            diffuse_texture: None,
            specular_texture: None,
            bump_texture: None,
            dissolve: 1.0,
            shininess: 0.0,
        }
    }
}

/// Parsed but uncompiled model
#[derive(Debug, Clone, Default)]
pub struct RawModel {
    /// Model name, usually the file stem
    pub name: String,
    /// `v` pool
    pub positions: Vec<Vec3>,
    /// `vt` pool
    pub tex_coords: Vec<Vec2>,
    /// `vn` pool
    pub normals: Vec<Vec3>,
    /// Face groups in declaration order
    pub face_groups: Vec<FaceGroup>,
    /// Materials from every `mtllib`, referenced or not
    pub materials: HashMap<String, ObjMaterial>,
}

impl RawModel {
    /// Empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Open a face group named `name`
    ///
    /// A trailing group that has no faces yet is renamed instead of leaving
    /// an empty group behind.
    pub fn add_empty_face_group(&mut self, name: &str) -> &mut FaceGroup {
        let reuse = self.face_groups.last().is_some_and(|group| group.faces.is_empty());
        if !reuse {
            self.face_groups.push(FaceGroup::new(name));
        }

        let index = self.face_groups.len() - 1;
        let group = &mut self.face_groups[index];
        group.name = name.to_string();
        group
    }

    /// Total number of faces across all groups
    pub fn face_count(&self) -> usize {
        self.face_groups.iter().map(|group| group.faces.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_empty_face_group_reuses_trailing_empty() {
        let mut model = RawModel::new("m");
        model.add_empty_face_group("first");
        model.add_empty_face_group("second");
        assert_eq!(model.face_groups.len(), 1);
        assert_eq!(model.face_groups[0].name, "second");

        model.face_groups[0].faces.push(Face {
            vertices: vec![VertexRef::position(0), VertexRef::position(1), VertexRef::position(2)],
        });
        model.add_empty_face_group("third");
        assert_eq!(model.face_groups.len(), 2);
        assert_eq!(model.face_groups[1].name, "third");
        assert_eq!(model.face_count(), 1);
    }

    #[test]
    fn test_reused_group_keeps_material() {
        let mut model = RawModel::new("m");
        model.add_empty_face_group("a").material_name = Some("steel".to_string());
        let group = model.add_empty_face_group("b");
        assert_eq!(group.material_name.as_deref(), Some("steel"));
    }

    #[test]
    fn test_named_material_defaults() {
        let material = ObjMaterial::named("fallback");
        assert_eq!(material.name, "fallback");
        assert_eq!(material.dissolve, 1.0);
        assert!(material.diffuse_texture.is_none());
    }
}
