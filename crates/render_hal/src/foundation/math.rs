//! Math utilities and types
//!
//! Vector types shared by the mesh pipeline and the surface materials.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Returns a unit vector perpendicular to `n`.
///
/// `n` is expected to be normalized. Picks the world axis least aligned
/// with `n` to keep the cross product well conditioned.
pub fn any_perpendicular(n: &Vec3) -> Vec3 {
    let axis = if n.x.abs() < 0.9 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    n.cross(&axis).normalize()
}

/// Normalizes `v`, or returns `fallback` when `v` has no usable length
pub fn normalize_or(v: &Vec3, fallback: Vec3) -> Vec3 {
    let len = v.norm();
    if len > f32::EPSILON && len.is_finite() {
        v / len
    } else {
        fallback
    }
}
