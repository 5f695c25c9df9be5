//! Asset loading: OBJ/MTL parsing, mesh compilation and image decoding

pub mod model;
pub mod obj_loader;
pub mod materials;
pub mod mesh_compiler;
pub mod image_loader;

pub use image_loader::ImageData;
pub use materials::MtlParser;
pub use mesh_compiler::{CompiledModel, CompiledSurface, CompiledVertex, IndexData, MeshCompiler};
pub use model::{Face, FaceGroup, ObjMaterial, RawModel, VertexRef};
pub use obj_loader::{ObjError, ObjLoader};

use std::path::Path;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed OBJ or MTL text
    #[error(transparent)]
    Obj(#[from] ObjError),
}

/// Load and parse an OBJ model from disk
///
/// Fails with [`AssetError::NotFound`] when `path` does not exist; parse
/// errors carry the offending line.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<RawModel, AssetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AssetError::NotFound(path.display().to_string()));
    }

    let model = ObjLoader::load(path)?;
    if model.face_groups.is_empty() {
        log::warn!("Model {:?} has no faces", path);
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("missing.obj")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_load_model_parse_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.obj");
        std::fs::write(&path, "v 0 0 0\nf 1 1\n").unwrap();

        match load_model(&path).unwrap_err() {
            AssetError::Obj(ObjError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
