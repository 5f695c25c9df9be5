//! Shader source containers and file loading

use std::path::Path;
use std::sync::Arc;

use super::api::{RenderDevice, RenderResult, ShaderProgram};

/// Source text of one shader stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBytecode {
    /// Stage source
    pub source: String,
}

impl ShaderBytecode {
    /// Wrap stage source
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Read a stage from disk
    ///
    /// Returns `None` when the file is missing, unreadable or empty; a missing
    /// shader file is recoverable, unlike a failed compile.
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) if !source.is_empty() => Some(Self { source }),
            Ok(_) => {
                log::warn!("Shader file {:?} is empty", path);
                None
            }
            Err(e) => {
                log::warn!("Failed to read shader file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Length of the source in bytes
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the source is empty
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Stages of a shader program; geometry is optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStages {
    /// Vertex stage
    pub vertex: ShaderBytecode,
    /// Optional geometry stage
    pub geometry: Option<ShaderBytecode>,
    /// Fragment stage
    pub fragment: ShaderBytecode,
}

impl ShaderStages {
    /// Vertex + fragment program
    pub const fn new(vertex: ShaderBytecode, fragment: ShaderBytecode) -> Self {
        Self {
            vertex,
            geometry: None,
            fragment,
        }
    }

    /// Vertex + geometry + fragment program
    pub const fn with_geometry(vertex: ShaderBytecode, geometry: ShaderBytecode, fragment: ShaderBytecode) -> Self {
        Self {
            vertex,
            geometry: Some(geometry),
            fragment,
        }
    }
}

/// Build a vertex + fragment program from source files
///
/// `Ok(None)` if either file could not be read; compile and link failures
/// propagate as errors.
pub fn create_shader_program_from_files(
    device: &mut dyn RenderDevice,
    vs_path: impl AsRef<Path>,
    fs_path: impl AsRef<Path>,
) -> RenderResult<Option<Arc<dyn ShaderProgram>>> {
    let (Some(vertex), Some(fragment)) = (
        ShaderBytecode::from_file(vs_path),
        ShaderBytecode::from_file(fs_path),
    ) else {
        return Ok(None);
    };

    device.create_shader_program(&ShaderStages::new(vertex, fragment)).map(Some)
}

/// Build a vertex + geometry + fragment program from source files
pub fn create_shader_program_from_files_with_geometry(
    device: &mut dyn RenderDevice,
    vs_path: impl AsRef<Path>,
    gs_path: impl AsRef<Path>,
    fs_path: impl AsRef<Path>,
) -> RenderResult<Option<Arc<dyn ShaderProgram>>> {
    let (Some(vertex), Some(geometry), Some(fragment)) = (
        ShaderBytecode::from_file(vs_path),
        ShaderBytecode::from_file(gs_path),
        ShaderBytecode::from_file(fs_path),
    ) else {
        return Ok(None);
    };

    device
        .create_shader_program(&ShaderStages::with_geometry(vertex, geometry, fragment))
        .map(Some)
}
