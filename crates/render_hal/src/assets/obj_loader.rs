//! OBJ file loader for 3D models
//!
//! Reads Wavefront OBJ text into a [`RawModel`]: the position, texcoord and
//! normal pools plus face groups of [`VertexRef`] corners. Triangulation and
//! vertex welding happen later in the mesh compiler.

use std::path::Path;

use thiserror::Error;

use super::materials::MtlParser;
use super::model::{Face, FaceGroup, RawModel, VertexRef};
use crate::foundation::math::{Vec2, Vec3};

/// OBJ and MTL parsing errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// IO error reading the model file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed statement
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },
}

impl ObjError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Name of the group faces land in before any `g`/`o`
const DEFAULT_GROUP: &str = "default";

/// OBJ parser
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file, resolving `mtllib` relative to its directory
    ///
    /// A material library that cannot be read is logged and skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RawModel, ObjError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut resolver = |library: &str| {
            let library_path = base_dir.join(library);
            match std::fs::read_to_string(&library_path) {
                Ok(contents) => Some(contents),
                Err(e) => {
                    log::warn!("Material library {:?} not loaded: {}", library_path, e);
                    None
                }
            }
        };

        Self::parse(&name, &text, &mut resolver)
    }

    /// Parse OBJ text
    ///
    /// `material_resolver` maps an `mtllib` file name to its contents, or
    /// `None` when the library is unavailable.
    pub fn parse(
        name: &str,
        text: &str,
        material_resolver: &mut dyn FnMut(&str) -> Option<String>,
    ) -> Result<RawModel, ObjError> {
        let mut model = RawModel::new(name);

        for (index, line) in text.lines().enumerate() {
            let line_num = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };

            match command {
                "v" => {
                    let [x, y, z] = parse_floats::<3, _>(&mut tokens, line_num, command)?;
                    model.positions.push(Vec3::new(x, y, z));
                }
                "vt" => {
                    // `vt u [v] [w]`
                    let [u] = parse_floats::<1, _>(&mut tokens, line_num, command)?;
                    let v = parse_optional_float(&mut tokens, line_num, command)?.unwrap_or(0.0);
                    model.tex_coords.push(Vec2::new(u, v));
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3, _>(&mut tokens, line_num, command)?;
                    model.normals.push(Vec3::new(x, y, z));
                }
                "f" => {
                    let face = parse_face(&model, tokens, line_num)?;
                    current_group(&mut model).faces.push(face);
                }
                "g" | "o" => {
                    let group_name = tokens.collect::<Vec<_>>().join(" ");
                    let group_name = if group_name.is_empty() { DEFAULT_GROUP } else { group_name.as_str() };
                    // The active material carries over into the new group
                    let material = model.face_groups.last().and_then(|group| group.material_name.clone());
                    model.add_empty_face_group(group_name).material_name = material;
                }
                "usemtl" => {
                    let material = tokens
                        .next()
                        .ok_or_else(|| ObjError::parse(line_num, "usemtl missing material name"))?;
                    // A material switch mid-group splits the group
                    if let Some(group) = model.face_groups.last().filter(|group| !group.faces.is_empty()) {
                        let split = FaceGroup::new(group.name.clone());
                        model.face_groups.push(split);
                    }
                    current_group(&mut model).material_name = Some(material.to_string());
                }
                "mtllib" => {
                    for library in tokens {
                        if let Some(contents) = material_resolver(library) {
                            model.materials.extend(MtlParser::parse(&contents)?);
                        }
                    }
                }
                _ => log::trace!("OBJ line {}: ignoring '{}'", line_num, command),
            }
        }

        log::info!(
            "Parsed model '{}': {} positions, {} texcoords, {} normals, {} faces in {} groups",
            model.name,
            model.positions.len(),
            model.tex_coords.len(),
            model.normals.len(),
            model.face_count(),
            model.face_groups.len()
        );

        Ok(model)
    }
}

/// Group that receives faces, opening the default group if none exists
fn current_group(model: &mut RawModel) -> &mut FaceGroup {
    if model.face_groups.is_empty() {
        return model.add_empty_face_group(DEFAULT_GROUP);
    }
    let last = model.face_groups.len() - 1;
    &mut model.face_groups[last]
}

/// Parse the first `N` tokens as floats; extra components (`w`) are ignored
fn parse_floats<'a, const N: usize, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<[f32; N], ObjError>
where
    I: Iterator<Item = &'a str>,
{
    let mut values = [0.0; N];
    for value in &mut values {
        let token = tokens
            .next()
            .ok_or_else(|| ObjError::parse(line_num, format!("{command} expects {N} components")))?;
        *value = token
            .parse()
            .map_err(|_| ObjError::parse(line_num, format!("{command} invalid float value '{token}'")))?;
    }
    Ok(values)
}

fn parse_optional_float<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<Option<f32>, ObjError>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .map(|token| {
            token
                .parse()
                .map_err(|_| ObjError::parse(line_num, format!("{command} invalid float value '{token}'")))
        })
        .transpose()
}

fn parse_face<'a>(
    model: &RawModel,
    tokens: impl Iterator<Item = &'a str>,
    line_num: usize,
) -> Result<Face, ObjError> {
    let vertices = tokens
        .map(|corner| parse_corner(model, corner, line_num))
        .collect::<Result<Vec<_>, _>>()?;

    if vertices.len() < 3 {
        return Err(ObjError::parse(
            line_num,
            format!("face has {} corners, at least 3 required", vertices.len()),
        ));
    }

    Ok(Face { vertices })
}

/// Parse one `p`, `p/t`, `p//n` or `p/t/n` corner
fn parse_corner(model: &RawModel, corner: &str, line_num: usize) -> Result<VertexRef, ObjError> {
    let mut parts = corner.split('/');
    let position = parts
        .next()
        .filter(|part| !part.is_empty())
        .ok_or_else(|| ObjError::parse(line_num, format!("corner '{corner}' has no position index")))?;
    let tex_coord = parts.next().filter(|part| !part.is_empty());
    let normal = parts.next().filter(|part| !part.is_empty());
    if parts.next().is_some() {
        return Err(ObjError::parse(line_num, format!("corner '{corner}' has too many indices")));
    }

    Ok(VertexRef {
        position: resolve_index(position, model.positions.len(), "position", line_num)?,
        tex_coord: tex_coord
            .map(|t| resolve_index(t, model.tex_coords.len(), "texcoord", line_num))
            .transpose()?,
        normal: normal
            .map(|n| resolve_index(n, model.normals.len(), "normal", line_num))
            .transpose()?,
    })
}

/// Convert a 1-based or negative OBJ index into a 0-based pool index
fn resolve_index(token: &str, pool_len: usize, pool: &str, line_num: usize) -> Result<u32, ObjError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| ObjError::parse(line_num, format!("invalid {pool} index '{token}'")))?;

    let len = pool_len as i64;
    let resolved = match raw {
        0 => return Err(ObjError::parse(line_num, format!("{pool} index 0 is invalid, indices are 1-based"))),
        r if r > 0 => r - 1,
        r => len + r,
    };

    if resolved < 0 || resolved >= len {
        return Err(ObjError::parse(
            line_num,
            format!("{pool} index {raw} out of range ({pool_len} declared)"),
        ));
    }

    u32::try_from(resolved).map_err(|_| ObjError::parse(line_num, format!("{pool} index {raw} too large")))
}
