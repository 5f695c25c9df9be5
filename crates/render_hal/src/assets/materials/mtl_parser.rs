//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl files into [`ObjMaterial`]s keyed by name.
//! Supports the Phong colors, opacity, and the ambient/diffuse/specular/bump
//! texture maps. Other statements are skipped.

use std::collections::HashMap;

use crate::assets::model::ObjMaterial;
use crate::assets::obj_loader::ObjError;
use crate::foundation::math::Vec3;

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents into a map of material name -> material
    ///
    /// Statements before the first `newmtl` are ignored. A later `newmtl`
    /// with an existing name replaces the earlier material.
    pub fn parse(contents: &str) -> Result<HashMap<String, ObjMaterial>, ObjError> {
        let mut materials = HashMap::new();
        let mut current: Option<ObjMaterial> = None;

        for (index, line) in contents.lines().enumerate() {
            let line_num = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };

            if command == "newmtl" {
                if let Some(mat) = current.take() {
                    materials.insert(mat.name.clone(), mat);
                }
                let name = tokens
                    .next()
                    .ok_or_else(|| ObjError::parse(line_num, "newmtl missing material name"))?;
                current = Some(ObjMaterial::named(name));
                continue;
            }

            let Some(mat) = current.as_mut() else {
                log::trace!("MTL line {}: '{}' outside a material", line_num, command);
                continue;
            };

            match command {
                "Ka" => mat.ambient = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Kd" => mat.diffuse = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Ks" => mat.specular = Self::parse_vec3(&mut tokens, line_num, command)?,
                "Ns" => mat.shininess = Self::parse_f32(&mut tokens, line_num, command)?,
                "d" => mat.dissolve = Self::parse_f32(&mut tokens, line_num, command)?,
                // Transparency is inverted dissolve
                "Tr" => mat.dissolve = 1.0 - Self::parse_f32(&mut tokens, line_num, command)?,
                "map_Ka" => mat.ambient_texture = Some(Self::parse_texture_path(tokens, line_num, command)?),
                "map_Kd" => mat.diffuse_texture = Some(Self::parse_texture_path(tokens, line_num, command)?),
                "map_Ks" => mat.specular_texture = Some(Self::parse_texture_path(tokens, line_num, command)?),
                "map_Bump" | "bump" => {
                    mat.bump_texture = Some(Self::parse_texture_path(tokens, line_num, command)?);
                }
                _ => log::trace!("MTL line {}: ignoring '{}'", line_num, command),
            }
        }

        if let Some(mat) = current {
            materials.insert(mat.name.clone(), mat);
        }

        Ok(materials)
    }

    /// Parse a Vec3 color from RGB tokens
    fn parse_vec3<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<Vec3, ObjError>
    where
        I: Iterator<Item = &'a str>,
    {
        let r = Self::parse_f32(tokens, line_num, command)?;
        let g = Self::parse_f32(tokens, line_num, command)?;
        let b = Self::parse_f32(tokens, line_num, command)?;
        Ok(Vec3::new(r, g, b))
    }

    /// Parse a single f32 value
    fn parse_f32<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<f32, ObjError>
    where
        I: Iterator<Item = &'a str>,
    {
        let token = tokens
            .next()
            .ok_or_else(|| ObjError::parse(line_num, format!("{command} missing value")))?;
        token
            .parse::<f32>()
            .map_err(|_| ObjError::parse(line_num, format!("{command} invalid float value '{token}'")))
    }

    /// Texture path: the last token, so map options such as `-bm 0.5` are skipped
    fn parse_texture_path<'a, I>(tokens: I, line_num: usize, command: &str) -> Result<String, ObjError>
    where
        I: Iterator<Item = &'a str>,
    {
        tokens
            .last()
            .map(str::to_string)
            .ok_or_else(|| ObjError::parse(line_num, format!("{command} missing texture path")))
    }
}
