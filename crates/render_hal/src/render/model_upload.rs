//! Upload of compiled models to a render device

use std::path::Path;
use std::sync::Arc;

use super::api::{BufferUsage, RenderDevice, RenderResult, SamplerState, Texture};
use super::device_cache::DeviceCache;
use super::surface::{slots, DrawStateFlags, RasterizerState, Surface, SurfaceMaterial};
use super::texture_cache::TextureCache;
use crate::assets::{CompiledModel, CompiledSurface, ObjMaterial};
use crate::config::DeviceConfig;

/// Create GPU surfaces for every non-empty surface of `model`
///
/// Vertex declarations and the default sampler come from `device_cache`;
/// textures named by the materials (diffuse, specular, bump and ambient, in
/// [`slots`] order) are resolved relative to `texture_dir`
/// and loaded through `texture_cache`. A missing texture file leaves its slot
/// empty; any other failure aborts the upload.
pub fn upload_compiled_model(
    device: &mut dyn RenderDevice,
    device_cache: &mut DeviceCache,
    texture_cache: &mut TextureCache,
    model: &CompiledModel,
    texture_dir: impl AsRef<Path>,
    config: &DeviceConfig,
) -> RenderResult<Vec<Surface>> {
    let texture_dir = texture_dir.as_ref();
    let sampler = device_cache.default_sampler(device, config)?;

    let mut surfaces = Vec::with_capacity(model.surfaces.len());
    for compiled in &model.surfaces {
        if compiled.is_empty() {
            log::debug!("Skipping empty surface '{}' of '{}'", compiled.name, model.name);
            continue;
        }
        surfaces.push(upload_surface(
            device,
            device_cache,
            texture_cache,
            compiled,
            texture_dir,
            &sampler,
        )?);
    }

    log::info!(
        "Uploaded model '{}': {} of {} surfaces",
        model.name,
        surfaces.len(),
        model.surfaces.len()
    );
    Ok(surfaces)
}

fn upload_surface(
    device: &mut dyn RenderDevice,
    device_cache: &mut DeviceCache,
    texture_cache: &mut TextureCache,
    compiled: &CompiledSurface,
    texture_dir: &Path,
    sampler: &Arc<dyn SamplerState>,
) -> RenderResult<Surface> {
    let layout = compiled.vertex_layout();
    let vertex_declaration = device_cache.vertex_declaration(device, &layout)?;
    let vertex_buffer = device.create_buffer(
        BufferUsage::VERTEX | BufferUsage::READ_ONLY,
        &compiled.interleaved_vertex_bytes(),
    )?;

    let index_data = compiled.index_data();
    let index_buffer = device.create_buffer(BufferUsage::INDEX | BufferUsage::READ_ONLY, &index_data.to_le_bytes())?;

    let material = build_material(device, texture_cache, &compiled.material, texture_dir, sampler)?;

    Ok(Surface {
        name: compiled.name.clone(),
        draw_state: draw_state_for(&compiled.material),
        rasterizer: RasterizerState::default(),
        vertex_buffer,
        vertex_declaration,
        index_buffer,
        index_format: index_data.format(),
        num_vertices: count_u32(compiled.vertices.len()),
        num_indices: count_u32(compiled.indices.len()),
        primitive_count: count_u32(compiled.triangle_count()),
        material,
    })
}

fn build_material(
    device: &mut dyn RenderDevice,
    texture_cache: &mut TextureCache,
    material: &ObjMaterial,
    texture_dir: &Path,
    sampler: &Arc<dyn SamplerState>,
) -> RenderResult<SurfaceMaterial> {
    let mut surface_material = SurfaceMaterial {
        ambient: material.ambient,
        diffuse: material.diffuse,
        specular: material.specular,
        shininess: material.shininess,
        ..SurfaceMaterial::default()
    };

    let maps = [
        (slots::DIFFUSE, &material.diffuse_texture),
        (slots::SPECULAR, &material.specular_texture),
        (slots::BUMP, &material.bump_texture),
        (slots::AMBIENT, &material.ambient_texture),
    ];
    for (slot, map) in maps {
        let Some(map) = map else {
            continue;
        };
        surface_material.textures[slot] = load_map(device, texture_cache, texture_dir, map)?;
        surface_material.samplers[slot] = Some(Arc::clone(sampler));
    }

    Ok(surface_material)
}

fn load_map(
    device: &mut dyn RenderDevice,
    texture_cache: &mut TextureCache,
    texture_dir: &Path,
    map: &str,
) -> RenderResult<Option<Arc<dyn Texture>>> {
    texture_cache.load_texture_2d_from_file(device, texture_dir.join(map))
}

fn draw_state_for(material: &ObjMaterial) -> DrawStateFlags {
    if material.dissolve < 1.0 {
        DrawStateFlags::DEPTH_TEST | DrawStateFlags::BLEND
    } else {
        DrawStateFlags::default()
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
