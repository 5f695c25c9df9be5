use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};

use render_hal::prelude::*;

fn main() -> Result<()> {
    let matches = Command::new("obj_compiler")
        .about("Compiles Wavefront OBJ models into welded, indexed surfaces and reports the result")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("OBJ file to compile")
                .required(true),
        )
        .arg(
            Arg::new("upload")
                .long("upload")
                .help("Upload the compiled surfaces to a headless device and report resource counts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("texture-dir")
                .long("texture-dir")
                .value_name("DIR")
                .help("Directory material textures are resolved against (defaults to the model's directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML or RON configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    render_hal::foundation::logging::init_with_level(level);

    let config = match matches.get_one::<String>("config") {
        Some(path) => RenderHalConfig::load_from_file(path).with_context(|| format!("Failed to load config {path}"))?,
        None => RenderHalConfig::default(),
    };

    let input = matches
        .get_one::<String>("input")
        .map(|input| config.assets.resolve(input))
        .context("No input file given")?;

    let raw = load_model(&input).with_context(|| format!("Failed to load model {}", input.display()))?;
    let compiled = MeshCompiler::compile(&raw);
    print_summary(&compiled);

    if matches.get_flag("upload") {
        let texture_dir = matches
            .get_one::<String>("texture-dir")
            .map(PathBuf::from)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        upload(&config, &compiled, &texture_dir)?;
    }

    Ok(())
}

fn print_summary(model: &CompiledModel) {
    println!("Model: {}", model.name);
    for surface in &model.surfaces {
        let layout = surface.vertex_layout();
        println!(
            "  {:<24} material={:<16} vertices={:<8} triangles={:<8} stride={:<3} normals={} texcoords={}",
            surface.name,
            surface.material.name,
            surface.vertices.len(),
            surface.triangle_count(),
            layout.stride,
            surface.has_normals,
            surface.has_tex_coords,
        );
    }
    println!(
        "Total: {} surfaces, {} vertices, {} triangles",
        model.surfaces.len(),
        model.vertex_count(),
        model.triangle_count()
    );
}

fn upload(config: &RenderHalConfig, model: &CompiledModel, texture_dir: &Path) -> Result<()> {
    let mut device = HeadlessDevice::new();
    device.init().context("Failed to initialize headless device")?;

    let mut device_cache = DeviceCache::new(config.assets.hash_seed);
    let mut textures = TextureCache::new(&config.assets);
    let surfaces = upload_compiled_model(
        &mut device,
        &mut device_cache,
        &mut textures,
        model,
        texture_dir,
        &config.device,
    )
    .context("Upload failed")?;

    let stats = device.stats();
    println!("Uploaded {} surfaces", surfaces.len());
    println!("  buffers:             {}", stats.buffers_created);
    println!(
        "  vertex declarations: {} (cached {})",
        stats.vertex_declarations_created,
        device_cache.vertex_declaration_count()
    );
    println!("  textures:            {} (cached {})", stats.textures_created, textures.len());
    println!(
        "  sampler states:      {} (cached {})",
        stats.sampler_states_created,
        device_cache.sampler_state_count()
    );

    device.shutdown();
    Ok(())
}
