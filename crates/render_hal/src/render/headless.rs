//! Headless render device
//!
//! A CPU-side [`RenderDevice`] that keeps buffer and texture bytes in memory
//! and counts every creation. Used where no GPU context exists: tests, the
//! offline model compiler, and tooling that wants to validate uploads.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use super::api::{
    calculate_num_mip_levels, Buffer, BufferUsage, Camera, ClearTargets, PixelFormat, RenderDevice,
    RenderError, RenderResult, SamplerState, ShaderProgram, Texture, TextureDesc, TextureKind,
    VertexDeclaration, VertexElementUsage, PROJ_MATRIX_PARAM, VIEW_MATRIX_PARAM,
};
use super::sampler::SamplerStateInitializer;
use super::shader::{ShaderBytecode, ShaderStages};
use super::surface::Surface;
use super::vertex_layout::VertexLayout;
use crate::foundation::math::{Mat3, Mat4, Vec3};

/// Creation and draw counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Buffers created
    pub buffers_created: usize,
    /// Vertex declarations created
    pub vertex_declarations_created: usize,
    /// Shader programs linked
    pub shader_programs_created: usize,
    /// 2D textures and cube maps created
    pub textures_created: usize,
    /// Sampler states created
    pub sampler_states_created: usize,
    /// Surfaces drawn
    pub draw_calls: usize,
    /// Triangles submitted
    pub triangles_drawn: usize,
}

/// In-memory buffer
#[derive(Debug)]
pub struct HeadlessBuffer {
    usage: BufferUsage,
    data: RefCell<Vec<u8>>,
}

impl HeadlessBuffer {
    /// Copy of the buffer contents
    pub fn data(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

impl Buffer for HeadlessBuffer {
    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn size(&self) -> usize {
        self.data.borrow().len()
    }

    fn update(&self, offset: usize, data: &[u8]) -> RenderResult<()> {
        if self.usage.contains(BufferUsage::READ_ONLY) {
            return Err(RenderError::InvalidBuffer("update of a read-only buffer".to_string()));
        }

        let mut contents = self.data.borrow_mut();
        let size = contents.len();
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= size)
            .ok_or_else(|| {
                RenderError::InvalidBuffer(format!(
                    "update of {} bytes at offset {} exceeds buffer size {}",
                    data.len(),
                    offset,
                    size
                ))
            })?;
        contents[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Vertex declaration resolved to attribute locations
#[derive(Debug)]
pub struct HeadlessVertexDeclaration {
    layout: VertexLayout,
    locations: Vec<u32>,
}

impl HeadlessVertexDeclaration {
    /// Attribute location of each element, in layout order
    pub fn locations(&self) -> &[u32] {
        &self.locations
    }
}

impl VertexDeclaration for HeadlessVertexDeclaration {
    fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Last value written to a uniform of a [`HeadlessShaderProgram`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `set_bool`
    Bool(bool),
    /// `set_float`
    Float(f32),
    /// `set_vec3`
    Vec3(Vec3),
    /// `set_mat3`
    Mat3(Mat3),
    /// `set_mat4`
    Mat4(Mat4),
}

/// Program that records the values written to its uniforms
///
/// Locations are assigned to `uniform` declarations in source order across
/// the vertex, geometry and fragment stages; a name declared in several
/// stages shares one location.
#[derive(Debug)]
pub struct HeadlessShaderProgram {
    uniform_names: Vec<String>,
    values: RefCell<Vec<Option<UniformValue>>>,
}

impl HeadlessShaderProgram {
    fn new(stages: &ShaderStages) -> Self {
        let uniform_names = declared_uniforms(stages);
        let values = RefCell::new(vec![None; uniform_names.len()]);
        Self { uniform_names, values }
    }

    /// Last value set on the uniform called `name`
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        let location = self.uniform_names.iter().position(|n| n == name)?;
        self.values.borrow().get(location).copied().flatten()
    }

    fn store(&self, location: Option<i32>, value: UniformValue) {
        let Some(location) = location else {
            return;
        };
        let mut values = self.values.borrow_mut();
        match usize::try_from(location).ok().and_then(|i| values.get_mut(i)) {
            Some(slot) => *slot = Some(value),
            None => log::warn!("Uniform location {} out of range", location),
        }
    }
}

/// Names of `uniform <type> <name>` declarations, first declaration first
fn declared_uniforms(stages: &ShaderStages) -> Vec<String> {
    let sources = [Some(&stages.vertex), stages.geometry.as_ref(), Some(&stages.fragment)];
    let mut names: Vec<String> = Vec::new();
    for stage in sources.into_iter().flatten() {
        for statement in stage.source.split(';') {
            let mut tokens = statement.split_whitespace();
            if !tokens.by_ref().any(|token| token == "uniform") {
                continue;
            }
            let Some(name) = tokens.nth(1) else {
                continue;
            };
            let name = name.split('[').next().unwrap_or(name);
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

impl ShaderProgram for HeadlessShaderProgram {
    fn parameter_location(&self, name: &str) -> Option<i32> {
        self.uniform_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| i32::try_from(i).ok())
    }

    fn set_bool(&self, location: Option<i32>, value: bool) {
        self.store(location, UniformValue::Bool(value));
    }

    fn set_float(&self, location: Option<i32>, value: f32) {
        self.store(location, UniformValue::Float(value));
    }

    fn set_vec3(&self, location: Option<i32>, value: &Vec3) {
        self.store(location, UniformValue::Vec3(*value));
    }

    fn set_mat3(&self, location: Option<i32>, value: &Mat3) {
        self.store(location, UniformValue::Mat3(*value));
    }

    fn set_mat4(&self, location: Option<i32>, value: &Mat4) {
        self.store(location, UniformValue::Mat4(*value));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// In-memory texture holding the base level of each face
#[derive(Debug)]
pub struct HeadlessTexture {
    kind: TextureKind,
    desc: TextureDesc,
    num_mips: u32,
    faces: Vec<Vec<u8>>,
}

impl HeadlessTexture {
    /// Base-level pixels of face `index` (0 for 2D textures)
    pub fn face(&self, index: usize) -> Option<&[u8]> {
        self.faces.get(index).map(Vec::as_slice)
    }
}

impl Texture for HeadlessTexture {
    fn kind(&self) -> TextureKind {
        self.kind
    }

    fn width(&self) -> u32 {
        self.desc.width
    }

    fn height(&self) -> u32 {
        self.desc.height
    }

    fn num_mips(&self) -> u32 {
        self.num_mips
    }

    fn format(&self) -> PixelFormat {
        self.desc.format
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sampler state record
#[derive(Debug)]
pub struct HeadlessSamplerState {
    initializer: SamplerStateInitializer,
}

impl SamplerState for HeadlessSamplerState {
    fn initializer(&self) -> &SamplerStateInitializer {
        &self.initializer
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// CPU-only device implementation
#[derive(Debug)]
pub struct HeadlessDevice {
    initialized: bool,
    max_anisotropy: u32,
    stats: HeadlessStats,
    current_program: Option<Arc<dyn ShaderProgram>>,
    textures: [Option<Arc<dyn Texture>>; 4],
    samplers: [Option<Arc<dyn SamplerState>>; 4],
}

impl HeadlessDevice {
    /// Device reporting an anisotropy limit of 16
    pub fn new() -> Self {
        Self::with_max_anisotropy(16)
    }

    /// Device reporting the given anisotropy limit
    pub fn with_max_anisotropy(max_anisotropy: u32) -> Self {
        Self {
            initialized: false,
            max_anisotropy,
            stats: HeadlessStats::default(),
            current_program: None,
            textures: Default::default(),
            samplers: Default::default(),
        }
    }

    /// Counters accumulated so far
    pub const fn stats(&self) -> HeadlessStats {
        self.stats
    }

    /// Texture bound to `slot`
    pub fn bound_texture(&self, slot: u32) -> Option<&Arc<dyn Texture>> {
        self.textures.get(slot as usize)?.as_ref()
    }

    /// Sampler bound to `slot`
    pub fn bound_sampler(&self, slot: u32) -> Option<&Arc<dyn SamplerState>> {
        self.samplers.get(slot as usize)?.as_ref()
    }

    fn compile_stage(stage: &'static str, bytecode: &ShaderBytecode) -> RenderResult<()> {
        if bytecode.source.trim().is_empty() {
            return Err(RenderError::ShaderCompile {
                stage,
                log: "empty shader source".to_string(),
            });
        }
        Ok(())
    }

    fn check_texture_data(desc: &TextureDesc, pixels: &[u8]) -> RenderResult<()> {
        let expected = desc.image_size_bytes();
        if pixels.len() < expected {
            return Err(RenderError::InvalidTextureData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(())
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDevice for HeadlessDevice {
    fn init(&mut self) -> RenderResult<()> {
        if self.initialized {
            return Ok(());
        }
        log::info!("Headless device initialized (max anisotropy {})", self.max_anisotropy);

        // Default anisotropic sampler on every slot, as a GL backend would set up.
        let initializer = SamplerStateInitializer::new(super::api::SamplerFilter::Anisotropic)
            .with_max_anisotropy(self.max_anisotropy.max(1));
        let sampler = self.create_sampler_state(&initializer)?;
        for slot in 0..4 {
            self.set_sampler_state(slot, &sampler);
        }

        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.initialized {
            self.current_program = None;
            self.textures = Default::default();
            self.samplers = Default::default();
            self.initialized = false;
            log::info!("Headless device shut down");
        }
    }

    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> RenderResult<Arc<dyn Buffer>> {
        if !usage.intersects(BufferUsage::VERTEX | BufferUsage::INDEX) {
            return Err(RenderError::InvalidBuffer(format!(
                "usage {usage:?} names neither vertex nor index"
            )));
        }
        if data.is_empty() {
            return Err(RenderError::InvalidBuffer("zero-sized buffer".to_string()));
        }

        self.stats.buffers_created += 1;
        Ok(Arc::new(HeadlessBuffer {
            usage,
            data: RefCell::new(data.to_vec()),
        }))
    }

    fn create_vertex_declaration(&mut self, layout: &VertexLayout) -> RenderResult<Arc<dyn VertexDeclaration>> {
        self.stats.vertex_declarations_created += 1;
        let locations = layout
            .elements
            .iter()
            .map(|element| VertexElementUsage::attrib_location(element.usage))
            .collect();
        Ok(Arc::new(HeadlessVertexDeclaration {
            layout: layout.clone(),
            locations,
        }))
    }

    fn create_shader_program(&mut self, stages: &ShaderStages) -> RenderResult<Arc<dyn ShaderProgram>> {
        Self::compile_stage("vertex", &stages.vertex)?;
        if let Some(geometry) = &stages.geometry {
            Self::compile_stage("geometry", geometry)?;
        }
        Self::compile_stage("fragment", &stages.fragment)?;

        self.stats.shader_programs_created += 1;
        Ok(Arc::new(HeadlessShaderProgram::new(stages)))
    }

    fn set_shader_program(&mut self, program: &Arc<dyn ShaderProgram>) {
        self.current_program = Some(Arc::clone(program));
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> RenderResult<Arc<dyn Texture>> {
        Self::check_texture_data(desc, pixels)?;

        self.stats.textures_created += 1;
        Ok(Arc::new(HeadlessTexture {
            kind: TextureKind::Texture2D,
            desc: *desc,
            num_mips: calculate_num_mip_levels(desc.width, desc.height),
            faces: vec![pixels[..desc.image_size_bytes()].to_vec()],
        }))
    }

    fn create_texture_cube(&mut self, desc: &TextureDesc, faces: [&[u8]; 6]) -> RenderResult<Arc<dyn Texture>> {
        for face in faces {
            Self::check_texture_data(desc, face)?;
        }

        self.stats.textures_created += 1;
        let size = desc.image_size_bytes();
        Ok(Arc::new(HeadlessTexture {
            kind: TextureKind::Cube,
            desc: *desc,
            num_mips: 1,
            faces: faces.iter().map(|face| face[..size].to_vec()).collect(),
        }))
    }

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture>>) {
        if let Some(binding) = self.textures.get_mut(slot as usize) {
            *binding = texture.cloned();
        } else {
            log::warn!("Texture slot {} out of range", slot);
        }
    }

    fn create_sampler_state(&mut self, initializer: &SamplerStateInitializer) -> RenderResult<Arc<dyn SamplerState>> {
        self.stats.sampler_states_created += 1;
        let mut initializer = *initializer;
        initializer.max_anisotropy = initializer.max_anisotropy.clamp(1, self.max_anisotropy.max(1));
        Ok(Arc::new(HeadlessSamplerState { initializer }))
    }

    fn set_sampler_state(&mut self, slot: u32, state: &Arc<dyn SamplerState>) {
        if let Some(binding) = self.samplers.get_mut(slot as usize) {
            *binding = Some(Arc::clone(state));
        } else {
            log::warn!("Sampler slot {} out of range", slot);
        }
    }

    fn clear(&mut self, targets: ClearTargets, color: [f32; 4], depth: f32) {
        log::trace!("clear {:?} color {:?} depth {}", targets, color, depth);
    }

    fn render(&mut self, surface: &Surface, camera: &dyn Camera) -> RenderResult<()> {
        if !self.initialized {
            return Err(RenderError::NotInitialized);
        }
        let Some(program) = self.current_program.clone() else {
            return Err(RenderError::Backend("no shader program bound".to_string()));
        };

        let stride = surface.vertex_declaration.layout().stride as usize;
        if surface.vertex_buffer.size() < surface.num_vertices as usize * stride {
            return Err(RenderError::InvalidBuffer(format!(
                "surface '{}' vertex buffer smaller than {} vertices",
                surface.name, surface.num_vertices
            )));
        }
        if surface.index_buffer.size() < surface.num_indices as usize * surface.index_format.size_bytes() {
            return Err(RenderError::InvalidBuffer(format!(
                "surface '{}' index buffer smaller than {} indices",
                surface.name, surface.num_indices
            )));
        }

        program.set_mat4(program.parameter_location(PROJ_MATRIX_PARAM), &camera.projection_matrix());
        program.set_mat4(program.parameter_location(VIEW_MATRIX_PARAM), &camera.view_matrix());

        for (slot, texture) in surface.material.textures.iter().enumerate() {
            if let Some(texture) = texture {
                self.set_texture(slot as u32, Some(texture));
            }
        }

        log::trace!(
            "draw '{}' ({} triangles) from {:?}",
            surface.name,
            surface.primitive_count,
            camera.view_position()
        );
        self.stats.draw_calls += 1;
        self.stats.triangles_drawn += surface.primitive_count as usize;
        Ok(())
    }

    fn max_anisotropy(&self) -> u32 {
        self.max_anisotropy
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_binds_default_samplers() {
        let mut device = HeadlessDevice::with_max_anisotropy(8);
        device.init().unwrap();
        let sampler = device.bound_sampler(3).unwrap();
        assert_eq!(sampler.initializer().max_anisotropy, 8);
        assert_eq!(device.stats().sampler_states_created, 1);
    }

    #[test]
    fn test_buffer_requires_vertex_or_index_usage() {
        let mut device = HeadlessDevice::new();
        assert!(device.create_buffer(BufferUsage::READ_ONLY, &[1, 2, 3]).is_err());
        assert!(device.create_buffer(BufferUsage::VERTEX, &[]).is_err());

        let buffer = device
            .create_buffer(BufferUsage::INDEX | BufferUsage::READ_ONLY, &[1, 2, 3, 4])
            .unwrap();
        assert_eq!(buffer.size(), 4);
        let headless = buffer.as_any().downcast_ref::<HeadlessBuffer>().unwrap();
        assert_eq!(headless.data(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_shader_stage_fails_to_compile() {
        let mut device = HeadlessDevice::new();
        let stages = ShaderStages::new(ShaderBytecode::new("void main() {}"), ShaderBytecode::new("  "));
        let err = device.create_shader_program(&stages).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { stage: "fragment", .. }));
    }

    #[test]
    fn test_parameter_location() {
        let mut device = HeadlessDevice::new();
        let stages = ShaderStages::new(
            ShaderBytecode::new("uniform mat4 ProjMatrix; void main() {}"),
            ShaderBytecode::new("uniform sampler2D Diffuse; void main() {}"),
        );
        let program = device.create_shader_program(&stages).unwrap();
        assert_eq!(program.parameter_location("ProjMatrix"), Some(0));
        assert_eq!(program.parameter_location("Diffuse"), Some(1));
        assert_eq!(program.parameter_location("Missing"), None);
    }

    #[test]
    fn test_uniform_declared_in_two_stages_shares_location() {
        let mut device = HeadlessDevice::new();
        let stages = ShaderStages::new(
            ShaderBytecode::new("uniform vec3 LightDir;\nuniform float Lights[4];\nvoid main() {}"),
            ShaderBytecode::new("uniform vec3 LightDir;\nuniform bool Lit;\nvoid main() {}"),
        );
        let program = device.create_shader_program(&stages).unwrap();
        assert_eq!(program.parameter_location("LightDir"), Some(0));
        assert_eq!(program.parameter_location("Lights"), Some(1));
        assert_eq!(program.parameter_location("Lit"), Some(2));
    }

    #[test]
    fn test_uniform_setters_record_values() {
        let mut device = HeadlessDevice::new();
        let stages = ShaderStages::new(
            ShaderBytecode::new("uniform mat4 World; uniform mat3 NormalMatrix; uniform vec3 Tint; void main() {}"),
            ShaderBytecode::new("uniform float Gloss; uniform bool UseBump; void main() {}"),
        );
        let program = device.create_shader_program(&stages).unwrap();

        let world = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        program.set_mat4(program.parameter_location("World"), &world);
        program.set_mat3(program.parameter_location("NormalMatrix"), &Mat3::identity());
        program.set_vec3(program.parameter_location("Tint"), &Vec3::new(0.5, 0.25, 1.0));
        program.set_float(program.parameter_location("Gloss"), 32.0);
        program.set_bool(program.parameter_location("UseBump"), true);
        // Unknown parameters resolve to None and are ignored
        program.set_float(program.parameter_location("Missing"), 1.0);

        let headless = program.as_any().downcast_ref::<HeadlessShaderProgram>().unwrap();
        assert_eq!(headless.uniform("World"), Some(UniformValue::Mat4(world)));
        assert_eq!(headless.uniform("NormalMatrix"), Some(UniformValue::Mat3(Mat3::identity())));
        assert_eq!(headless.uniform("Tint"), Some(UniformValue::Vec3(Vec3::new(0.5, 0.25, 1.0))));
        assert_eq!(headless.uniform("Gloss"), Some(UniformValue::Float(32.0)));
        assert_eq!(headless.uniform("UseBump"), Some(UniformValue::Bool(true)));
        assert_eq!(headless.uniform("Missing"), None);

        // Out-of-range locations are dropped
        program.set_bool(Some(99), false);
        assert_eq!(headless.uniform("UseBump"), Some(UniformValue::Bool(true)));
    }

    #[test]
    fn test_buffer_update() {
        let mut device = HeadlessDevice::new();
        let dynamic = device.create_buffer(BufferUsage::VERTEX, &[0; 8]).unwrap();
        dynamic.update(2, &[7, 8, 9]).unwrap();
        let headless = dynamic.as_any().downcast_ref::<HeadlessBuffer>().unwrap();
        assert_eq!(headless.data(), vec![0, 0, 7, 8, 9, 0, 0, 0]);

        assert!(matches!(dynamic.update(6, &[1, 2, 3]), Err(RenderError::InvalidBuffer(_))));
        assert!(matches!(dynamic.update(usize::MAX, &[1]), Err(RenderError::InvalidBuffer(_))));
        assert_eq!(headless.data(), vec![0, 0, 7, 8, 9, 0, 0, 0]);

        let fixed = device
            .create_buffer(BufferUsage::INDEX | BufferUsage::READ_ONLY, &[0; 4])
            .unwrap();
        assert!(matches!(fixed.update(0, &[1]), Err(RenderError::InvalidBuffer(_))));
    }

    #[test]
    fn test_texture_data_validation() {
        let mut device = HeadlessDevice::new();
        let desc = TextureDesc::new(2, 2, PixelFormat::R8G8B8A8);
        assert!(matches!(
            device.create_texture_2d(&desc, &[0; 8]),
            Err(RenderError::InvalidTextureData { expected: 16, actual: 8 })
        ));

        let texture = device.create_texture_2d(&desc, &[7; 16]).unwrap();
        assert_eq!(texture.num_mips(), 2);
        assert_eq!(texture.kind(), TextureKind::Texture2D);
    }

    #[test]
    fn test_cube_map_faces() {
        let mut device = HeadlessDevice::new();
        let desc = TextureDesc::new(1, 1, PixelFormat::R8);
        let faces: [&[u8]; 6] = [&[0], &[1], &[2], &[3], &[4], &[5]];
        let cube = device.create_texture_cube(&desc, faces).unwrap();
        assert_eq!(cube.kind(), TextureKind::Cube);
        let headless = cube.as_any().downcast_ref::<HeadlessTexture>().unwrap();
        assert_eq!(headless.face(4), Some(&[4u8][..]));
    }
}
