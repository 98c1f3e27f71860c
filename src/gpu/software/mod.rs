//! A [`GraphicsDevice`] that renders on the CPU.
//!
//! Object names, binding points and per-object state behave like their GL
//! counterparts, including the quiet handling of misuse: a call that would
//! raise a GL error is logged with `warn!` and otherwise ignored. Draws run
//! the pipeline in [`pipeline`] through the clipper, rasterizer and shaders
//! in `crate::render` into an ARGB8888 colour buffer.

pub mod glsl;
pub mod pipeline;
pub mod spirv;
pub mod texture;

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::colors::BLACK;
use crate::error::ShaderError;
use crate::gpu::device::{
    BufferId, Capability, ClearFlags, GraphicsDevice, PixelFormat, Primitive, ProgramId,
    SamplerParams, ShaderStage, TextureId, UniformLocation, UniformValue, VertexArrayId,
    VertexAttribute,
};
use crate::math::Vec3;
use crate::render::shader::{PhongShader, VertexColorShader};
use crate::render::{
    ClipSpaceClipper, ClipSpacePolygon, ClipSpaceVertex, EdgeFunctionRasterizer, PixelShader,
    RenderTarget, ScreenVertex,
};

use pipeline::{DrawState, LinkedProgram};
use texture::TextureObject;

pub const MAX_VERTEX_ATTRIBS: usize = 16;
pub const MAX_TEXTURE_UNITS: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct AttributeSlot {
    pointer: Option<(BufferId, VertexAttribute)>,
    enabled: bool,
}

#[derive(Clone, Debug, Default)]
struct VertexArrayObject {
    slots: [AttributeSlot; MAX_VERTEX_ATTRIBS],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Viewport {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

/// Counters for the work done since the last [`SoftwareDevice::reset_stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub draw_calls: usize,
    pub triangles: usize,
    pub fragments: usize,
}

/// Number of live objects of each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub vertex_arrays: usize,
    pub buffers: usize,
    pub textures: usize,
    pub programs: usize,
}

/// Read-only view of a texture object, for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub mip_levels: usize,
    pub params: SamplerParams,
}

pub struct SoftwareDevice {
    target: RenderTarget,
    viewport: Viewport,
    depth_test: bool,
    cull_face: bool,

    next_name: NonZeroU32,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayObject>,
    buffers: HashMap<BufferId, Option<Vec<f32>>>,
    textures: HashMap<TextureId, TextureObject>,
    programs: HashMap<ProgramId, LinkedProgram>,

    bound_vertex_array: Option<VertexArrayId>,
    bound_array_buffer: Option<BufferId>,
    active_unit: usize,
    texture_units: [Option<TextureId>; MAX_TEXTURE_UNITS],
    current_program: Option<ProgramId>,

    clipper: ClipSpaceClipper,
    rasterizer: EdgeFunctionRasterizer,
    stats: DrawStats,
}

impl SoftwareDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: RenderTarget::new(width, height),
            viewport: Viewport {
                x: 0,
                y: 0,
                width,
                height,
            },
            depth_test: false,
            cull_face: false,
            next_name: NonZeroU32::MIN,
            vertex_arrays: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            bound_vertex_array: None,
            bound_array_buffer: None,
            active_unit: 0,
            texture_units: [None; MAX_TEXTURE_UNITS],
            current_program: None,
            clipper: ClipSpaceClipper::new(),
            rasterizer: EdgeFunctionRasterizer::new(),
            stats: DrawStats::default(),
        }
    }

    fn next_name(&mut self) -> NonZeroU32 {
        let name = self.next_name;
        self.next_name = name.saturating_add(1);
        name
    }

    // ============ Frame access ============

    pub fn width(&self) -> u32 {
        self.target.width()
    }

    pub fn height(&self) -> u32 {
        self.target.height()
    }

    /// Reallocates the colour and depth buffers. The viewport is left alone.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target.resize(width, height);
    }

    /// The colour buffer as packed ARGB8888 pixels, top row first.
    pub fn pixels(&self) -> &[u32] {
        self.target.color()
    }

    /// The colour buffer as raw bytes, ready for a streaming texture upload.
    pub fn frame_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.target.color())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width() && y < self.height() {
            self.target.color().get((y * self.width() + x) as usize).copied()
        } else {
            None
        }
    }

    // ============ Introspection ============

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DrawStats::default();
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            vertex_arrays: self.vertex_arrays.len(),
            buffers: self.buffers.len(),
            textures: self.textures.len(),
            programs: self.programs.len(),
        }
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.bound_vertex_array
    }

    pub fn texture_on_unit(&self, unit: u32) -> Option<TextureId> {
        self.texture_units.get(unit as usize).copied().flatten()
    }

    pub fn texture_info(&self, texture: TextureId) -> Option<TextureInfo> {
        let object = self.textures.get(&texture)?;
        let base = object.base();
        Some(TextureInfo {
            width: base.map_or(0, |l| l.width),
            height: base.map_or(0, |l| l.height),
            mip_levels: object.levels.len(),
            params: object.params,
        })
    }

    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer)?.as_ref().map(Vec::len)
    }

    /// Current value of a named uniform of `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.programs.get(&program)?.value(name)
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::DepthTest => self.depth_test,
            Capability::CullFace => self.cull_face,
        }
    }

    // ============ Draw internals ============

    /// Reads `components` floats of `vertex` through an attribute slot. A
    /// disabled slot reads as zero.
    fn fetch(&self, vao: &VertexArrayObject, location: Option<u32>, vertex: usize) -> Option<[f32; 3]> {
        let Some(slot) = location.and_then(|l| vao.slots.get(l as usize)) else {
            return Some([0.0; 3]);
        };
        if !slot.enabled {
            return Some([0.0; 3]);
        }
        let (buffer, attribute) = slot.pointer?;
        let data = self.buffers.get(&buffer)?.as_ref()?;
        let start = vertex * attribute.stride + attribute.offset;
        let values = data.get(start..start + attribute.components)?;
        let mut out = [0.0; 3];
        for (o, v) in out.iter_mut().zip(values) {
            *o = *v;
        }
        Some(out)
    }
}

/// Fixed-function state a draw rasterizes with.
struct Raster<'a> {
    target: &'a mut RenderTarget,
    viewport: Viewport,
    cull_face: bool,
    depth_test: bool,
    clipper: &'a ClipSpaceClipper,
    rasterizer: &'a EdgeFunctionRasterizer,
}

impl Raster<'_> {
    /// Perspective divide and viewport transform. Window y grows upwards, so
    /// rows are flipped to match the top-down colour buffer.
    fn to_screen(&self, v: &ClipSpaceVertex) -> ScreenVertex {
        let ndc = v.position.project();
        let vp = self.viewport;
        let window_x = vp.x as f32 + (ndc.x + 1.0) * 0.5 * vp.width as f32;
        let window_y = vp.y as f32 + (ndc.y + 1.0) * 0.5 * vp.height as f32;
        let depth = (ndc.z + 1.0) * 0.5;
        ScreenVertex::new(
            window_x,
            self.target.height() as f32 - window_y,
            depth,
            v.position.w,
            &v.varyings,
        )
    }

    /// Clips, culls and fills every triangle of `vertices`. Returns the
    /// number of triangles rasterized and fragments written.
    fn draw<S: PixelShader>(&mut self, vertices: &[ClipSpaceVertex], shader: &S) -> (usize, usize) {
        let mut triangles = 0;
        let mut fragments = 0;
        for corners in vertices.chunks_exact(3) {
            let polygon = ClipSpacePolygon::from_triangle(corners[0], corners[1], corners[2]);
            let clipped = self.clipper.clip_polygon(polygon);
            for (a, b, c) in clipped.triangulate() {
                if self.cull_face && !is_front_facing(a, b, c) {
                    continue;
                }
                let screen = [self.to_screen(a), self.to_screen(b), self.to_screen(c)];
                triangles += 1;
                let mut framebuffer = self.target.as_framebuffer();
                fragments += self
                    .rasterizer
                    .fill_triangle(&screen, &mut framebuffer, shader, self.depth_test);
            }
        }
        (triangles, fragments)
    }
}

/// Counter-clockwise in normalized device coordinates is front-facing.
fn is_front_facing(a: &ClipSpaceVertex, b: &ClipSpaceVertex, c: &ClipSpaceVertex) -> bool {
    let (a, b, c) = (a.position.project(), b.position.project(), c.position.project());
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y) > 0.0
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId::from(self.next_name());
        self.vertex_arrays.insert(id, VertexArrayObject::default());
        id
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        if let Some(id) = vertex_array {
            if !self.vertex_arrays.contains_key(&id) {
                log::warn!("bind_vertex_array: unknown vertex array {}", id.get());
                return;
            }
        }
        self.bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if self.vertex_arrays.remove(&vertex_array).is_some()
            && self.bound_vertex_array == Some(vertex_array)
        {
            self.bound_vertex_array = None;
        }
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId::from(self.next_name());
        self.buffers.insert(id, None);
        id
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferId>) {
        if let Some(id) = buffer {
            if !self.buffers.contains_key(&id) {
                log::warn!("bind_array_buffer: unknown buffer {}", id.get());
                return;
            }
        }
        self.bound_array_buffer = buffer;
    }

    fn buffer_storage(&mut self, data: &[f32]) {
        let Some(id) = self.bound_array_buffer else {
            log::warn!("buffer_storage: no array buffer bound");
            return;
        };
        match self.buffers.get_mut(&id) {
            Some(storage @ None) => *storage = Some(data.to_vec()),
            Some(Some(_)) => log::warn!("buffer_storage: buffer {} is immutable", id.get()),
            None => {}
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() && self.bound_array_buffer == Some(buffer) {
            self.bound_array_buffer = None;
        }
    }

    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute) {
        let (Some(vao), Some(buffer)) = (self.bound_vertex_array, self.bound_array_buffer) else {
            log::warn!("vertex_attrib_pointer: needs a bound vertex array and array buffer");
            return;
        };
        if attribute.components == 0 || attribute.components > 3 {
            log::warn!("vertex_attrib_pointer: unsupported size {}", attribute.components);
            return;
        }
        if let Some(slot) = self
            .vertex_arrays
            .get_mut(&vao)
            .and_then(|v| v.slots.get_mut(attribute.location as usize))
        {
            slot.pointer = Some((buffer, attribute));
        }
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        let Some(vao) = self.bound_vertex_array else {
            log::warn!("enable_vertex_attrib: no vertex array bound");
            return;
        };
        if let Some(slot) = self
            .vertex_arrays
            .get_mut(&vao)
            .and_then(|v| v.slots.get_mut(location as usize))
        {
            slot.enabled = true;
        }
    }

    fn create_texture(&mut self) -> TextureId {
        let id = TextureId::from(self.next_name());
        self.textures.insert(id, TextureObject::default());
        id
    }

    fn active_texture(&mut self, unit: u32) {
        if (unit as usize) < MAX_TEXTURE_UNITS {
            self.active_unit = unit as usize;
        } else {
            log::warn!("active_texture: unit {unit} out of range");
        }
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        if let Some(id) = texture {
            if !self.textures.contains_key(&id) {
                log::warn!("bind_texture: unknown texture {}", id.get());
                return;
            }
        }
        self.texture_units[self.active_unit] = texture;
    }

    fn texture_parameters(&mut self, params: SamplerParams) {
        match self.bound_texture_mut() {
            Some(texture) => texture.params = params,
            None => log::warn!("texture_parameters: no texture bound"),
        }
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        match self.bound_texture_mut() {
            Some(texture) => {
                if !texture.set_image(width, height, format, pixels) {
                    log::warn!("tex_image_2d: {} bytes is too short for {width}x{height}", pixels.len());
                }
            }
            None => log::warn!("tex_image_2d: no texture bound"),
        }
    }

    fn generate_mipmap(&mut self) {
        match self.bound_texture_mut() {
            Some(texture) => texture.generate_mipmaps(),
            None => log::warn!("generate_mipmap: no texture bound"),
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            for unit in self.texture_units.iter_mut() {
                if *unit == Some(texture) {
                    *unit = None;
                }
            }
        }
    }

    fn create_program(&mut self, sources: &[(ShaderStage, &str)]) -> Result<ProgramId, ShaderError> {
        let stages = sources
            .iter()
            .map(|(stage, source)| glsl::compile(*stage, source))
            .collect::<Result<Vec<_>, _>>()?;
        let interface = glsl::link(&stages)?;

        let id = ProgramId::from(self.next_name());
        self.programs.insert(id, LinkedProgram::new(interface));
        Ok(id)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        if let Some(id) = program {
            if !self.programs.contains_key(&id) {
                log::warn!("use_program: unknown program {}", id.get());
                return;
            }
        }
        self.current_program = program;
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs.get(&program)?.interface.attribute_location(name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let index = self.programs.get(&program)?.interface.uniform_index(name)?;
        Some(UniformLocation(index as u32))
    }

    fn program_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        let Some(linked) = self.programs.get_mut(&program) else {
            log::warn!("program_uniform: unknown program {}", program.get());
            return;
        };
        let index = location.0 as usize;
        match linked.interface.uniforms().get(index) {
            Some((_, ty)) if ty.accepts(&value) => linked.values[index] = Some(value),
            Some((name, ty)) => {
                log::warn!("program_uniform: {value:?} does not fit '{name}' of type {ty:?}")
            }
            None => log::warn!("program_uniform: no uniform at location {index}"),
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program).is_some() && self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
        };
    }

    fn enable(&mut self, capability: Capability) {
        match capability {
            Capability::DepthTest => self.depth_test = true,
            Capability::CullFace => self.cull_face = true,
        }
    }

    fn clear(&mut self, flags: ClearFlags) {
        if flags.contains(ClearFlags::COLOR) {
            self.target.clear_color(BLACK);
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.target.clear_depth();
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize) {
        let Primitive::Triangles = primitive;
        let Some(program) = self.current_program.and_then(|id| self.programs.get(&id)) else {
            log::warn!("draw_arrays: no program in use");
            return;
        };
        let Some(vao) = self.bound_vertex_array.and_then(|id| self.vertex_arrays.get(&id)) else {
            log::warn!("draw_arrays: no vertex array bound");
            return;
        };

        let state = DrawState::from_program(program);
        let locations = [
            program.interface.attribute_location("vPosition"),
            program.interface.attribute_location("vNormal"),
            program.interface.attribute_location("vTextureCoord"),
        ];

        // Vertex stage.
        let mut vertices = Vec::with_capacity(count);
        for vertex in first..first + count {
            let fetched = (
                self.fetch(vao, locations[0], vertex),
                self.fetch(vao, locations[1], vertex),
                self.fetch(vao, locations[2], vertex),
            );
            let (Some(position), Some(normal), Some(tex_coord)) = fetched else {
                log::warn!("draw_arrays: vertex {vertex} reads past the end of its buffer");
                return;
            };
            vertices.push(state.shade_vertex(
                Vec3::from_array(position),
                Vec3::from_array(normal),
                [tex_coord[0], tex_coord[1]],
            ));
        }

        // Sampling a unit with no complete texture yields black.
        let incomplete = TextureObject::default();
        let texture = state.render_texture.then(|| {
            usize::try_from(state.sampler_unit)
                .ok()
                .and_then(|unit| self.texture_units.get(unit).copied().flatten())
                .and_then(|id| self.textures.get(&id))
                .unwrap_or(&incomplete)
        });

        let mut raster = Raster {
            target: &mut self.target,
            viewport: self.viewport,
            cull_face: self.cull_face,
            depth_test: self.depth_test,
            clipper: &self.clipper,
            rasterizer: &self.rasterizer,
        };
        let (triangles, fragments) = match texture {
            Some(texture) => raster.draw(
                &vertices,
                &PhongShader::new(texture, state.material, state.light),
            ),
            None => raster.draw(&vertices, &VertexColorShader),
        };

        self.stats.draw_calls += 1;
        self.stats.triangles += triangles;
        self.stats.fragments += fragments;
    }
}

impl SoftwareDevice {
    fn bound_texture_mut(&mut self) -> Option<&mut TextureObject> {
        let id = self.texture_units[self.active_unit]?;
        self.textures.get_mut(&id)
    }
}

#[cfg(test)]
mod tests;
