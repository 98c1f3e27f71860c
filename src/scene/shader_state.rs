//! The program every scene object draws with, and the transforms shared
//! between draws.

use std::collections::HashMap;

use crate::gpu::resources::VERTEX_LAYOUT;
use crate::gpu::{GraphicsDevice, ProgramId, UniformLocation, UniformValue, VertexAttribute};
use crate::math::{Mat3, Mat4, Vec3};

/// Shader program plus the scene-wide matrices.
///
/// Uniform locations are looked up once per name and cached for the life of
/// the program. A name the program does not declare is cached as absent and
/// every later set of it is a no-op.
#[derive(Debug)]
pub struct ShaderState {
    program: ProgramId,
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub normal: Mat3,
    locations: HashMap<String, Option<UniformLocation>>,
}

impl ShaderState {
    pub fn new(program: ProgramId) -> Self {
        Self {
            program,
            model: Mat4::identity(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            normal: Mat3::identity(),
            locations: HashMap::new(),
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn bind_program<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.use_program(Some(self.program));
    }

    /// Points the program's vertex inputs at the interleaved layout of the
    /// bound vertex array.
    pub fn send_attributes<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        let inputs = ["vPosition", "vNormal", "vTextureCoord"];
        for (name, layout) in inputs.into_iter().zip(VERTEX_LAYOUT) {
            let Some(location) = device.attribute_location(self.program, name) else {
                log::warn!("Program {} has no vertex input '{name}'", self.program.get());
                continue;
            };
            device.vertex_attrib_pointer(VertexAttribute { location, ..layout });
            device.enable_vertex_attrib(location);
        }
    }

    /// Uploads the transform uniforms.
    pub fn send_uniforms<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        model: &Mat4,
        view: &Mat4,
        model_view: &Mat4,
        projection: &Mat4,
        normal: &Mat3,
    ) {
        self.set_mat4(device, "Model", model);
        self.set_mat4(device, "View", view);
        self.set_mat4(device, "ModelView", model_view);
        self.set_mat4(device, "Projection", projection);
        self.set_mat3(device, "NormalMatrix", normal);
    }

    /// Cached uniform lookup.
    pub fn location<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &D,
        name: &str,
    ) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.get(name) {
            return *cached;
        }
        let location = device.uniform_location(self.program, name);
        if location.is_none() {
            log::debug!("Program {} has no uniform '{name}'", self.program.get());
        }
        self.locations.insert(name.to_string(), location);
        location
    }

    fn set<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: UniformValue) {
        if let Some(location) = self.location(&*device, name) {
            device.program_uniform(self.program, location, value);
        }
    }

    pub fn set_int<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: i32) {
        self.set(device, name, UniformValue::Int(value));
    }

    pub fn set_float<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: f32) {
        self.set(device, name, UniformValue::Float(value));
    }

    pub fn set_vec3<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: Vec3) {
        self.set(device, name, UniformValue::Vec3(value.to_array()));
    }

    pub fn set_mat3<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: &Mat3) {
        self.set(device, name, UniformValue::Mat3(value.to_cols_array()));
    }

    pub fn set_mat4<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, name: &str, value: &Mat4) {
        self.set(device, name, UniformValue::Mat4(value.to_cols_array()));
    }

    pub fn cached_locations(&self) -> usize {
        self.locations.len()
    }
}
