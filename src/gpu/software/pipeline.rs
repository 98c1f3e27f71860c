//! The fixed shading program the software device runs for every draw.
//!
//! It mirrors `shaders/pool.vert` and `shaders/pool.frag`: the vertex stage
//! moves positions and normals into eye space and passes the colour and
//! texture coordinates through; the fragment stage either outputs the
//! vertex colour (`isRenderTexture == 0`) or samples the bound texture and
//! applies the light selected by `lightModel`. All inputs are read from the
//! program's uniforms by name, so a program whose interface lacks a uniform
//! sees that uniform as zero.

use crate::gpu::device::UniformValue;
use crate::gpu::software::glsl::ProgramInterface;
use crate::math::{Mat3, Mat4, Vec3, Vec4};
use crate::render::shader::{ActiveLight, Attenuation, LightColor, SurfaceMaterial};
use crate::render::{ClipSpaceVertex, COLOR, NORMAL, POSITION, TEX_COORD, VARYING_COUNT};

/// A linked program: its interface plus the current uniform values.
#[derive(Clone, Debug)]
pub struct LinkedProgram {
    pub interface: ProgramInterface,
    pub values: Vec<Option<UniformValue>>,
}

impl LinkedProgram {
    pub fn new(interface: ProgramInterface) -> Self {
        let values = interface.uniforms().iter().map(|(_, ty)| ty.zero()).collect();
        Self { interface, values }
    }

    pub fn value(&self, name: &str) -> Option<UniformValue> {
        self.interface
            .uniform_index(name)
            .and_then(|index| self.values.get(index).copied().flatten())
    }

    fn int(&self, name: &str) -> i32 {
        match self.value(name) {
            Some(UniformValue::Int(v)) => v,
            _ => 0,
        }
    }

    fn float(&self, name: &str) -> f32 {
        match self.value(name) {
            Some(UniformValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    fn vec3(&self, name: &str) -> Vec3 {
        match self.value(name) {
            Some(UniformValue::Vec3(v)) => Vec3::from_array(v),
            _ => Vec3::ZERO,
        }
    }

    fn mat3(&self, name: &str) -> Mat3 {
        match self.value(name) {
            Some(UniformValue::Mat3(v)) => Mat3::from_cols_array(&v),
            _ => Mat3::from_cols_array(&[0.0; 9]),
        }
    }

    fn mat4(&self, name: &str) -> Mat4 {
        match self.value(name) {
            Some(UniformValue::Mat4(v)) => Mat4::from_cols_array(&v),
            _ => Mat4::ZERO,
        }
    }

    fn light_color(&self, prefix: &str) -> LightColor {
        LightColor {
            ambient: self.vec3(&format!("{prefix}.ambient")),
            diffuse: self.vec3(&format!("{prefix}.diffuse")),
            specular: self.vec3(&format!("{prefix}.specular")),
        }
    }

    fn attenuation(&self, prefix: &str) -> Attenuation {
        Attenuation {
            constant: self.float(&format!("{prefix}.constant")),
            linear: self.float(&format!("{prefix}.linear")),
            quadratic: self.float(&format!("{prefix}.quadratic")),
        }
    }
}

/// Uniform state resolved once per draw call.
#[derive(Clone, Copy, Debug)]
pub struct DrawState {
    pub model_view: Mat4,
    pub projection: Mat4,
    pub normal_matrix: Mat3,
    pub render_texture: bool,
    pub sampler_unit: i32,
    pub material: SurfaceMaterial,
    pub light: ActiveLight,
}

impl DrawState {
    pub fn from_program(program: &LinkedProgram) -> Self {
        let view = program.mat4("View");
        let to_eye_point = |p: Vec3| (view * Vec4::point(p)).truncate();
        let to_eye_direction = |d: Vec3| (view * Vec4::direction(d)).truncate();

        let light = match program.int("lightModel") {
            1 => ActiveLight::Ambient {
                ambient: program.vec3("ambientLight.ambient"),
            },
            2 => ActiveLight::Directional {
                direction: to_eye_direction(program.vec3("directionalLight.direction")),
                color: program.light_color("directionalLight"),
            },
            3 => ActiveLight::Point {
                position: to_eye_point(program.vec3("pointLight.position")),
                color: program.light_color("pointLight"),
                attenuation: program.attenuation("pointLight"),
            },
            4 => ActiveLight::Spot {
                position: to_eye_point(program.vec3("spotLight.position")),
                direction: to_eye_direction(program.vec3("spotLight.direction")),
                color: program.light_color("spotLight"),
                attenuation: program.attenuation("spotLight"),
                cut_off: program.float("spotLight.cutOff"),
                outer_cut_off: program.float("spotLight.outerCutOff"),
            },
            _ => ActiveLight::Off,
        };

        Self {
            model_view: program.mat4("ModelView"),
            projection: program.mat4("Projection"),
            normal_matrix: program.mat3("NormalMatrix"),
            render_texture: program.int("isRenderTexture") != 0,
            sampler_unit: program.int("sampler"),
            material: SurfaceMaterial {
                shininess: program.float("material.shininess"),
                ambient: program.vec3("material.ambient"),
                diffuse: program.vec3("material.diffuse"),
                specular: program.vec3("material.specular"),
            },
            light,
        }
    }

    /// Vertex stage: one vertex's attributes to a clip-space vertex.
    pub fn shade_vertex(&self, position: Vec3, normal: Vec3, tex_coord: [f32; 2]) -> ClipSpaceVertex {
        let eye = self.model_view * Vec4::point(position);
        let eye_normal = (self.normal_matrix * normal).normalize_or_zero();

        let mut varyings = [0.0; VARYING_COUNT];
        varyings[POSITION..POSITION + 3].copy_from_slice(&eye.truncate().to_array());
        varyings[NORMAL..NORMAL + 3].copy_from_slice(&eye_normal.to_array());
        varyings[COLOR..COLOR + 3].copy_from_slice(&normal.to_array());
        varyings[TEX_COORD..TEX_COORD + 2].copy_from_slice(&tex_coord);

        ClipSpaceVertex::new(self.projection * eye, varyings)
    }
}
