//! Front end for the GLSL the software device accepts.
//!
//! The device does not execute GLSL. Each stage is compiled by glslang
//! (through `shaderc`), so anything a GL driver would refuse fails here with
//! the compiler's log. The stage's interface is then read back from the
//! SPIR-V so that attribute and uniform lookups behave as they would on a
//! driver, and linking checks that the stages line up.

use shaderc::{CompileOptions, Compiler, EnvVersion, ShaderKind, TargetEnv};

use crate::error::ShaderError;
use crate::gpu::device::{ShaderStage, UniformValue};
use crate::gpu::software::spirv;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlslType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Sampler2D,
}

impl GlslType {
    /// Value a uniform of this type holds before anything is uploaded.
    pub fn zero(self) -> Option<UniformValue> {
        match self {
            GlslType::Bool | GlslType::Int | GlslType::Sampler2D => Some(UniformValue::Int(0)),
            GlslType::Float => Some(UniformValue::Float(0.0)),
            GlslType::Vec3 => Some(UniformValue::Vec3([0.0; 3])),
            GlslType::Mat3 => Some(UniformValue::Mat3([0.0; 9])),
            GlslType::Mat4 => Some(UniformValue::Mat4([0.0; 16])),
            GlslType::Vec2 | GlslType::Vec4 => None,
        }
    }

    pub fn accepts(self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (
                GlslType::Bool | GlslType::Int | GlslType::Sampler2D,
                UniformValue::Int(_)
            ) | (GlslType::Float, UniformValue::Float(_))
                | (GlslType::Vec3, UniformValue::Vec3(_))
                | (GlslType::Mat3, UniformValue::Mat3(_))
                | (GlslType::Mat4, UniformValue::Mat4(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: GlslType,
    pub location: Option<u32>,
}

/// Everything one compiled stage exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub inputs: Vec<Variable>,
    pub outputs: Vec<Variable>,
    /// Flattened uniforms; struct members appear as `name.member`.
    pub uniforms: Vec<(String, GlslType)>,
}

/// The linked interface of a program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgramInterface {
    attributes: Vec<(String, u32)>,
    uniforms: Vec<(String, GlslType)>,
}

impl ProgramInterface {
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, location)| *location)
    }

    pub fn uniform_index(&self, name: &str) -> Option<usize> {
        self.uniforms.iter().position(|(n, _)| n == name)
    }

    pub fn uniforms(&self) -> &[(String, GlslType)] {
        &self.uniforms
    }
}

// ============ Compile ============

fn shader_kind(stage: ShaderStage) -> ShaderKind {
    match stage {
        ShaderStage::Vertex => ShaderKind::Vertex,
        ShaderStage::Fragment => ShaderKind::Fragment,
    }
}

/// Compiles one stage with glslang for an OpenGL 4.5 target and reflects
/// its interface from the resulting SPIR-V.
///
/// Inputs, outputs and uniforms without an explicit `layout(location)` get
/// one assigned, as a GL driver would.
pub fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, ShaderError> {
    let fail = |log: String| ShaderError::Compile { stage, log };

    let mut compiler = Compiler::new().ok_or_else(|| fail("failed to create GLSL compiler".to_string()))?;
    let mut options =
        CompileOptions::new().ok_or_else(|| fail("failed to initialize compile options".to_string()))?;
    options.set_target_env(TargetEnv::OpenGL, EnvVersion::OpenGL4_5 as u32);
    options.set_auto_map_locations(true);
    options.set_auto_bind_uniforms(true);

    let file_name = format!("{stage}.glsl");
    let artifact = compiler
        .compile_into_spirv(source, shader_kind(stage), &file_name, "main", Some(&options))
        .map_err(|e| fail(e.to_string()))?;
    if artifact.get_num_warnings() > 0 {
        log::debug!("{stage} shader warnings: {}", artifact.get_warning_messages());
    }

    spirv::reflect(stage, artifact.as_binary()).map_err(fail)
}

// ============ Link ============

pub fn link(stages: &[StageInterface]) -> Result<ProgramInterface, ShaderError> {
    let find = |stage: ShaderStage| {
        let mut matching = stages.iter().filter(|s| s.stage == stage);
        match (matching.next(), matching.next()) {
            (Some(interface), None) => Ok(interface),
            (None, _) => Err(ShaderError::Link(format!("no {stage} shader attached"))),
            (Some(_), Some(_)) => Err(ShaderError::Link(format!("more than one {stage} shader attached"))),
        }
    };
    let vertex = find(ShaderStage::Vertex)?;
    let fragment = find(ShaderStage::Fragment)?;

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.name == input.name) {
            None => {
                return Err(ShaderError::Link(format!(
                    "fragment input '{}' is not written by the vertex shader",
                    input.name
                )))
            }
            Some(output) if output.ty != input.ty => {
                return Err(ShaderError::Link(format!(
                    "type mismatch for '{}' between vertex and fragment stages",
                    input.name
                )))
            }
            Some(_) => {}
        }
    }

    let mut attributes: Vec<(String, u32)> = Vec::new();
    for input in vertex.inputs.iter().filter(|i| i.location.is_some()) {
        let location = input.location.unwrap_or_default();
        if attributes.iter().any(|(_, l)| *l == location) {
            return Err(ShaderError::Link(format!(
                "attribute location {location} assigned twice"
            )));
        }
        attributes.push((input.name.clone(), location));
    }
    for input in vertex.inputs.iter().filter(|i| i.location.is_none()) {
        let location = (0..)
            .find(|l| !attributes.iter().any(|(_, used)| used == l))
            .unwrap_or_default();
        attributes.push((input.name.clone(), location));
    }

    let mut uniforms: Vec<(String, GlslType)> = Vec::new();
    for (name, ty) in vertex.uniforms.iter().chain(fragment.uniforms.iter()) {
        match uniforms.iter().find(|(n, _)| n == name) {
            Some((_, existing)) if existing != ty => {
                return Err(ShaderError::Link(format!(
                    "uniform '{name}' declared with different types"
                )))
            }
            Some(_) => {}
            None => uniforms.push((name.clone(), *ty)),
        }
    }

    Ok(ProgramInterface {
        attributes,
        uniforms,
    })
}
