//! Reads a stage's interface back out of the SPIR-V the GLSL compiler
//! produced: named `in`/`out` variables with their locations, and uniforms
//! flattened to the names a GL driver reports (`light.position`).

use std::collections::HashMap;

use crate::gpu::device::ShaderStage;
use crate::gpu::software::glsl::{GlslType, StageInterface, Variable};

const MAGIC: u32 = 0x0723_0203;

const DECORATION_BLOCK: u32 = 2;
const DECORATION_BUILT_IN: u32 = 11;
const DECORATION_LOCATION: u32 = 30;

const DIM_2D: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StorageClass {
    UniformConstant,
    Input,
    Uniform,
    Output,
    Other,
}

impl StorageClass {
    fn from_num(n: u32) -> Self {
        match n {
            0 => StorageClass::UniformConstant,
            1 => StorageClass::Input,
            2 => StorageClass::Uniform,
            3 => StorageClass::Output,
            _ => StorageClass::Other,
        }
    }
}

#[derive(Clone, Debug)]
enum Instruction {
    Name { target_id: u32, name: String },
    MemberName { target_id: u32, member: u32, name: String },
    TypeBool { result_id: u32 },
    TypeInt { result_id: u32, width: u32, signed: bool },
    TypeFloat { result_id: u32, width: u32 },
    TypeVector { result_id: u32, component_id: u32, count: u32 },
    TypeMatrix { result_id: u32, column_type_id: u32, column_count: u32 },
    TypeImage { result_id: u32, dim: u32 },
    TypeSampledImage { result_id: u32, image_type_id: u32 },
    TypeStruct { result_id: u32, member_types: Vec<u32> },
    TypePointer { result_id: u32, type_id: u32 },
    Variable { result_type_id: u32, result_id: u32, storage_class: StorageClass },
    Decorate { target_id: u32, decoration: u32, params: Vec<u32> },
    MemberDecorate { target_id: u32, decoration: u32 },
    Other,
}

fn parse_string(data: &[u32]) -> String {
    let bytes: Vec<u8> = data
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn decode_instruction(opcode: u16, operands: &[u32]) -> Result<Instruction, String> {
    let operand = |i: usize| {
        operands
            .get(i)
            .copied()
            .ok_or_else(|| format!("truncated operands for opcode {opcode}"))
    };
    Ok(match opcode {
        5 => Instruction::Name {
            target_id: operand(0)?,
            name: parse_string(&operands[1..]),
        },
        6 => Instruction::MemberName {
            target_id: operand(0)?,
            member: operand(1)?,
            name: parse_string(operands.get(2..).unwrap_or_default()),
        },
        20 => Instruction::TypeBool {
            result_id: operand(0)?,
        },
        21 => Instruction::TypeInt {
            result_id: operand(0)?,
            width: operand(1)?,
            signed: operand(2)? != 0,
        },
        22 => Instruction::TypeFloat {
            result_id: operand(0)?,
            width: operand(1)?,
        },
        23 => Instruction::TypeVector {
            result_id: operand(0)?,
            component_id: operand(1)?,
            count: operand(2)?,
        },
        24 => Instruction::TypeMatrix {
            result_id: operand(0)?,
            column_type_id: operand(1)?,
            column_count: operand(2)?,
        },
        25 => Instruction::TypeImage {
            result_id: operand(0)?,
            dim: operand(2)?,
        },
        27 => Instruction::TypeSampledImage {
            result_id: operand(0)?,
            image_type_id: operand(1)?,
        },
        30 => Instruction::TypeStruct {
            result_id: operand(0)?,
            member_types: operands[1..].to_vec(),
        },
        32 => Instruction::TypePointer {
            result_id: operand(0)?,
            type_id: operand(2)?,
        },
        59 => Instruction::Variable {
            result_type_id: operand(0)?,
            result_id: operand(1)?,
            storage_class: StorageClass::from_num(operand(2)?),
        },
        71 => Instruction::Decorate {
            target_id: operand(0)?,
            decoration: operand(1)?,
            params: operands.get(2..).unwrap_or_default().to_vec(),
        },
        72 => Instruction::MemberDecorate {
            target_id: operand(0)?,
            decoration: operand(2)?,
        },
        _ => Instruction::Other,
    })
}

fn parse_words(words: &[u32]) -> Result<Vec<Instruction>, String> {
    if words.len() < 5 || words[0] != MAGIC {
        return Err("not a SPIR-V module".to_string());
    }
    let mut instructions = Vec::new();
    let mut rest = &words[5..];
    while let Some(&first) = rest.first() {
        let word_count = (first >> 16) as usize;
        let opcode = (first & 0xffff) as u16;
        if word_count == 0 || rest.len() < word_count {
            return Err("incomplete SPIR-V instruction".to_string());
        }
        instructions.push(decode_instruction(opcode, &rest[1..word_count])?);
        rest = &rest[word_count..];
    }
    Ok(instructions)
}

#[derive(Clone, Debug)]
enum SpirvType {
    Bool,
    Int { width: u32, signed: bool },
    Float { width: u32 },
    Vector { component_id: u32, count: u32 },
    Matrix { column_type_id: u32, column_count: u32 },
    Image { dim: u32 },
    SampledImage { image_type_id: u32 },
    Struct { member_types: Vec<u32> },
}

/// Id tables built from one module.
#[derive(Default)]
struct Module {
    names: HashMap<u32, String>,
    member_names: HashMap<(u32, u32), String>,
    types: HashMap<u32, SpirvType>,
    pointers: HashMap<u32, u32>,
    locations: HashMap<u32, u32>,
    built_ins: Vec<u32>,
    blocks: Vec<u32>,
    variables: Vec<(u32, u32, StorageClass)>,
}

impl Module {
    fn new(instructions: Vec<Instruction>) -> Self {
        let mut module = Module::default();
        for instruction in instructions {
            match instruction {
                Instruction::Name { target_id, name } => {
                    module.names.insert(target_id, name);
                }
                Instruction::MemberName { target_id, member, name } => {
                    module.member_names.insert((target_id, member), name);
                }
                Instruction::TypeBool { result_id } => {
                    module.types.insert(result_id, SpirvType::Bool);
                }
                Instruction::TypeInt { result_id, width, signed } => {
                    module.types.insert(result_id, SpirvType::Int { width, signed });
                }
                Instruction::TypeFloat { result_id, width } => {
                    module.types.insert(result_id, SpirvType::Float { width });
                }
                Instruction::TypeVector { result_id, component_id, count } => {
                    module
                        .types
                        .insert(result_id, SpirvType::Vector { component_id, count });
                }
                Instruction::TypeMatrix { result_id, column_type_id, column_count } => {
                    module.types.insert(
                        result_id,
                        SpirvType::Matrix {
                            column_type_id,
                            column_count,
                        },
                    );
                }
                Instruction::TypeImage { result_id, dim } => {
                    module.types.insert(result_id, SpirvType::Image { dim });
                }
                Instruction::TypeSampledImage { result_id, image_type_id } => {
                    module
                        .types
                        .insert(result_id, SpirvType::SampledImage { image_type_id });
                }
                Instruction::TypeStruct { result_id, member_types } => {
                    module.types.insert(result_id, SpirvType::Struct { member_types });
                }
                Instruction::TypePointer { result_id, type_id } => {
                    module.pointers.insert(result_id, type_id);
                }
                Instruction::Variable {
                    result_type_id,
                    result_id,
                    storage_class,
                } => module.variables.push((result_id, result_type_id, storage_class)),
                Instruction::Decorate {
                    target_id,
                    decoration,
                    params,
                } => match decoration {
                    DECORATION_LOCATION => {
                        if let Some(&location) = params.first() {
                            module.locations.insert(target_id, location);
                        }
                    }
                    DECORATION_BUILT_IN => module.built_ins.push(target_id),
                    DECORATION_BLOCK => module.blocks.push(target_id),
                    _ => {}
                },
                Instruction::MemberDecorate { target_id, decoration } => {
                    if decoration == DECORATION_BUILT_IN {
                        module.built_ins.push(target_id);
                    }
                }
                Instruction::Other => {}
            }
        }
        module
    }

    fn is_float(&self, id: u32) -> bool {
        matches!(self.types.get(&id), Some(SpirvType::Float { width: 32 }))
    }

    fn vector_len(&self, id: u32) -> Option<u32> {
        match self.types.get(&id)? {
            SpirvType::Vector { component_id, count } if self.is_float(*component_id) => Some(*count),
            _ => None,
        }
    }

    fn glsl_type(&self, id: u32) -> Option<GlslType> {
        Some(match self.types.get(&id)? {
            SpirvType::Bool => GlslType::Bool,
            SpirvType::Int { width: 32, signed: true } => GlslType::Int,
            SpirvType::Float { width: 32 } => GlslType::Float,
            SpirvType::Vector { .. } => match self.vector_len(id)? {
                2 => GlslType::Vec2,
                3 => GlslType::Vec3,
                4 => GlslType::Vec4,
                _ => return None,
            },
            SpirvType::Matrix {
                column_type_id,
                column_count,
            } => match (self.vector_len(*column_type_id)?, column_count) {
                (3, 3) => GlslType::Mat3,
                (4, 4) => GlslType::Mat4,
                _ => return None,
            },
            SpirvType::SampledImage { image_type_id } => match self.types.get(image_type_id)? {
                SpirvType::Image { dim: DIM_2D } => GlslType::Sampler2D,
                _ => return None,
            },
            _ => return None,
        })
    }

    fn name(&self, id: u32) -> String {
        self.names.get(&id).cloned().unwrap_or_default()
    }

    fn flatten_uniform(
        &self,
        name: &str,
        type_id: u32,
        out: &mut Vec<(String, GlslType)>,
    ) -> Result<(), String> {
        if let Some(SpirvType::Struct { member_types }) = self.types.get(&type_id) {
            for (member, &member_type) in (0u32..).zip(member_types) {
                let member_name = self
                    .member_names
                    .get(&(type_id, member))
                    .cloned()
                    .unwrap_or_default();
                let full = if name.is_empty() {
                    member_name
                } else {
                    format!("{name}.{member_name}")
                };
                self.flatten_uniform(&full, member_type, out)?;
            }
            return Ok(());
        }
        let ty = self
            .glsl_type(type_id)
            .ok_or_else(|| format!("uniform '{name}' has an unsupported type"))?;
        out.push((name.to_string(), ty));
        Ok(())
    }
}

/// Builds the interface of one compiled stage from its SPIR-V words.
pub fn reflect(stage: ShaderStage, words: &[u32]) -> Result<StageInterface, String> {
    let module = Module::new(parse_words(words)?);
    let mut interface = StageInterface {
        stage,
        inputs: Vec::new(),
        outputs: Vec::new(),
        uniforms: Vec::new(),
    };

    for &(id, pointer_type, storage_class) in &module.variables {
        let Some(&type_id) = module.pointers.get(&pointer_type) else {
            continue;
        };
        let built_in = module.built_ins.contains(&id) || module.built_ins.contains(&type_id);
        let name = module.name(id);

        match storage_class {
            StorageClass::Input | StorageClass::Output if !built_in => {
                let ty = module
                    .glsl_type(type_id)
                    .ok_or_else(|| format!("stage variable '{name}' has an unsupported type"))?;
                let variable = Variable {
                    name,
                    ty,
                    location: module.locations.get(&id).copied(),
                };
                if storage_class == StorageClass::Input {
                    interface.inputs.push(variable);
                } else {
                    interface.outputs.push(variable);
                }
            }
            StorageClass::UniformConstant | StorageClass::Uniform => {
                // Members of a uniform block are reported without a prefix.
                let prefix = if module.blocks.contains(&type_id) { "" } else { name.as_str() };
                module.flatten_uniform(prefix, type_id, &mut interface.uniforms)?;
            }
            _ => {}
        }
    }
    Ok(interface)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(opcode: u16, operands: &[u32]) -> Vec<u32> {
        let mut words = vec![((operands.len() as u32 + 1) << 16) | u32::from(opcode)];
        words.extend_from_slice(operands);
        words
    }

    fn string(text: &str) -> Vec<u32> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize((bytes.len() / 4 + 1) * 4, 0);
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn module(body: &[Vec<u32>]) -> Vec<u32> {
        let mut words = vec![MAGIC, 0x0001_0000, 0, 100, 0];
        for instruction in body {
            words.extend_from_slice(instruction);
        }
        words
    }

    fn named(opcode: u16, head: &[u32], name: &str) -> Vec<u32> {
        instruction(opcode, &[head, string(name).as_slice()].concat())
    }

    #[test]
    fn struct_uniforms_flatten_by_member_name() {
        // %1 float, %2 vec3, %3 struct { vec3 position; float linear; }
        let body = vec![
            instruction(22, &[1, 32]),
            instruction(23, &[2, 1, 3]),
            instruction(30, &[3, 2, 1]),
            named(5, &[10], "light"),
            named(6, &[3, 0], "position"),
            named(6, &[3, 1], "linear"),
            instruction(32, &[4, 0, 3]),
            instruction(59, &[4, 10, 0]),
        ];
        let interface = reflect(ShaderStage::Fragment, &module(&body)).expect("reflect");
        assert_eq!(
            interface.uniforms,
            vec![
                ("light.position".to_string(), GlslType::Vec3),
                ("light.linear".to_string(), GlslType::Float),
            ]
        );
    }

    #[test]
    fn inputs_keep_their_locations_and_built_ins_are_skipped() {
        let body = vec![
            instruction(22, &[1, 32]),
            instruction(23, &[2, 1, 4]),
            instruction(32, &[3, 1, 2]),
            instruction(32, &[4, 3, 2]),
            named(5, &[10], "vPosition"),
            named(5, &[11], "gl_Position"),
            instruction(71, &[10, DECORATION_LOCATION, 2]),
            instruction(71, &[11, DECORATION_BUILT_IN, 0]),
            instruction(59, &[3, 10, 1]),
            instruction(59, &[4, 11, 3]),
        ];
        let interface = reflect(ShaderStage::Vertex, &module(&body)).expect("reflect");
        assert_eq!(
            interface.inputs,
            vec![Variable {
                name: "vPosition".to_string(),
                ty: GlslType::Vec4,
                location: Some(2),
            }]
        );
        assert!(interface.outputs.is_empty());
    }

    #[test]
    fn unsupported_uniform_type_is_rejected() {
        // uint uniform
        let body = vec![
            instruction(21, &[1, 32, 0]),
            instruction(32, &[2, 0, 1]),
            named(5, &[10], "count"),
            instruction(59, &[2, 10, 0]),
        ];
        let err = reflect(ShaderStage::Fragment, &module(&body)).unwrap_err();
        assert!(err.contains("count"));
    }

    #[test]
    fn truncated_module_is_rejected() {
        assert!(reflect(ShaderStage::Vertex, &[MAGIC, 0, 0]).is_err());
        let mut words = module(&[]);
        words.push(5 << 16 | 22);
        assert!(reflect(ShaderStage::Vertex, &words).is_err());
    }
}
