//! Wavefront MTL parsing, reduced to the Phong terms the scene shades with.

use std::path::Path;

use crate::error::LoadError;
use crate::math::Vec3;

/// Phong material of a single ball.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Specular exponent (Ns).
    pub shininess: f32,
    /// Ambient reflectance (Ka).
    pub ambient: Vec3,
    /// Diffuse reflectance (Kd).
    pub diffuse: Vec3,
    /// Specular reflectance (Ks).
    pub specular: Vec3,
    /// Diffuse texture file name (map_Kd).
    pub diffuse_map: Option<String>,
}

/// Parses MTL text. Unknown keys, blank lines and `#` comments are skipped;
/// a malformed value is logged and ignored. When a key repeats, the last
/// occurrence wins.
pub fn parse_material(contents: &str) -> Material {
    let mut material = Material::default();

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };

        match command {
            "Ns" => {
                if let Some(value) = parse_f32(&mut tokens, line_num, command) {
                    material.shininess = value;
                }
            }
            "Ka" => {
                if let Some(value) = parse_vec3(&mut tokens, line_num, command) {
                    material.ambient = value;
                }
            }
            "Kd" => {
                if let Some(value) = parse_vec3(&mut tokens, line_num, command) {
                    material.diffuse = value;
                }
            }
            "Ks" => {
                if let Some(value) = parse_vec3(&mut tokens, line_num, command) {
                    material.specular = value;
                }
            }
            "map_Kd" => {
                // Options such as `-s 1 1 1` may precede the file name.
                match tokens.last() {
                    Some(name) => material.diffuse_map = Some(name.to_string()),
                    None => log::warn!("MTL line {}: map_Kd without a file name", line_num + 1),
                }
            }
            _ => {}
        }
    }

    material
}

/// Reads and parses an MTL file.
pub fn load_material(path: impl AsRef<Path>) -> Result<Material, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_material(&contents))
}

fn parse_f32<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line_num: usize,
    key: &str,
) -> Option<f32> {
    let parsed = tokens.next().and_then(|t| t.parse::<f32>().ok());
    if parsed.is_none() {
        log::warn!("MTL line {}: malformed {key} value ignored", line_num + 1);
    }
    parsed
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line_num: usize,
    key: &str,
) -> Option<Vec3> {
    let mut values = [0.0; 3];
    for value in values.iter_mut() {
        *value = tokens.next().and_then(|t| t.parse::<f32>().ok()).or_else(|| {
            log::warn!("MTL line {}: malformed {key} value ignored", line_num + 1);
            None
        })?;
    }
    Some(Vec3::from_array(values))
}
