//! Error types shared across the crate.

use std::path::PathBuf;

use crate::gpu::ShaderStage;

/// Failure while reading a ball's model, material or texture from disk.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OBJ file {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file {0} does not reference a material library")]
    MissingMaterialLibrary(PathBuf),

    #[error("material library {0} has no diffuse texture (map_Kd)")]
    MissingTexture(PathBuf),

    #[error("failed to decode texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid texture: {0}")]
    InvalidTexture(String),
}

/// Failure while building the shader program. Fatal for the scene.
#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("I/O error reading shader {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link: {0}")]
    Link(String),
}

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}
