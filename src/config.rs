//! Scene configuration, loaded from an optional TOML file.
//!
//! Every field falls back to its default, so a partial file only overrides
//! what it names:
//!
//! ```toml
//! [window]
//! width = 1024
//! height = 768
//!
//! [camera]
//! zoom_speed = 0.2
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::math::Vec3;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Bilhar".to_string(),
            width: 800,
            height: 600,
            target_fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub model_dir: PathBuf,
    pub texture_dir: PathBuf,
    /// File name of ball `n`; `{}` is replaced with the 1-based ball id.
    pub model_pattern: String,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

impl AssetConfig {
    pub fn model_name(&self, id: u32) -> String {
        self.model_pattern.replace("{}", &id.to_string())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("textures"),
            texture_dir: PathBuf::from("textures"),
            model_pattern: "Ball{}.obj".to_string(),
            vertex_shader: PathBuf::from("shaders/pool.vert"),
            fragment_shader: PathBuf::from("shaders/pool.frag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Degrees of rotation per pixel of pointer travel.
    pub look_sensitivity: f32,
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            look_sensitivity: 1.0,
            zoom_speed: 0.1,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Index into the ball list of the ball that moves.
    pub ball_index: usize,
    /// Translation added to the ball each frame.
    pub step: [f32; 3],
    /// Degrees added to every orientation axis each frame.
    pub spin: f32,
    pub ball_radius: f32,
    pub table_half_extent: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            ball_index: 4,
            step: [0.001, 0.0, 0.001],
            spin: 2.0,
            ball_radius: 0.08,
            table_half_extent: 1.25,
        }
    }
}

impl SceneConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Loads `path` if it exists, otherwise returns the defaults. A file that
    /// exists but fails to parse is reported and ignored.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Ignoring {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_pool_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.window.title, "Bilhar");
        assert_eq!((config.window.width, config.window.height), (800, 600));
        assert_eq!(config.camera.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(config.animation.ball_index, 4);
        assert_eq!(config.assets.model_name(1), "Ball1.obj");
        assert_eq!(config.assets.model_name(15), "Ball15.obj");
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = SceneConfig::from_toml(
            r#"
            [window]
            width = 1024

            [camera]
            zoom_speed = 0.25
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.zoom_speed, 0.25);
        assert_eq!(config.animation, AnimationConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SceneConfig::from_toml("[window\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SceneConfig::load_or_default("definitely/not/here/pool.toml");
        assert_eq!(config, SceneConfig::default());
    }
}
