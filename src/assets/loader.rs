//! Resolves and loads everything one ball needs from disk.

use std::path::PathBuf;

use crate::assets::material::{load_material, Material};
use crate::assets::obj::{find_mtllib, load_geometry, Geometry};
use crate::assets::texture::Texture;
use crate::config::AssetConfig;
use crate::error::LoadError;

/// Geometry, material and decoded texture of one ball.
#[derive(Clone, Debug)]
pub struct BallAssets {
    pub geometry: Geometry,
    pub material: Material,
    pub texture: Texture,
}

/// Looks models up under `model_dir`, and their material libraries and
/// textures under `texture_dir`.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    model_dir: PathBuf,
    texture_dir: PathBuf,
}

impl AssetLoader {
    pub fn new(model_dir: impl Into<PathBuf>, texture_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            texture_dir: texture_dir.into(),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(&config.model_dir, &config.texture_dir)
    }

    /// Loads `model_name`, then the material library it references first,
    /// then that material's diffuse texture.
    pub fn load_ball(&self, model_name: &str) -> Result<BallAssets, LoadError> {
        let model_path = self.model_dir.join(model_name);
        let geometry = load_geometry(&model_path)?;

        let library = find_mtllib(&model_path)?
            .ok_or_else(|| LoadError::MissingMaterialLibrary(model_path.clone()))?;
        let library_path = self.texture_dir.join(library);
        let material = load_material(&library_path)?;

        let texture_name = material
            .diffuse_map
            .as_deref()
            .ok_or_else(|| LoadError::MissingTexture(library_path.clone()))?;
        let texture = Texture::from_file(self.texture_dir.join(texture_name))?;

        Ok(BallAssets {
            geometry,
            material,
            texture,
        })
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::from_config(&AssetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bilhar-loader-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create fixture dir");
        dir
    }

    const TRIANGLE: &str = "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";

    #[test]
    fn loads_model_material_and_texture() {
        let dir = fixture_dir("complete");
        std::fs::write(dir.join("tri.obj"), TRIANGLE).expect("write obj");
        std::fs::write(dir.join("tri.mtl"), "Ns 32\nKd 1 0 0\nmap_Kd tri.png\n").expect("write mtl");
        RgbImage::new(2, 2).save(dir.join("tri.png")).expect("write png");

        let assets = AssetLoader::new(&dir, &dir).load_ball("tri.obj").expect("load");
        assert_eq!(assets.geometry.triangle_count(), 1);
        assert_eq!(assets.material.shininess, 32.0);
        assert_eq!(assets.texture.width(), 2);
    }

    #[test]
    fn model_without_mtllib_is_rejected() {
        let dir = fixture_dir("no-mtllib");
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").expect("write obj");

        let err = AssetLoader::new(&dir, &dir).load_ball("tri.obj").unwrap_err();
        assert!(matches!(err, LoadError::MissingMaterialLibrary(_)));
    }

    #[test]
    fn material_without_texture_is_rejected() {
        let dir = fixture_dir("no-texture");
        std::fs::write(dir.join("tri.obj"), TRIANGLE).expect("write obj");
        std::fs::write(dir.join("tri.mtl"), "Ns 32\n").expect("write mtl");

        let err = AssetLoader::new(&dir, &dir).load_ball("tri.obj").unwrap_err();
        assert!(matches!(err, LoadError::MissingTexture(_)));
    }

    #[test]
    fn missing_model_is_an_error() {
        let dir = fixture_dir("missing");
        assert!(AssetLoader::new(&dir, &dir).load_ball("Ball99.obj").is_err());
    }
}
