//! Loading of ball models, materials and textures from disk.

pub mod loader;
pub mod material;
pub mod obj;
pub mod texture;

pub use loader::{AssetLoader, BallAssets};
pub use material::Material;
pub use obj::{Geometry, Vertex, FLOATS_PER_VERTEX};
pub use texture::Texture;
