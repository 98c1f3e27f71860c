//! A pool table scene: fifteen textured balls on a coloured table, four
//! switchable lights, mouse camera control and a one-shot ball animation.
//!
//! The scene talks to the GPU through the [`gpu::GraphicsDevice`] trait.
//! [`gpu::SoftwareDevice`] implements it on the CPU, and the SDL2 window
//! (behind the `window` feature) shows its colour buffer.
//!
//! # Quick Start
//!
//! ```ignore
//! use bilhar::prelude::*;
//!
//! let config = SceneConfig::default();
//! let mut scene = PoolScene::new(SoftwareDevice::new(800, 600), &config)?;
//! scene.handle_input(&InputEvent::Char('3'));
//! scene.display();
//! ```

pub mod assets;
pub mod camera;
pub mod colors;
pub mod config;
pub mod error;
pub mod gpu;
pub mod input;
pub mod math;
pub mod projection;
pub mod scene;
#[cfg(feature = "window")]
pub mod window;

pub(crate) mod render;

pub use error::{ConfigError, LoadError, ShaderError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assets::{AssetLoader, Geometry, Material, Texture};
    pub use crate::camera::CameraController;
    pub use crate::config::SceneConfig;
    pub use crate::gpu::{GraphicsDevice, SoftwareDevice};
    pub use crate::input::InputEvent;
    pub use crate::math::{Mat3, Mat4, Vec3, Vec4};
    pub use crate::projection::Projection;
    pub use crate::scene::{AnimationState, Ball, BallId, LightingModel, PoolScene};

    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::shader::{PixelShader, VertexColorShader};
    pub use crate::render::{
        ClipSpaceClipper, ClipSpacePolygon, ClipSpaceVertex, EdgeFunctionRasterizer, FrameBuffer,
        RenderTarget, ScreenVertex, Varyings, COLOR, VARYING_COUNT,
    };
}
