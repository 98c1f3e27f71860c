//! CPU rasterization: clip-space clipping, edge-function triangle filling,
//! depth testing and pixel shading into a colour/depth target.

pub mod clipper;
pub mod framebuffer;
pub mod rasterizer;
pub mod shader;

pub use clipper::{ClipSpaceClipper, ClipSpacePolygon, ClipSpaceVertex};
pub use framebuffer::{FrameBuffer, RenderTarget};
pub use rasterizer::{EdgeFunctionRasterizer, ScreenVertex};
pub use shader::{PixelShader, TextureSampler};

// Varying layout written by the vertex stage: eye-space position, eye-space
// normal, raw colour attribute, texture coordinates.
pub const POSITION: usize = 0;
pub const NORMAL: usize = 3;
pub const COLOR: usize = 6;
pub const TEX_COORD: usize = 9;
pub const VARYING_COUNT: usize = 11;

/// Per-vertex outputs interpolated across a triangle.
pub type Varyings = [f32; VARYING_COUNT];
