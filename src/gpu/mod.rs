//! GPU abstraction: the [`GraphicsDevice`] trait, the upload protocols built
//! on it, and the CPU implementation used for rendering and tests.

pub mod device;
pub mod resources;
pub mod software;

pub use device::{
    BufferId, Capability, ClearFlags, GraphicsDevice, PixelFormat, Primitive, ProgramId,
    SamplerParams, ShaderStage, TextureFilter, TextureId, TextureWrap, UniformLocation,
    UniformValue, VertexArrayId, VertexAttribute,
};
pub use resources::{load_program, upload_geometry, upload_texture, GpuHandles, MeshHandles};
pub use software::{DrawStats, SoftwareDevice};
