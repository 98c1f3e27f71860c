//! The GPU as the scene sees it.
//!
//! [`GraphicsDevice`] mirrors the slice of a bind-to-edit graphics API the
//! scene needs: vertex arrays, immutable buffers, texture units, linked
//! programs with named uniforms, and non-indexed draws. Like that API, it
//! holds binding state between calls and does not report misuse as errors;
//! only program creation can fail.

use std::fmt;
use std::num::NonZeroU32;

use crate::error::ShaderError;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl From<NonZeroU32> for $name {
            fn from(raw: NonZeroU32) -> Self {
                Self(raw)
            }
        }
    };
}

gpu_handle!(
    /// Name of a vertex array object.
    VertexArrayId
);
gpu_handle!(
    /// Name of a vertex buffer.
    BufferId
);
gpu_handle!(
    /// Name of a texture object.
    TextureId
);
gpu_handle!(
    /// Name of a linked program.
    ProgramId
);

/// Location of an active uniform within one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// A value for a single uniform. Matrices are column after column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// Layout of the texel data handed to [`GraphicsDevice::tex_image_2d`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Four channels are RGBA; anything else is read as RGB.
    pub fn from_channels(channels: u8) -> Self {
        if channels == 4 {
            PixelFormat::Rgba
        } else {
            PixelFormat::Rgb
        }
    }

    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureWrap {
    #[default]
    Repeat,
    ClampToEdge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// Sampling state of the texture bound to the active unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerParams {
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
}

/// Float attribute read from the bound array buffer. `stride` and `offset`
/// count floats, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: usize,
    pub stride: usize,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    CullFace,
}

bitflags::bitflags! {
    /// Buffers reset by [`GraphicsDevice::clear`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1;
        const DEPTH = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

pub trait GraphicsDevice {
    // ============ Vertex arrays & buffers ============

    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    fn create_buffer(&mut self) -> BufferId;
    fn bind_array_buffer(&mut self, buffer: Option<BufferId>);
    /// Gives the bound array buffer its immutable contents.
    fn buffer_storage(&mut self, data: &[f32]);
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Records `attribute` on the bound vertex array, sourcing from the
    /// currently bound array buffer.
    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute);
    fn enable_vertex_attrib(&mut self, location: u32);

    // ============ Textures ============

    fn create_texture(&mut self) -> TextureId;
    fn active_texture(&mut self, unit: u32);
    /// Binds to the active unit.
    fn bind_texture(&mut self, texture: Option<TextureId>);
    fn texture_parameters(&mut self, params: SamplerParams);
    /// Replaces level 0 of the bound texture. Storage is always RGBA.
    fn tex_image_2d(&mut self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]);
    fn generate_mipmap(&mut self);
    fn delete_texture(&mut self, texture: TextureId);

    // ============ Programs ============

    fn create_program(&mut self, sources: &[(ShaderStage, &str)])
        -> Result<ProgramId, ShaderError>;
    fn use_program(&mut self, program: Option<ProgramId>);
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn program_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue);
    fn delete_program(&mut self, program: ProgramId);

    // ============ Frame ============

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn enable(&mut self, capability: Capability);
    fn clear(&mut self, flags: ClearFlags);
    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize);
}
