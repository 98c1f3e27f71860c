//! Upload protocols: geometry into a vertex array, textures onto units, and
//! shader sources into a program.

use std::path::Path;

use crate::assets::{Geometry, Texture, FLOATS_PER_VERTEX};
use crate::error::ShaderError;
use crate::gpu::device::{
    BufferId, GraphicsDevice, ProgramId, SamplerParams, ShaderStage, TextureFilter, TextureId,
    TextureWrap, VertexArrayId, VertexAttribute,
};

/// Attribute slots of the interleaved vertex layout.
pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TEX_COORD_LOCATION: u32 = 2;

/// The interleaved layout: position, normal, then texcoord, 8 floats apart.
pub const VERTEX_LAYOUT: [VertexAttribute; 3] = [
    VertexAttribute {
        location: POSITION_LOCATION,
        components: 3,
        stride: FLOATS_PER_VERTEX,
        offset: 0,
    },
    VertexAttribute {
        location: NORMAL_LOCATION,
        components: 3,
        stride: FLOATS_PER_VERTEX,
        offset: 3,
    },
    VertexAttribute {
        location: TEX_COORD_LOCATION,
        components: 2,
        stride: FLOATS_PER_VERTEX,
        offset: 6,
    },
];

/// Vertex array and buffer holding one uploaded [`Geometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshHandles {
    pub vertex_array: VertexArrayId,
    pub buffer: BufferId,
    pub vertex_count: usize,
}

impl MeshHandles {
    pub fn release<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        device.delete_vertex_array(self.vertex_array);
        device.delete_buffer(self.buffer);
    }
}

/// Everything a ball owns on the GPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuHandles {
    pub mesh: MeshHandles,
    pub texture: TextureId,
}

impl GpuHandles {
    pub fn release<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        self.mesh.release(device);
        device.delete_texture(self.texture);
    }
}

/// Creates and binds a vertex array and buffer, stores the vertices, and
/// declares [`VERTEX_LAYOUT`] on it. Leaves no vertex array or buffer bound.
pub fn upload_geometry<D: GraphicsDevice + ?Sized>(device: &mut D, geometry: &Geometry) -> MeshHandles {
    let vertex_array = device.create_vertex_array();
    device.bind_vertex_array(Some(vertex_array));

    let buffer = device.create_buffer();
    device.bind_array_buffer(Some(buffer));
    device.buffer_storage(geometry.as_floats());

    for attribute in VERTEX_LAYOUT {
        device.vertex_attrib_pointer(attribute);
        device.enable_vertex_attrib(attribute.location);
    }

    device.bind_vertex_array(None);
    device.bind_array_buffer(None);

    log::debug!(
        "Uploaded {} vertices into vertex array {}",
        geometry.vertex_count(),
        vertex_array.get()
    );
    MeshHandles {
        vertex_array,
        buffer,
        vertex_count: geometry.vertex_count(),
    }
}

/// Sampling used for ball textures: repeat on both axes, linear filtering.
pub const BALL_SAMPLER: SamplerParams = SamplerParams {
    wrap_s: TextureWrap::Repeat,
    wrap_t: TextureWrap::Repeat,
    min_filter: TextureFilter::Linear,
    mag_filter: TextureFilter::Linear,
};

/// Creates a texture on `unit`, uploads `texture` and builds its mipmaps.
/// The texture stays bound to `unit`.
pub fn upload_texture<D: GraphicsDevice + ?Sized>(device: &mut D, unit: u32, texture: &Texture) -> TextureId {
    let id = device.create_texture();
    device.active_texture(unit);
    device.bind_texture(Some(id));
    device.texture_parameters(BALL_SAMPLER);
    device.tex_image_2d(texture.width(), texture.height(), texture.format(), texture.pixels());
    device.generate_mipmap();

    log::debug!(
        "Uploaded {}x{} texture {} to unit {unit}",
        texture.width(),
        texture.height(),
        id.get()
    );
    id
}

/// Reads both shader files and builds a program from them.
pub fn load_program<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<ProgramId, ShaderError> {
    let read = |path: &Path| {
        std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    };
    let vertex = read(vertex_path)?;
    let fragment = read(fragment_path)?;

    let program = device.create_program(&[
        (ShaderStage::Vertex, vertex.as_str()),
        (ShaderStage::Fragment, fragment.as_str()),
    ])?;
    log::info!(
        "Linked program {} from {} and {}",
        program.get(),
        vertex_path.display(),
        fragment_path.display()
    );
    Ok(program)
}
