//! Wavefront OBJ loading into a flat, interleaved triangle list.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::error::LoadError;

/// Floats per interleaved vertex: position (3), normal (3), texcoord (2).
pub const FLOATS_PER_VERTEX: usize = 8;

/// One interleaved vertex record, laid out exactly as it is uploaded.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Non-indexed triangle list. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
}

impl Geometry {
    /// Builds geometry from whole triangles.
    pub fn from_triangles(triangles: impl IntoIterator<Item = [Vertex; 3]>) -> Self {
        Self {
            vertices: triangles.into_iter().flatten().collect(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The interleaved float view handed to the GPU.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Loads every model of an OBJ file into one triangle list. Faces are
/// triangulated and each corner is expanded to its own vertex; missing
/// normals and texture coordinates become zero.
pub fn load_geometry(path: impl AsRef<Path>) -> Result<Geometry, LoadError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
    };
    let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| match source {
        tobj::LoadError::OpenFileFailed => LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "cannot open OBJ file"),
        },
        source => LoadError::Obj {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut corners = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        for (corner, &index) in mesh.indices.iter().enumerate() {
            let position = read_attribute::<3>(&mesh.positions, index).ok_or_else(|| {
                LoadError::InvalidGeometry(format!(
                    "{}: position index {index} out of range in '{}'",
                    path.display(),
                    model.name
                ))
            })?;
            let normal = mesh
                .normal_indices
                .get(corner)
                .and_then(|&i| read_attribute::<3>(&mesh.normals, i))
                .unwrap_or_default();
            let tex_coord = mesh
                .texcoord_indices
                .get(corner)
                .and_then(|&i| read_attribute::<2>(&mesh.texcoords, i))
                .unwrap_or_default();
            corners.push(Vertex::new(position, normal, tex_coord));
        }
    }

    if corners.len() % 3 != 0 {
        return Err(LoadError::InvalidGeometry(format!(
            "{}: {} corners do not form whole triangles",
            path.display(),
            corners.len()
        )));
    }

    let geometry = Geometry { vertices: corners };
    log::debug!(
        "Loaded {} ({} triangles)",
        path.display(),
        geometry.triangle_count()
    );
    Ok(geometry)
}

fn read_attribute<const N: usize>(data: &[f32], index: u32) -> Option<[f32; N]> {
    let start = index as usize * N;
    data.get(start..start + N)?.try_into().ok()
}

/// Returns the first `mtllib` reference of an OBJ file, if any.
pub fn find_mtllib(path: impl AsRef<Path>) -> Result<Option<String>, LoadError> {
    let path = path.as_ref();
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);

    for line in reader.lines() {
        let line = line.map_err(io_error)?;
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("mtllib") {
            if let Some(name) = tokens.next() {
                return Ok(Some(name.to_string()));
            }
        }
    }
    Ok(None)
}
