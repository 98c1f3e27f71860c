//! The table: an untextured box with one flat colour per face.

use crate::assets::{Geometry, Vertex};
use crate::gpu::{upload_geometry, GraphicsDevice, MeshHandles, Primitive};
use crate::math::Vec3;
use crate::scene::shader_state::ShaderState;

/// Half size of the table box on each axis.
pub const TABLE_HALF_EXTENTS: Vec3 = Vec3::new(1.25, 0.25, 1.25);

pub const TABLE_VERTEX_COUNT: usize = 36;

/// Face colours in face order: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_COLORS: [Vec3; 6] = [
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
];

// Corner signs of each face as (a, b, c, d); the face is split into the
// triangles (a, b, c) and (c, b, d), counter-clockwise seen from outside.
const FACES: [[[f32; 3]; 4]; 6] = [
    [[1., -1., 1.], [1., -1., -1.], [1., 1., 1.], [1., 1., -1.]],
    [[-1., -1., -1.], [-1., -1., 1.], [-1., 1., -1.], [-1., 1., 1.]],
    [[-1., 1., 1.], [1., 1., 1.], [-1., 1., -1.], [1., 1., -1.]],
    [[-1., -1., -1.], [1., -1., -1.], [-1., -1., 1.], [1., -1., 1.]],
    [[-1., -1., 1.], [1., -1., 1.], [-1., 1., 1.], [1., 1., 1.]],
    [[1., -1., -1.], [-1., -1., -1.], [1., 1., -1.], [-1., 1., -1.]],
];

/// The table box. The normal slot of every vertex carries its face colour
/// and the texture coordinates are zero.
pub fn table_geometry() -> Geometry {
    let h = TABLE_HALF_EXTENTS;
    Geometry::from_triangles(FACES.iter().zip(FACE_COLORS).flat_map(|(corners, color)| {
        let vertex = |i: usize| {
            let [sx, sy, sz] = corners[i];
            Vertex::new([sx * h.x, sy * h.y, sz * h.z], color.to_array(), [0.0, 0.0])
        };
        [[vertex(0), vertex(1), vertex(2)], [vertex(2), vertex(1), vertex(3)]]
    }))
}

#[derive(Debug, Default)]
pub struct Table {
    mesh: Option<MeshHandles>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self) -> Option<MeshHandles> {
        self.mesh
    }

    pub fn send<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) {
        if self.mesh.is_some() {
            log::warn!("Table is already on the GPU");
            return;
        }
        self.mesh = Some(upload_geometry(device, &table_geometry()));
    }

    pub fn draw<D: GraphicsDevice + ?Sized>(&self, device: &mut D, state: &mut ShaderState) {
        let Some(mesh) = self.mesh else {
            return;
        };
        let model_view = state.view * state.model.translate(Vec3::ZERO);
        state.set_mat4(device, "ModelView", &model_view);
        state.set_int(device, "isRenderTexture", 0);

        device.bind_vertex_array(Some(mesh.vertex_array));
        device.draw_arrays(Primitive::Triangles, 0, mesh.vertex_count);
    }

    pub fn release<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) {
        if let Some(mesh) = self.mesh.take() {
            mesh.release(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FLOATS_PER_VERTEX;

    #[test]
    fn table_is_twelve_triangles_of_eight_floats() {
        let geometry = table_geometry();
        assert_eq!(geometry.vertex_count(), TABLE_VERTEX_COUNT);
        assert_eq!(geometry.as_floats().len(), TABLE_VERTEX_COUNT * FLOATS_PER_VERTEX);
        assert_eq!(geometry.triangle_count(), 12);
    }

    #[test]
    fn faces_wind_outwards() {
        let geometry = table_geometry();
        for triangle in geometry.vertices().chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(triangle[i].position));
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) > 0.0, "inward triangle at {centre:?}");
        }
    }

    #[test]
    fn each_face_has_one_colour() {
        let geometry = table_geometry();
        for (face, vertices) in geometry.vertices().chunks_exact(6).enumerate() {
            for vertex in vertices {
                assert_eq!(vertex.normal, FACE_COLORS[face].to_array());
                assert_eq!(vertex.tex_coord, [0.0, 0.0]);
            }
        }
    }
}
