//! Clip-space clipping against the homogeneous clip cube.
//!
//! Clipping occurs after projection, before the perspective divide. The clip
//! volume is:
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w
//! ```
//!
//! Polygons are clipped with Sutherland-Hodgman one plane at a time, then
//! fan-triangulated for rasterization.

use super::{Varyings, VARYING_COUNT};
use crate::math::Vec4;

/// A vertex in homogeneous clip space with its interpolatable outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipSpaceVertex {
    /// Position in clip space (x, y, z, w) - before perspective divide
    pub position: Vec4,
    pub varyings: Varyings,
}

impl ClipSpaceVertex {
    pub fn new(position: Vec4, varyings: Varyings) -> Self {
        Self { position, varyings }
    }

    /// Linearly interpolate all attributes between two vertices.
    /// Used when a polygon edge crosses a clipping plane.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut varyings = [0.0; VARYING_COUNT];
        for (i, value) in varyings.iter_mut().enumerate() {
            *value = self.varyings[i] + (other.varyings[i] - self.varyings[i]) * t;
        }
        Self {
            position: self.position.lerp(other.position, t),
            varyings,
        }
    }
}

/// The 6 planes of the canonical clip-space cube.
#[derive(Clone, Copy, Debug)]
pub enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Positive inside the clip volume, negative outside.
    pub fn signed_distance(&self, v: &ClipSpaceVertex) -> f32 {
        let p = v.position;
        match self {
            Self::Left => p.w + p.x,
            Self::Right => p.w - p.x,
            Self::Bottom => p.w + p.y,
            Self::Top => p.w - p.y,
            Self::Near => p.w + p.z,
            Self::Far => p.w - p.z,
        }
    }
}

/// A convex polygon in clip space.
#[derive(Clone, Debug, Default)]
pub struct ClipSpacePolygon {
    pub vertices: Vec<ClipSpaceVertex>,
}

impl ClipSpacePolygon {
    pub fn from_triangle(v0: ClipSpaceVertex, v1: ClipSpaceVertex, v2: ClipSpaceVertex) -> Self {
        Self {
            vertices: vec![v0, v1, v2],
        }
    }

    /// Returns true if the polygon has been completely clipped away.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// True when every vertex is inside every plane, so clipping is a no-op.
    pub fn is_inside(&self) -> bool {
        self.vertices.iter().all(|v| {
            ClipPlane::ALL
                .iter()
                .all(|plane| plane.signed_distance(v) >= 0.0)
        })
    }

    /// Clip this polygon against a single plane.
    pub fn clip_against_plane(&self, plane: ClipPlane) -> Self {
        if self.is_empty() {
            return Self::default();
        }

        let mut output = Vec::with_capacity(self.vertices.len() + 1);

        for (i, current) in self.vertices.iter().enumerate() {
            let next = &self.vertices[(i + 1) % self.vertices.len()];

            let d1 = plane.signed_distance(current);
            let d2 = plane.signed_distance(next);

            if d1 >= 0.0 {
                output.push(*current);
                if d2 < 0.0 {
                    output.push(current.lerp(next, d1 / (d1 - d2)));
                }
            } else if d2 >= 0.0 {
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        }

        Self { vertices: output }
    }

    /// Fan-triangulates the (convex) polygon.
    pub fn triangulate(
        &self,
    ) -> impl Iterator<Item = (&ClipSpaceVertex, &ClipSpaceVertex, &ClipSpaceVertex)> {
        (1..self.vertices.len().saturating_sub(1))
            .map(move |i| (&self.vertices[0], &self.vertices[i], &self.vertices[i + 1]))
    }
}

/// Clips polygons against all six planes of the clip cube.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClipSpaceClipper;

impl ClipSpaceClipper {
    pub fn new() -> Self {
        Self
    }

    /// Returns the clipped polygon, which may be empty if the original
    /// polygon was entirely outside the clip volume.
    pub fn clip_polygon(&self, polygon: ClipSpacePolygon) -> ClipSpacePolygon {
        if polygon.is_inside() {
            return polygon;
        }
        let mut result = polygon;
        for plane in ClipPlane::ALL {
            if result.is_empty() {
                break;
            }
            result = result.clip_against_plane(plane);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, z: f32, tag: f32) -> ClipSpaceVertex {
        let mut varyings = [0.0; VARYING_COUNT];
        varyings[0] = tag;
        ClipSpaceVertex::new(Vec4::new(x, y, z, 1.0), varyings)
    }

    #[test]
    fn inside_triangle_is_untouched() {
        let polygon = ClipSpacePolygon::from_triangle(
            vertex(-0.5, -0.5, 0.0, 0.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 2.0),
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(polygon);
        assert_eq!(clipped.vertices.len(), 3);
        assert_eq!(clipped.triangulate().count(), 1);
    }

    #[test]
    fn fully_outside_triangle_is_discarded() {
        let polygon = ClipSpacePolygon::from_triangle(
            vertex(2.0, 2.0, 0.0, 0.0),
            vertex(3.0, 2.0, 0.0, 0.0),
            vertex(2.5, 3.0, 0.0, 0.0),
        );
        assert!(ClipSpaceClipper::new().clip_polygon(polygon).is_empty());
    }

    #[test]
    fn crossing_right_plane_adds_a_vertex_and_interpolates_varyings() {
        let polygon = ClipSpacePolygon::from_triangle(
            vertex(0.0, -0.5, 0.0, 0.0),
            vertex(2.0, -0.5, 0.0, 2.0),
            vertex(0.0, 0.5, 0.0, 0.0),
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(polygon);
        assert_eq!(clipped.vertices.len(), 4);
        assert_eq!(clipped.triangulate().count(), 2);
        for v in &clipped.vertices {
            assert!(v.position.x <= 1.0 + 1e-6);
        }
        // The point where the bottom edge leaves x = 1 is halfway along it.
        let on_plane = clipped
            .vertices
            .iter()
            .find(|v| (v.position.x - 1.0).abs() < 1e-6 && (v.position.y + 0.5).abs() < 1e-6)
            .expect("intersection vertex");
        assert_relative_eq!(on_plane.varyings[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn vertices_behind_the_near_plane_are_clipped() {
        let mut behind = vertex(0.0, 0.0, -3.0, 0.0);
        behind.position.w = 1.0;
        let polygon = ClipSpacePolygon::from_triangle(
            vertex(-0.5, 0.0, 0.0, 0.0),
            vertex(0.5, 0.0, 0.0, 0.0),
            behind,
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(polygon);
        assert!(!clipped.is_empty());
        for v in &clipped.vertices {
            assert!(v.position.z >= -v.position.w - 1e-6);
        }
    }
}
