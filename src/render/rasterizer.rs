//! Edge function-based triangle rasterization.
//!
//! For an edge from point A to point B, the edge function at point P is:
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! A pixel centre is covered when all three edge functions share the sign of
//! the triangle's signed area, so both windings rasterize. The normalized
//! edge values are the barycentric weights of the pixel.
//!
//! Depth is affine in screen space and is interpolated directly. Varyings are
//! not: each vertex carries `varying / w` and `1 / w`, and the pixel's value
//! is recovered as `sum(l_i * v_i / w_i) / sum(l_i / w_i)`.

use super::framebuffer::FrameBuffer;
use super::shader::PixelShader;
use super::{Varyings, VARYING_COUNT};

/// A vertex after the perspective divide and viewport transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates, origin at the top-left corner.
    pub x: f32,
    pub y: f32,
    /// Window-space depth in [0, 1].
    pub depth: f32,
    /// Reciprocal of the clip-space w.
    pub inv_w: f32,
    /// Varyings pre-multiplied by `inv_w`.
    pub varyings_over_w: Varyings,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, depth: f32, w: f32, varyings: &Varyings) -> Self {
        let inv_w = 1.0 / w;
        let mut varyings_over_w = [0.0; VARYING_COUNT];
        for (out, value) in varyings_over_w.iter_mut().zip(varyings.iter()) {
            *out = value * inv_w;
        }
        Self {
            x,
            y,
            depth,
            inv_w,
            varyings_over_w,
        }
    }
}

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates over the triangle's bounding box, clipped to the frame buffer,
/// and runs the pixel shader for every covered pixel that survives the depth
/// test.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        EdgeFunctionRasterizer
    }

    #[inline]
    fn edge_function(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
        (px - ax) * (by - ay) - (py - ay) * (bx - ax)
    }

    /// Fills one triangle and returns how many fragments were written.
    pub fn fill_triangle<S: PixelShader>(
        &self,
        vertices: &[ScreenVertex; 3],
        buffer: &mut FrameBuffer,
        shader: &S,
        depth_test: bool,
    ) -> usize {
        let [v0, v1, v2] = vertices;

        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(buffer.width() as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(buffer.height() as i32 - 1);

        let area = Self::edge_function(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
        if area.abs() < f32::EPSILON {
            return 0;
        }
        let inv_area = 1.0 / area;

        let mut written = 0;
        let mut varyings = [0.0; VARYING_COUNT];

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let w0 = Self::edge_function(v1.x, v1.y, v2.x, v2.y, px, py);
                let w1 = Self::edge_function(v2.x, v2.y, v0.x, v0.y, px, py);
                let w2 = Self::edge_function(v0.x, v0.y, v1.x, v1.y, px, py);

                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if !inside {
                    continue;
                }

                let l = [w0 * inv_area, w1 * inv_area, w2 * inv_area];
                let depth = l[0] * v0.depth + l[1] * v1.depth + l[2] * v2.depth;
                if depth_test && !buffer.depth_passes(x, y, depth) {
                    continue;
                }

                let inv_w = l[0] * v0.inv_w + l[1] * v1.inv_w + l[2] * v2.inv_w;
                let w = 1.0 / inv_w;
                for (i, value) in varyings.iter_mut().enumerate() {
                    *value = (l[0] * v0.varyings_over_w[i]
                        + l[1] * v1.varyings_over_w[i]
                        + l[2] * v2.varyings_over_w[i])
                        * w;
                }

                let color = shader.shade(&varyings);
                if depth_test {
                    buffer.write_fragment(x, y, depth, color);
                } else {
                    buffer.set_pixel(x, y, color);
                }
                written += 1;
            }
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::framebuffer::RenderTarget;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    struct Solid(u32);

    impl PixelShader for Solid {
        fn shade(&self, _varyings: &Varyings) -> u32 {
            self.0
        }
    }

    /// Records the first varying of every shaded pixel.
    struct Recorder(RefCell<Vec<f32>>);

    impl PixelShader for Recorder {
        fn shade(&self, varyings: &Varyings) -> u32 {
            self.0.borrow_mut().push(varyings[0]);
            0
        }
    }

    fn screen(x: f32, y: f32, depth: f32) -> ScreenVertex {
        ScreenVertex::new(x, y, depth, 1.0, &[0.0; VARYING_COUNT])
    }

    #[test]
    fn covers_pixels_inside_either_winding() {
        let rasterizer = EdgeFunctionRasterizer::new();
        for tri in [
            [screen(0.0, 0.0, 0.5), screen(8.0, 0.0, 0.5), screen(0.0, 8.0, 0.5)],
            [screen(0.0, 0.0, 0.5), screen(0.0, 8.0, 0.5), screen(8.0, 0.0, 0.5)],
        ] {
            let mut target = RenderTarget::new(8, 8);
            let mut fb = target.as_framebuffer();
            let written = rasterizer.fill_triangle(&tri, &mut fb, &Solid(7), true);
            assert!(written > 20);
            assert_eq!(fb.get_pixel(1, 1), Some(7));
            assert_eq!(fb.get_pixel(7, 7), Some(0));
        }
    }

    #[test]
    fn degenerate_triangle_writes_nothing() {
        let mut target = RenderTarget::new(4, 4);
        let mut fb = target.as_framebuffer();
        let tri = [screen(0.0, 0.0, 0.5), screen(2.0, 2.0, 0.5), screen(4.0, 4.0, 0.5)];
        assert_eq!(
            EdgeFunctionRasterizer::new().fill_triangle(&tri, &mut fb, &Solid(1), true),
            0
        );
    }

    #[test]
    fn depth_test_keeps_the_nearest_surface() {
        let rasterizer = EdgeFunctionRasterizer::new();
        let mut target = RenderTarget::new(4, 4);
        let mut fb = target.as_framebuffer();
        let near = [screen(0.0, 0.0, 0.2), screen(8.0, 0.0, 0.2), screen(0.0, 8.0, 0.2)];
        let far = [screen(0.0, 0.0, 0.8), screen(8.0, 0.0, 0.8), screen(0.0, 8.0, 0.8)];

        rasterizer.fill_triangle(&near, &mut fb, &Solid(1), true);
        assert_eq!(rasterizer.fill_triangle(&far, &mut fb, &Solid(2), true), 0);
        assert_eq!(fb.get_pixel(0, 0), Some(1));

        // Without the test, later triangles overwrite.
        rasterizer.fill_triangle(&far, &mut fb, &Solid(2), false);
        assert_eq!(fb.get_pixel(0, 0), Some(2));
    }

    #[test]
    fn varyings_are_perspective_correct() {
        // Left edge at w = 1 carries 0, right edge at w = 3 carries 1. Halfway
        // across the screen the perspective-correct value is 1/4, not 1/2.
        let mut left = [0.0; VARYING_COUNT];
        let mut right = [0.0; VARYING_COUNT];
        left[0] = 0.0;
        right[0] = 1.0;
        let tri = [
            ScreenVertex::new(0.0, 0.0, 0.5, 1.0, &left),
            ScreenVertex::new(64.0, 0.0, 0.5, 3.0, &right),
            ScreenVertex::new(0.0, 64.0, 0.5, 1.0, &left),
        ];
        let recorder = Recorder(RefCell::new(Vec::new()));
        let mut target = RenderTarget::new(64, 64);
        let mut fb = target.as_framebuffer();
        EdgeFunctionRasterizer::new().fill_triangle(&tri, &mut fb, &recorder, false);

        // Row 0, pixel 31: x = 31.5, nearly halfway along the top edge.
        let values = recorder.0.borrow();
        let value = values[31];
        let t = 31.5 / 64.0;
        let expected = (t / 3.0) / ((1.0 - t) + t / 3.0);
        assert_relative_eq!(value, expected, epsilon = 1e-3);
        assert!(value < 0.3);
    }
}
