//! 4x4 transformation matrix using the column-vector convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - Rotations are right-handed: a positive angle turns counter-clockwise
//!   when looking down the axis towards the origin
//!
//! The post-multiplying helpers ([`Mat4::translate`], [`Mat4::rotate`],
//! [`Mat4::scale`]) follow the usual OpenGL math-library semantics: the new
//! transform is applied to vertices *before* the existing one.

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// 4x4 matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const ZERO: Self = Self {
        data: [[0.0; 4]; 4],
    };

    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub const fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Builds a matrix from 16 floats laid out column after column, the order
    /// graphics APIs upload matrices in.
    pub fn from_cols_array(cols: &[f32; 16]) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (col, chunk) in cols.chunks_exact(4).enumerate() {
            for (row, value) in chunk.iter().enumerate() {
                data[row][col] = *value;
            }
        }
        Mat4 { data }
    }

    /// Flattens the matrix column after column.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = self.data[row][col];
            }
        }
        out
    }

    pub fn column(&self, col: usize) -> Vec4 {
        Vec4::new(
            self.data[0][col],
            self.data[1][col],
            self.data[2][col],
            self.data[3][col],
        )
    }

    /// Creates a translation matrix.
    pub fn translation(offset: Vec3) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, offset.x],
            [0.0, 1.0, 0.0, offset.y],
            [0.0, 0.0, 1.0, offset.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(factors: Vec3) -> Self {
        Mat4::new([
            [factors.x, 0.0, 0.0, 0.0],
            [0.0, factors.y, 0.0, 0.0],
            [0.0, 0.0, factors.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation of `angle` radians around an arbitrary `axis`.
    ///
    /// The axis does not need to be normalized. A zero axis yields the identity.
    pub fn rotation(angle: f32, axis: Vec3) -> Self {
        let a = axis.normalize_or_zero();
        if a == Vec3::ZERO {
            return Self::identity();
        }
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Mat4::new([
            [
                c + a.x * a.x * t,
                a.x * a.y * t - a.z * s,
                a.x * a.z * t + a.y * s,
                0.0,
            ],
            [
                a.y * a.x * t + a.z * s,
                c + a.y * a.y * t,
                a.y * a.z * t - a.x * s,
                0.0,
            ],
            [
                a.z * a.x * t - a.y * s,
                a.z * a.y * t + a.x * s,
                c + a.z * a.z * t,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the X axis.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Y axis.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Z axis.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed perspective projection mapping depth to [-1, 1] clip space.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn perspective_rh_gl(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        Mat4::new([
            [f / aspect_ratio, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [
                0.0,
                0.0,
                (far + near) / (near - far),
                2.0 * far * near / (near - far),
            ],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Creates a right-handed view matrix. The camera looks down its local -Z.
    ///
    /// # Arguments
    ///
    /// * `eye` - The position of the camera.
    /// * `target` - The point the camera is looking at.
    /// * `up` - The up direction of the camera.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        Self::new([
            [right.x, right.y, right.z, -right.dot(eye)],
            [up.x, up.y, up.z, -up.dot(eye)],
            [-forward.x, -forward.y, -forward.z, forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// `self * Mat4::translation(offset)`.
    pub fn translate(&self, offset: Vec3) -> Self {
        *self * Mat4::translation(offset)
    }

    /// `self * Mat4::rotation(angle, axis)`.
    pub fn rotate(&self, angle: f32, axis: Vec3) -> Self {
        *self * Mat4::rotation(angle, axis)
    }

    /// `self * Mat4::scaling(factors)`.
    pub fn scale(&self, factors: Vec3) -> Self {
        *self * Mat4::scaling(factors)
    }

    pub fn transpose(&self) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (row, values) in data.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.data[col][row];
            }
        }
        Mat4 { data }
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }

    /// Set element at [row][col].
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row][col] = value;
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, out) in result.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| {
            self.data[r][0] * v.x
                + self.data[r][1] * v.y
                + self.data[r][2] * v.z
                + self.data[r][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
        (m * Vec4::point(p)).truncate()
    }

    #[test]
    fn rotations_are_right_handed() {
        assert_vec3_eq(transform_point(Mat4::rotation_x(FRAC_PI_2), Vec3::Y), Vec3::Z);
        assert_vec3_eq(transform_point(Mat4::rotation_y(FRAC_PI_2), Vec3::Z), Vec3::X);
        assert_vec3_eq(transform_point(Mat4::rotation_z(FRAC_PI_2), Vec3::X), Vec3::Y);
    }

    #[test]
    fn axis_rotation_matches_principal_rotations() {
        let angle = 0.7;
        let pairs = [
            (Mat4::rotation(angle, Vec3::X), Mat4::rotation_x(angle)),
            (Mat4::rotation(angle, Vec3::Y * 3.0), Mat4::rotation_y(angle)),
            (Mat4::rotation(angle, Vec3::Z), Mat4::rotation_z(angle)),
        ];
        for (a, b) in pairs {
            for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
                assert_relative_eq!(x, y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rotation_about_zero_axis_is_identity() {
        assert_eq!(Mat4::rotation(1.0, Vec3::ZERO), Mat4::identity());
    }

    #[test]
    fn post_multiplied_transforms_apply_last_call_first() {
        let m = Mat4::identity()
            .translate(Vec3::new(1.0, 0.0, 0.0))
            .scale(Vec3::splat(2.0));
        // Scale first, then translate.
        assert_vec3_eq(transform_point(m, Vec3::ONE), Vec3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn look_at_maps_target_onto_negative_z() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_vec3_eq(transform_point(view, Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
        assert_vec3_eq(transform_point(view, Vec3::X), Vec3::X + Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let p = Mat4::perspective_rh_gl(45f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        let near = (p * Vec4::point(Vec3::new(0.0, 0.0, -0.1))).project();
        let far = (p * Vec4::point(Vec3::new(0.0, 0.0, -100.0))).project();
        assert_relative_eq!(near.z, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn column_array_layout_keeps_translation_in_last_column() {
        let cols = Mat4::translation(Vec3::new(4.0, 5.0, 6.0)).to_cols_array();
        assert_eq!(&cols[12..15], &[4.0, 5.0, 6.0]);
        assert_eq!(Mat4::from_cols_array(&cols), Mat4::translation(Vec3::new(4.0, 5.0, 6.0)));
    }
}
