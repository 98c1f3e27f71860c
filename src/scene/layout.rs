//! Where the balls start.

use crate::math::Vec3;

/// Resting height of a ball centre above the table's centre plane.
pub const BALL_REST_HEIGHT: f32 = 0.33;

const fn rest(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, BALL_REST_HEIGHT, z)
}

/// Initial position of ball `n` at index `n - 1`.
pub const BALL_POSITIONS: [Vec3; 15] = [
    rest(1.1, 1.1),
    rest(-1.1, -1.1),
    rest(-1.1, 1.1),
    rest(1.1, -1.1),
    rest(0.1, -0.1),
    rest(-0.3, -0.3),
    rest(-0.6, -0.4),
    rest(0.8, 0.7),
    rest(-0.8, -0.2),
    rest(0.3, 0.7),
    rest(-0.2, -0.8),
    rest(0.7, 0.5),
    rest(-0.9, 0.6),
    rest(0.1, 0.3),
    rest(0.4, -0.6),
];
