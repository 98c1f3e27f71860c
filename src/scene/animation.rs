//! The scripted roll of one ball, and the test that ends it.

use crate::config::AnimationConfig;
use crate::math::Vec3;
use crate::scene::ball::Ball;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    /// Terminal: a stopped animation never runs again.
    Stopped,
}

/// Sizes the collision test works with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBounds {
    pub ball_radius: f32,
    /// Half the table's side on X and Z.
    pub table_half_extent: f32,
}

impl Default for CollisionBounds {
    fn default() -> Self {
        Self {
            ball_radius: 0.08,
            table_half_extent: 1.25,
        }
    }
}

/// True when the ball at `animated` touches another ball or reaches a
/// table edge on X or Z.
///
/// Positions are sampled once per frame, so a fast enough ball can pass
/// through an obstacle between two samples.
pub fn is_colliding(positions: &[Vec3], animated: usize, bounds: &CollisionBounds) -> bool {
    let Some(&moving) = positions.get(animated) else {
        return false;
    };
    let r = bounds.ball_radius;

    let hits_ball = positions
        .iter()
        .enumerate()
        .any(|(i, other)| i != animated && moving.distance(*other) <= 2.0 * r);
    if hits_ball {
        return true;
    }

    let edge = bounds.table_half_extent;
    moving.x + r >= edge || moving.x - r <= -edge || moving.z + r >= edge || moving.z - r <= -edge
}

/// Moves one ball a fixed step per frame until it collides.
#[derive(Clone, Debug)]
pub struct BallAnimation {
    state: AnimationState,
    ball_index: usize,
    step: Vec3,
    /// Degrees added to each orientation axis per frame.
    spin: f32,
    bounds: CollisionBounds,
}

impl BallAnimation {
    pub fn new(ball_index: usize, step: Vec3, spin: f32, bounds: CollisionBounds) -> Self {
        Self {
            state: AnimationState::Idle,
            ball_index,
            step,
            spin,
            bounds,
        }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(
            config.ball_index,
            Vec3::from_array(config.step),
            config.spin,
            CollisionBounds {
                ball_radius: config.ball_radius,
                table_half_extent: config.table_half_extent,
            },
        )
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn ball_index(&self) -> usize {
        self.ball_index
    }

    /// Starts the animation if it never ran. Returns whether it is running.
    pub fn start(&mut self) -> bool {
        match self.state {
            AnimationState::Idle => {
                log::info!("Ball animation started");
                self.state = AnimationState::Running;
                true
            }
            AnimationState::Running => true,
            AnimationState::Stopped => {
                log::info!("Ball animation finished");
                false
            }
        }
    }

    /// Advances the animated ball by one frame and runs the collision test.
    /// Does nothing unless running.
    pub fn step(&mut self, balls: &mut [Ball]) {
        if self.state != AnimationState::Running {
            return;
        }
        let Some(ball) = balls.get_mut(self.ball_index) else {
            log::warn!("No ball at index {} to animate", self.ball_index);
            self.state = AnimationState::Stopped;
            return;
        };

        ball.set_position(ball.position() + self.step);
        ball.set_orientation(ball.orientation() + Vec3::splat(self.spin));

        let positions: Vec<Vec3> = balls.iter().map(Ball::position).collect();
        if is_colliding(&positions, self.ball_index, &self.bounds) {
            log::info!("Ball {} collided with a ball or the table", self.ball_index + 1);
            self.state = AnimationState::Stopped;
        }
    }
}

impl Default for BallAnimation {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}
