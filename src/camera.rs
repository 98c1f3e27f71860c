//! Mouse-driven camera control.
//!
//! The scene has no camera object: the view matrix itself is the camera
//! state. Dragging with the left button held rotates it and the scroll
//! wheel scales it. Both operations post-multiply the current view, so they
//! act in world space around the origin the table sits on.

use crate::config::CameraConfig;
use crate::math::{Mat4, Vec3};

/// Turns pointer and scroll input into view matrix updates.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Degrees of rotation per pixel of pointer travel.
    pub look_sensitivity: f32,
    /// Fraction of scale change per scroll step.
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    zoom_level: f32,
    last_pointer: Option<(f32, f32)>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraController {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            look_sensitivity: config.look_sensitivity,
            zoom_speed: config.zoom_speed,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_level: 1.0,
            last_pointer: None,
        }
    }

    /// Product of every scale applied to the view so far.
    pub fn zoom_level(&self) -> f32 {
        self.zoom_level
    }

    /// Handles a pointer position. Returns the rotated view while the left
    /// button is held and the pointer has moved.
    ///
    /// The first position seen becomes the drag origin, so a drag never
    /// starts with a jump.
    pub fn pointer_moved(&mut self, view: &Mat4, x: f32, y: f32, left_down: bool) -> Option<Mat4> {
        let (last_x, last_y) = self.last_pointer.unwrap_or((x, y));
        self.last_pointer = Some((x, y));
        if !left_down {
            return None;
        }

        let dx = x - last_x;
        let dy = y - last_y;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        let yawed = view.rotate((dx * self.look_sensitivity).to_radians(), Vec3::Y);
        let right = Vec3::Y.cross(yawed.column(2).truncate()).normalize_or_zero();
        Some(yawed.rotate((dy * self.look_sensitivity).to_radians(), right))
    }

    /// Handles a scroll of `dy` steps. Returns the scaled view, or `None`
    /// when the zoom level is already at the limit in that direction.
    pub fn scrolled(&mut self, view: &Mat4, dy: f32) -> Option<Mat4> {
        if !dy.is_finite() {
            return None;
        }
        let factor = 1.0 + dy * self.zoom_speed;
        // A non-positive factor would flip or collapse the view.
        let target = if factor > 0.0 {
            (self.zoom_level * factor).clamp(self.min_zoom, self.max_zoom)
        } else {
            self.min_zoom
        };
        let applied = target / self.zoom_level;
        if (applied - 1.0).abs() <= f32::EPSILON {
            return None;
        }
        self.zoom_level = target;
        Some(view.scale(Vec3::splat(applied)))
    }
}
