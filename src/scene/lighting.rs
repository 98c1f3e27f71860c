//! Light sources of the scene and the switch between them.
//!
//! All four lights are uploaded once at setup. Switching models only changes
//! the `lightModel` uniform, which selects the light the fragment stage
//! evaluates.

use std::fmt;

use crate::gpu::GraphicsDevice;
use crate::math::Vec3;
use crate::scene::shader_state::ShaderState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightingModel {
    Ambient = 1,
    Directional = 2,
    Point = 3,
    Spot = 4,
}

impl LightingModel {
    pub const ALL: [LightingModel; 4] = [
        LightingModel::Ambient,
        LightingModel::Directional,
        LightingModel::Point,
        LightingModel::Spot,
    ];

    /// Model bound to a number key.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(LightingModel::Ambient),
            '2' => Some(LightingModel::Directional),
            '3' => Some(LightingModel::Point),
            '4' => Some(LightingModel::Spot),
            _ => None,
        }
    }

    pub fn as_uniform(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for LightingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightingModel::Ambient => "ambient",
            LightingModel::Directional => "directional",
            LightingModel::Point => "point",
            LightingModel::Spot => "spot",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub point: PointLight,
    pub direction: Vec3,
    /// Cosine of the inner cone half-angle.
    pub cut_off: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_cut_off: f32,
}

/// Parameters of every light in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingPresets {
    pub ambient: Vec3,
    pub directional: DirectionalLight,
    pub point: PointLight,
    pub spot: SpotLight,
}

impl Default for LightingPresets {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(7.0),
            directional: DirectionalLight {
                direction: Vec3::new(1.0, 0.0, 0.0),
                ambient: Vec3::splat(4.0),
                diffuse: Vec3::splat(2.0),
                specular: Vec3::splat(1.0),
            },
            point: PointLight {
                position: Vec3::new(1.0, 0.0, 0.0),
                ambient: Vec3::splat(6.0),
                diffuse: Vec3::splat(2.0),
                specular: Vec3::splat(1.0),
                constant: 1.0,
                linear: 0.06,
                quadratic: 0.02,
            },
            spot: SpotLight {
                point: PointLight {
                    position: Vec3::new(0.0, 2.2, 0.0),
                    ambient: Vec3::splat(5.0),
                    diffuse: Vec3::splat(1.0),
                    specular: Vec3::splat(1.0),
                    constant: 1.0,
                    linear: 0.09,
                    quadratic: 0.032,
                },
                direction: Vec3::new(0.0, -0.1, 0.0),
                cut_off: 20f32.to_radians().cos(),
                outer_cut_off: 30f32.to_radians().cos(),
            },
        }
    }
}

fn upload_point<D: GraphicsDevice + ?Sized>(
    state: &mut ShaderState,
    device: &mut D,
    prefix: &str,
    light: &PointLight,
) {
    state.set_vec3(device, &format!("{prefix}.position"), light.position);
    state.set_vec3(device, &format!("{prefix}.ambient"), light.ambient);
    state.set_vec3(device, &format!("{prefix}.diffuse"), light.diffuse);
    state.set_vec3(device, &format!("{prefix}.specular"), light.specular);
    state.set_float(device, &format!("{prefix}.constant"), light.constant);
    state.set_float(device, &format!("{prefix}.linear"), light.linear);
    state.set_float(device, &format!("{prefix}.quadratic"), light.quadratic);
}

impl LightingPresets {
    /// Uploads every light and selects [`LightingModel::Ambient`].
    pub fn upload<D: GraphicsDevice + ?Sized>(&self, state: &mut ShaderState, device: &mut D) {
        state.set_vec3(device, "ambientLight.ambient", self.ambient);

        let directional = &self.directional;
        state.set_vec3(device, "directionalLight.direction", directional.direction);
        state.set_vec3(device, "directionalLight.ambient", directional.ambient);
        state.set_vec3(device, "directionalLight.diffuse", directional.diffuse);
        state.set_vec3(device, "directionalLight.specular", directional.specular);

        upload_point(state, device, "pointLight", &self.point);

        upload_point(state, device, "spotLight", &self.spot.point);
        state.set_vec3(device, "spotLight.direction", self.spot.direction);
        state.set_float(device, "spotLight.cutOff", self.spot.cut_off);
        state.set_float(device, "spotLight.outerCutOff", self.spot.outer_cut_off);

        state.set_int(device, "lightModel", LightingModel::Ambient.as_uniform());
    }
}
