//! Pixel shaders for the software pipeline.
//!
//! The rasterizer handles coverage, depth and varying interpolation; a
//! [`PixelShader`] turns the interpolated varyings of one pixel into a colour.
//! Two shaders cover the scene: [`VertexColorShader`] for untextured geometry
//! and [`PhongShader`] for textured, lit geometry.

use super::{Varyings, COLOR, NORMAL, POSITION, TEX_COORD};
use crate::colors::pack_rgb;
use crate::math::Vec3;

/// Trait for per-pixel shading computations.
pub trait PixelShader {
    /// Compute the color for a pixel from its interpolated varyings.
    fn shade(&self, varyings: &Varyings) -> u32;
}

/// Something a shader can sample colours from.
pub trait TextureSampler {
    /// RGB at texture coordinates (u, v); v = 0 is the first stored row.
    fn sample(&self, u: f32, v: f32) -> Vec3;
}

#[inline]
fn varying_vec3(varyings: &Varyings, offset: usize) -> Vec3 {
    Vec3::new(varyings[offset], varyings[offset + 1], varyings[offset + 2])
}

/// Outputs the interpolated vertex colour, unlit.
#[derive(Clone, Copy, Debug, Default)]
pub struct VertexColorShader;

impl PixelShader for VertexColorShader {
    #[inline]
    fn shade(&self, varyings: &Varyings) -> u32 {
        pack_rgb(varying_vec3(varyings, COLOR))
    }
}

/// Phong reflectance of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceMaterial {
    pub shininess: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// Ambient, diffuse and specular intensities of a light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    #[inline]
    pub fn factor(&self, distance: f32) -> f32 {
        let denominator = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denominator > f32::EPSILON {
            1.0 / denominator
        } else {
            0.0
        }
    }
}

/// The single light a draw is shaded with, in eye space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActiveLight {
    Ambient {
        ambient: Vec3,
    },
    Directional {
        /// Direction the light travels.
        direction: Vec3,
        color: LightColor,
    },
    Point {
        position: Vec3,
        color: LightColor,
        attenuation: Attenuation,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        color: LightColor,
        attenuation: Attenuation,
        /// Cosine of the inner cone angle.
        cut_off: f32,
        /// Cosine of the outer cone angle.
        outer_cut_off: f32,
    },
    /// An unknown lighting model; everything shades black.
    Off,
}

impl ActiveLight {
    /// Light reaching a surface point, as (ambient + diffuse, specular)
    /// weights to be combined with the surface colour.
    pub fn illuminate(&self, material: &SurfaceMaterial, position: Vec3, normal: Vec3) -> (Vec3, Vec3) {
        let view_dir = (-position).normalize_or_zero();

        let phong = |color: &LightColor, to_light: Vec3| {
            let ambient = color.ambient.mul_elem(material.ambient);
            let diffuse_strength = normal.dot(to_light).max(0.0);
            let diffuse = color.diffuse.mul_elem(material.diffuse) * diffuse_strength;
            let reflected = (-to_light).reflect(normal);
            let specular_strength = if diffuse_strength > 0.0 {
                view_dir.dot(reflected).max(0.0).powf(material.shininess)
            } else {
                0.0
            };
            let specular = color.specular.mul_elem(material.specular) * specular_strength;
            (ambient, diffuse, specular)
        };

        match self {
            ActiveLight::Ambient { ambient } => (ambient.mul_elem(material.ambient), Vec3::ZERO),
            ActiveLight::Directional { direction, color } => {
                let (a, d, s) = phong(color, (-*direction).normalize_or_zero());
                (a + d, s)
            }
            ActiveLight::Point {
                position: light_position,
                color,
                attenuation,
            } => {
                let offset = *light_position - position;
                let (a, d, s) = phong(color, offset.normalize_or_zero());
                let k = attenuation.factor(offset.magnitude());
                ((a + d) * k, s * k)
            }
            ActiveLight::Spot {
                position: light_position,
                direction,
                color,
                attenuation,
                cut_off,
                outer_cut_off,
            } => {
                let offset = *light_position - position;
                let to_light = offset.normalize_or_zero();
                let (a, d, s) = phong(color, to_light);
                let theta = to_light.dot((-*direction).normalize_or_zero());
                let epsilon = cut_off - outer_cut_off;
                let cone = if epsilon.abs() > f32::EPSILON {
                    ((theta - outer_cut_off) / epsilon).clamp(0.0, 1.0)
                } else if theta >= *cut_off {
                    1.0
                } else {
                    0.0
                };
                let k = attenuation.factor(offset.magnitude());
                ((a + d * cone) * k, s * cone * k)
            }
            ActiveLight::Off => (Vec3::ZERO, Vec3::ZERO),
        }
    }
}

/// Textured Phong shading with one active light.
pub struct PhongShader<'a, T: TextureSampler> {
    texture: &'a T,
    material: SurfaceMaterial,
    light: ActiveLight,
}

impl<'a, T: TextureSampler> PhongShader<'a, T> {
    pub fn new(texture: &'a T, material: SurfaceMaterial, light: ActiveLight) -> Self {
        Self {
            texture,
            material,
            light,
        }
    }
}

impl<T: TextureSampler> PixelShader for PhongShader<'_, T> {
    #[inline]
    fn shade(&self, varyings: &Varyings) -> u32 {
        let position = varying_vec3(varyings, POSITION);
        let normal = varying_vec3(varyings, NORMAL).normalize_or_zero();
        let base = self
            .texture
            .sample(varyings[TEX_COORD], varyings[TEX_COORD + 1]);

        let (lit, specular) = self.light.illuminate(&self.material, position, normal);
        pack_rgb(base.mul_elem(lit) + specular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::VARYING_COUNT;
    use approx::assert_relative_eq;

    struct White;

    impl TextureSampler for White {
        fn sample(&self, _u: f32, _v: f32) -> Vec3 {
            Vec3::ONE
        }
    }

    fn material() -> SurfaceMaterial {
        SurfaceMaterial {
            shininess: 32.0,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.5),
        }
    }

    fn white_light() -> LightColor {
        LightColor {
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        }
    }

    #[test]
    fn ambient_model_ignores_geometry() {
        let light = ActiveLight::Ambient {
            ambient: Vec3::splat(7.0),
        };
        let (lit, spec) = light.illuminate(&material(), Vec3::new(0.0, 0.0, -3.0), Vec3::X);
        assert_relative_eq!(lit.x, 0.7, epsilon = 1e-6);
        assert_eq!(spec, Vec3::ZERO);
    }

    #[test]
    fn directional_light_follows_lambert() {
        let light = ActiveLight::Directional {
            direction: Vec3::new(0.0, 0.0, -1.0),
            color: white_light(),
        };
        let facing = light.illuminate(&material(), Vec3::new(0.0, 0.0, -3.0), Vec3::Z).0;
        let away = light.illuminate(&material(), Vec3::new(0.0, 0.0, -3.0), -Vec3::Z).0;
        assert_relative_eq!(facing.x, 0.6, epsilon = 1e-5);
        assert_relative_eq!(away.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn point_light_attenuates_with_distance() {
        let light = |distance: f32| ActiveLight::Point {
            position: Vec3::new(0.0, 0.0, distance),
            color: white_light(),
            attenuation: Attenuation {
                constant: 1.0,
                linear: 0.06,
                quadratic: 0.02,
            },
        };
        let near = light(1.0).illuminate(&material(), Vec3::ZERO, Vec3::Z).0;
        let far = light(10.0).illuminate(&material(), Vec3::ZERO, Vec3::Z).0;
        assert!(near.x > far.x);
        assert_relative_eq!(near.x, 0.6 / 1.08, epsilon = 1e-5);
    }

    #[test]
    fn spot_light_cone_cuts_off_outside_outer_angle() {
        let spot = ActiveLight::Spot {
            position: Vec3::new(0.0, 2.2, 0.0),
            direction: Vec3::new(0.0, -0.1, 0.0),
            color: white_light(),
            attenuation: Attenuation {
                constant: 1.0,
                linear: 0.0,
                quadratic: 0.0,
            },
            cut_off: 20f32.to_radians().cos(),
            outer_cut_off: 30f32.to_radians().cos(),
        };
        let under = spot.illuminate(&material(), Vec3::ZERO, Vec3::Y).0;
        let outside = spot.illuminate(&material(), Vec3::new(3.0, 0.0, 0.0), Vec3::Y).0;
        assert_relative_eq!(under.x, 0.6, epsilon = 1e-5);
        assert_relative_eq!(outside.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn unknown_model_is_black() {
        let shader = PhongShader::new(&White, material(), ActiveLight::Off);
        assert_eq!(shader.shade(&[0.0; VARYING_COUNT]), 0xFF00_0000);
    }

    #[test]
    fn vertex_color_shader_outputs_colour_slot() {
        let mut varyings = [0.0; VARYING_COUNT];
        varyings[COLOR] = 1.0;
        varyings[COLOR + 1] = 1.0;
        assert_eq!(VertexColorShader.shade(&varyings), 0xFFFF_FF00);
    }
}
