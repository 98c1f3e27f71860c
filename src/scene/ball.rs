//! A textured pool ball.

use std::fmt;
use std::num::NonZeroU32;

use crate::assets::{AssetLoader, BallAssets};
use crate::error::LoadError;
use crate::gpu::{upload_geometry, upload_texture, GpuHandles, GraphicsDevice, Primitive};
use crate::math::{Mat4, Vec3};
use crate::scene::shader_state::ShaderState;

/// Uniform scale applied to ball models.
pub const BALL_SCALE: f32 = 0.08;

/// 1-based ball number. Ball `n` samples its texture from unit `n - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(NonZeroU32);

impl BallId {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn texture_unit(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ball: its placement, what was loaded for it, and what it owns on the
/// GPU. A ball whose assets failed to load stays empty and draws nothing.
#[derive(Debug)]
pub struct Ball {
    id: BallId,
    position: Vec3,
    /// Degrees about each axis.
    orientation: Vec3,
    assets: Option<BallAssets>,
    handles: Option<GpuHandles>,
}

impl Ball {
    pub fn new(id: BallId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            assets: None,
            handles: None,
        }
    }

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Vec3) {
        self.orientation = orientation;
    }

    pub fn assets(&self) -> Option<&BallAssets> {
        self.assets.as_ref()
    }

    pub fn handles(&self) -> Option<GpuHandles> {
        self.handles
    }

    /// Loads the model, material and texture for this ball.
    pub fn read(&mut self, loader: &AssetLoader, model_name: &str) -> Result<(), LoadError> {
        match loader.load_ball(model_name) {
            Ok(assets) => {
                log::debug!(
                    "Ball {}: loaded {} triangles from {model_name}",
                    self.id,
                    assets.geometry.triangle_count()
                );
                self.assets = Some(assets);
                Ok(())
            }
            Err(err) => {
                log::error!("Ball {}: failed to load {model_name}: {err}", self.id);
                Err(err)
            }
        }
    }

    /// Uploads the geometry and texture. Returns false, allocating nothing,
    /// if the ball has no assets, no triangles or was already uploaded.
    pub fn send<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> bool {
        if self.handles.is_some() {
            log::warn!("Ball {} is already on the GPU", self.id);
            return false;
        }
        let Some(assets) = &self.assets else {
            log::warn!("Ball {} has nothing to upload", self.id);
            return false;
        };
        if assets.geometry.is_empty() {
            log::warn!("Ball {} has no triangles to upload", self.id);
            return false;
        }

        let mesh = upload_geometry(device, &assets.geometry);
        let texture = upload_texture(device, self.id.texture_unit(), &assets.texture);
        self.handles = Some(GpuHandles { mesh, texture });
        true
    }

    /// `base`, moved to `position`, turned by `orientation` degrees (Z, then
    /// Y, then X) and scaled to ball size.
    pub fn model_matrix(base: &Mat4, position: Vec3, orientation: Vec3) -> Mat4 {
        base.translate(position)
            .rotate(orientation.z.to_radians(), Vec3::Z)
            .rotate(orientation.y.to_radians(), Vec3::Y)
            .rotate(orientation.x.to_radians(), Vec3::X)
            .scale(Vec3::splat(BALL_SCALE))
    }

    pub fn draw<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        state: &mut ShaderState,
        position: Vec3,
        orientation: Vec3,
    ) {
        let (Some(assets), Some(handles)) = (&self.assets, self.handles) else {
            return;
        };

        let material = &assets.material;
        state.set_float(device, "material.shininess", material.shininess);
        state.set_vec3(device, "material.ambient", material.ambient);
        state.set_vec3(device, "material.diffuse", material.diffuse);
        state.set_vec3(device, "material.specular", material.specular);

        let model = Self::model_matrix(&state.model, position, orientation);
        let model_view = state.view * model;
        state.set_mat4(device, "ModelView", &model_view);
        state.set_int(device, "isRenderTexture", 1);
        state.set_int(device, "sampler", self.id.texture_unit() as i32);

        device.bind_vertex_array(Some(handles.mesh.vertex_array));
        device.draw_arrays(Primitive::Triangles, 0, assets.geometry.vertex_count());
    }

    /// Deletes the GPU objects. The loaded assets stay.
    pub fn release<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) {
        if let Some(handles) = self.handles.take() {
            handles.release(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Geometry, Material, Texture, Vertex};
    use crate::gpu::SoftwareDevice;
    use crate::math::Vec4;
    use approx::assert_relative_eq;

    fn id(n: u32) -> BallId {
        BallId::new(n).expect("non-zero")
    }

    fn loaded_ball(n: u32) -> Ball {
        let mut ball = Ball::new(id(n));
        let vertex = |x: f32, y: f32| Vertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [0.5, 0.5]);
        ball.assets = Some(BallAssets {
            geometry: Geometry::from_triangles([[vertex(-1.0, -1.0), vertex(1.0, -1.0), vertex(0.0, 1.0)]]),
            material: Material::default(),
            texture: Texture::new(1, 1, 3, vec![255, 255, 255]).expect("valid texture"),
        });
        ball
    }

    #[test]
    fn texture_unit_is_id_minus_one() {
        assert!(BallId::new(0).is_none());
        let units: Vec<u32> = (1..=15).map(|n| id(n).texture_unit()).collect();
        assert_eq!(units, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn model_matrix_scales_and_places() {
        let model = Ball::model_matrix(&Mat4::identity(), Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let p = model * Vec4::point(Vec3::X);
        assert_relative_eq!(p.x, 1.0 + BALL_SCALE, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn orientation_is_in_degrees() {
        let model = Ball::model_matrix(&Mat4::identity(), Vec3::ZERO, Vec3::new(0.0, 0.0, 90.0));
        let p = model * Vec4::point(Vec3::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, BALL_SCALE, epsilon = 1e-6);
    }

    #[test]
    fn send_uploads_once() {
        let mut device = SoftwareDevice::new(4, 4);
        let mut ball = loaded_ball(3);

        assert!(ball.send(&mut device));
        let handles = ball.handles().expect("uploaded");
        assert_eq!(device.texture_on_unit(2), Some(handles.texture));
        let counts = device.resource_counts();

        assert!(!ball.send(&mut device));
        assert_eq!(device.resource_counts(), counts);
    }

    #[test]
    fn empty_ball_uploads_nothing() {
        let mut device = SoftwareDevice::new(4, 4);
        let mut ball = Ball::new(id(1));
        assert!(!ball.send(&mut device));
        assert_eq!(device.resource_counts().buffers, 0);
    }

    #[test]
    fn ball_without_triangles_uploads_nothing() {
        let mut device = SoftwareDevice::new(4, 4);
        let mut ball = loaded_ball(2);
        if let Some(assets) = ball.assets.as_mut() {
            assets.geometry = Geometry::default();
        }
        assert!(!ball.send(&mut device));
        assert!(ball.handles().is_none());
        assert_eq!(device.resource_counts(), Default::default());
    }

    #[test]
    fn release_frees_gpu_objects() {
        let mut device = SoftwareDevice::new(4, 4);
        let mut ball = loaded_ball(1);
        ball.send(&mut device);
        ball.release(&mut device);
        assert!(ball.handles().is_none());
        assert_eq!(device.resource_counts(), Default::default());
        assert!(ball.assets().is_some());
    }

    #[test]
    fn read_reports_missing_model() {
        let loader = AssetLoader::new("/nonexistent", "/nonexistent");
        let mut ball = Ball::new(id(1));
        assert!(ball.read(&loader, "Ball1.obj").is_err());
        assert!(ball.assets().is_none());
    }
}
