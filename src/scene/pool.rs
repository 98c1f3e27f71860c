//! The whole pool scene on one device.

use crate::assets::AssetLoader;
use crate::camera::CameraController;
use crate::config::SceneConfig;
use crate::error::ShaderError;
use crate::gpu::{load_program, Capability, ClearFlags, GraphicsDevice};
use crate::input::InputEvent;
use crate::math::{Mat3, Mat4, Vec3};
use crate::projection::Projection;
use crate::scene::animation::{AnimationState, BallAnimation};
use crate::scene::ball::{Ball, BallId};
use crate::scene::layout::BALL_POSITIONS;
use crate::scene::lighting::{LightingModel, LightingPresets};
use crate::scene::shader_state::ShaderState;
use crate::scene::table::Table;

/// Angle in radians of the initial model rotation.
const MODEL_ANGLE: f32 = -10.0;
const MODEL_AXIS: Vec3 = Vec3::new(0.0, 1.0, 0.15);

/// Owns the device and everything uploaded to it. GPU objects are released
/// when the scene is dropped.
pub struct PoolScene<D: GraphicsDevice> {
    device: D,
    state: ShaderState,
    table: Table,
    balls: Vec<Ball>,
    animation: BallAnimation,
    camera: CameraController,
    camera_position: Vec3,
    projection: Projection,
    lighting: LightingModel,
}

impl<D: GraphicsDevice> PoolScene<D> {
    /// Builds the program, loads and uploads the table and every ball, and
    /// sets up transforms, lights and fixed-function state.
    ///
    /// Only a shader failure is an error. A ball whose assets fail to load
    /// is logged and left empty.
    pub fn new(mut device: D, config: &SceneConfig) -> Result<Self, ShaderError> {
        let program = load_program(
            &mut device,
            &config.assets.vertex_shader,
            &config.assets.fragment_shader,
        )?;
        let mut state = ShaderState::new(program);

        let mut table = Table::new();
        table.send(&mut device);

        let loader = AssetLoader::from_config(&config.assets);
        let mut balls = Vec::with_capacity(BALL_POSITIONS.len());
        for (n, position) in (1..).zip(BALL_POSITIONS) {
            let Some(id) = BallId::new(n) else {
                continue;
            };
            let mut ball = Ball::new(id);
            ball.set_position(position);
            if ball.read(&loader, &config.assets.model_name(n)).is_ok() {
                ball.send(&mut device);
            }
            balls.push(ball);
        }
        let loaded = balls.iter().filter(|b| b.handles().is_some()).count();
        log::info!("Loaded {loaded} of {} balls", balls.len());

        state.bind_program(&mut device);
        if let Some(mesh) = table.mesh() {
            device.bind_vertex_array(Some(mesh.vertex_array));
            device.bind_array_buffer(Some(mesh.buffer));
            state.send_attributes(&mut device);
            device.bind_vertex_array(None);
            device.bind_array_buffer(None);
        }

        let window = &config.window;
        let camera_position = config.camera.position();
        let projection = Projection::from_config(&config.camera, window.width, window.height);
        state.model = Mat4::rotation(MODEL_ANGLE, MODEL_AXIS);
        state.view = Mat4::look_at_rh(camera_position, Vec3::ZERO, Vec3::Y);
        state.projection = projection.matrix();
        let model_view = state.view * state.model;
        state.normal = Mat3::normal_matrix(&model_view).unwrap_or_else(|| {
            log::warn!("Model-view matrix is singular; using identity normal matrix");
            Mat3::identity()
        });
        let (model, view, projection_matrix, normal) =
            (state.model, state.view, state.projection, state.normal);
        state.send_uniforms(&mut device, &model, &view, &model_view, &projection_matrix, &normal);

        LightingPresets::default().upload(&mut state, &mut device);

        device.viewport(0, 0, window.width, window.height);
        device.enable(Capability::DepthTest);
        device.enable(Capability::CullFace);

        Ok(Self {
            device,
            state,
            table,
            balls,
            animation: BallAnimation::from_config(&config.animation),
            camera: CameraController::from_config(&config.camera),
            camera_position,
            projection,
            lighting: LightingModel::Ambient,
        })
    }

    /// Renders one frame, then advances the animation.
    pub fn display(&mut self) {
        self.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        self.state
            .set_vec3(&mut self.device, "viewPosition", self.camera_position);
        self.table.draw(&mut self.device, &mut self.state);

        for ball in &self.balls {
            ball.draw(&mut self.device, &mut self.state, ball.position(), ball.orientation());
        }

        self.animation.step(&mut self.balls);
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Char(' ') => {
                self.start_animation();
            }
            InputEvent::Char(key) => {
                if let Some(model) = LightingModel::from_key(key) {
                    self.set_lighting_model(model);
                }
            }
            InputEvent::PointerMoved { x, y, left_down } => {
                if let Some(view) = self.camera.pointer_moved(&self.state.view, x, y, left_down) {
                    self.set_view(view);
                }
            }
            InputEvent::Scroll { dy } => {
                if let Some(view) = self.camera.scrolled(&self.state.view, dy) {
                    self.set_view(view);
                }
            }
            InputEvent::Resize { width, height } => self.resize(width, height),
            InputEvent::Quit => {}
        }
    }

    fn set_view(&mut self, view: Mat4) {
        self.state.view = view;
        self.state.set_mat4(&mut self.device, "View", &view);
    }

    pub fn set_lighting_model(&mut self, model: LightingModel) {
        self.lighting = model;
        self.state
            .set_int(&mut self.device, "lightModel", model.as_uniform());
        log::info!("Switched to {model} lighting");
    }

    /// Returns whether the animation is running afterwards.
    pub fn start_animation(&mut self) -> bool {
        self.animation.start()
    }

    /// Rebuilds the projection for the new aspect ratio and resets the
    /// viewport. Resizing the device's own surface is up to the caller.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.state.projection = self.projection.matrix();
        let projection = self.state.projection;
        self.state
            .set_mat4(&mut self.device, "Projection", &projection);
        self.device.viewport(0, 0, width, height);
        log::debug!("Viewport resized to {width}x{height}");
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn shader_state(&self) -> &ShaderState {
        &self.state
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    pub fn lighting_model(&self) -> LightingModel {
        self.lighting
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }
}

impl<D: GraphicsDevice> Drop for PoolScene<D> {
    fn drop(&mut self) {
        for ball in &mut self.balls {
            ball.release(&mut self.device);
        }
        self.table.release(&mut self.device);
        self.device.use_program(None);
        self.device.delete_program(self.state.program());
        log::debug!("Released scene resources");
    }
}
