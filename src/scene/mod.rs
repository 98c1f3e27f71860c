//! The pool scene: balls, table, lights and the frame that draws them.

pub mod animation;
pub mod ball;
pub mod layout;
pub mod lighting;
pub mod pool;
pub mod shader_state;
pub mod table;

pub use animation::{is_colliding, AnimationState, BallAnimation, CollisionBounds};
pub use ball::{Ball, BallId, BALL_SCALE};
pub use layout::BALL_POSITIONS;
pub use lighting::{LightingModel, LightingPresets};
pub use pool::PoolScene;
pub use shader_state::ShaderState;
pub use table::{table_geometry, Table};
