use anyhow::{anyhow, Context, Result};
use env_logger::Env;

use bilhar::config::SceneConfig;
use bilhar::gpu::SoftwareDevice;
use bilhar::input::InputEvent;
use bilhar::scene::PoolScene;
use bilhar::window::{FrameLimiter, Window};

const CONFIG_FILE: &str = "pool.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = SceneConfig::load_or_default(CONFIG_FILE);
    let (width, height) = (config.window.width, config.window.height);

    let mut window = Window::new(&config.window.title, width, height)
        .map_err(|e| anyhow!(e))
        .context("failed to open window")?;
    let device = SoftwareDevice::new(width, height);
    let mut scene = PoolScene::new(device, &config).context("failed to build the shader program")?;
    log::info!("Keys 1-4 switch lighting, space rolls a ball, drag to orbit, scroll to zoom");

    let mut limiter = FrameLimiter::new(&window, config.window.target_fps);
    'running: loop {
        for event in window.poll_events() {
            match event {
                InputEvent::Quit => break 'running,
                InputEvent::Resize { width, height } => {
                    window
                        .resize(width, height)
                        .map_err(|e| anyhow!(e))
                        .context("failed to resize window")?;
                    scene.device_mut().resize(width, height);
                    scene.handle_input(&event);
                }
                _ => scene.handle_input(&event),
            }
        }

        scene.display();
        window
            .present(scene.device().frame_bytes())
            .map_err(|e| anyhow!(e))
            .context("failed to present frame")?;
        limiter.wait_and_get_delta(&window);
    }

    Ok(())
}
