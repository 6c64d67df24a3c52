//! framegrab: show frames from a file, image or camera with an FPS overlay

use color_eyre::{eyre::eyre, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use tracing::{info, warn};

use framegrab::display::{self, DisplayWindow, FpsCounter};
use framegrab::{cli, Camera, Config, DisplayConfig};

const IDLE_WAIT_MS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("framegrab=debug")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("framegrab launching...");

    let args = cli::parse_args();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    let mut camera = Camera::new(config.camera.clone());
    camera.open()?;
    if !camera.is_opened() {
        return Err(eyre!("Failed to open camera"));
    }
    camera.start()?;

    let result = show(&mut camera, &config.display);

    camera.stop().await?;
    camera.release()?;

    info!("framegrab shutting down");
    result
}

fn show(camera: &mut Camera, config: &DisplayConfig) -> Result<()> {
    let sdl_context = sdl2::init().map_err(|e| eyre!(e))?;
    let video = sdl_context.video().map_err(|e| eyre!(e))?;

    let mut window = display::open_window(
        &video,
        &config.window_name,
        camera.width(),
        camera.height(),
        &config.title,
    )?;
    window.set_display(config.fullscreen)?;

    run(&sdl_context, &mut window, camera, config.show_fps)
}

/// Loop until the window is closed or Esc/Q is pressed; F toggles fullscreen
fn run(
    sdl_context: &sdl2::Sdl,
    window: &mut DisplayWindow,
    camera: &mut Camera,
    show_fps: bool,
) -> Result<()> {
    let mut event_pump = sdl_context.event_pump().map_err(|e| eyre!(e))?;
    let mut fps = FpsCounter::new();
    let mut warned = false;

    loop {
        for event in event_pump.poll_iter() {
            if handle_event(event, window)? {
                return Ok(());
            }
        }

        let Some(frame) = camera.read()? else {
            // Nothing grabbed yet; block on the event queue instead of spinning
            if let Some(event) = event_pump.wait_event_timeout(IDLE_WAIT_MS) {
                if handle_event(event, window)? {
                    return Ok(());
                }
            }
            continue;
        };

        let frame = if show_fps {
            display::show_fps(frame, fps.fps())
        } else {
            frame
        };
        window.show(&frame)?;
        fps.tick();

        if camera.source().is_some_and(|s| s.uses_thread()) && !camera.is_running() && !warned {
            warn!("Capture stopped, showing the last frame");
            warned = true;
        }
    }
}

/// Returns true when the event asks to quit
fn handle_event(event: Event, window: &mut DisplayWindow) -> Result<bool> {
    match event {
        Event::Quit { .. }
        | Event::KeyDown {
            keycode: Some(Keycode::Escape | Keycode::Q),
            ..
        } => {
            info!("Quit event received");
            return Ok(true);
        }
        Event::KeyDown {
            keycode: Some(Keycode::F),
            ..
        } => window.toggle_fullscreen()?,
        _ => {}
    }
    Ok(false)
}
