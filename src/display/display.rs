//! SDL2 display window
//! Opens a named, resizable window, switches it between fullscreen and
//! normal, and presents RGB24 frames.

use color_eyre::{eyre::eyre, Result};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use sdl2::VideoSubsystem;

use tracing::{debug, info};

use crate::capture::{Frame, PixelFormat};

/// A window frames are shown in
pub struct DisplayWindow {
    name: String,
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    fullscreen: bool,
}

/// Open a resizable window of the given size and title
pub fn open_window(
    video: &VideoSubsystem,
    name: &str,
    width: u32,
    height: u32,
    title: &str,
) -> Result<DisplayWindow> {
    info!("Opening window '{}' ({}x{})", name, width, height);

    let window = video
        .window(title, width, height)
        .position_centered()
        .resizable()
        .build()?;

    let canvas = window.into_canvas().present_vsync().build()?;
    let texture_creator = canvas.texture_creator();

    Ok(DisplayWindow {
        name: name.to_string(),
        canvas,
        texture_creator,
        fullscreen: false,
    })
}

impl DisplayWindow {
    /// Switch between fullscreen and a normal window
    pub fn set_display(&mut self, full_scrn: bool) -> Result<()> {
        let mode = if full_scrn {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.canvas
            .window_mut()
            .set_fullscreen(mode)
            .map_err(|e| eyre!(e))?;
        self.fullscreen = full_scrn;
        debug!("Window '{}' fullscreen: {}", self.name, full_scrn);
        Ok(())
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.set_display(!self.fullscreen)
    }

    /// Upload an RGB24 frame and present it scaled to the window
    pub fn show(&mut self, frame: &Frame) -> Result<()> {
        if frame.meta.format != PixelFormat::Rgb24 {
            return Err(eyre!("Cannot display {:?} frames", frame.meta.format));
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, frame.width(), frame.height())
            .map_err(|e| eyre!(e))?;

        texture
            .update(None, &frame.data, frame.meta.stride as usize)
            .map_err(|e| eyre!(e))?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(|e| eyre!(e))?;

        self.canvas.present();
        Ok(())
    }
}
