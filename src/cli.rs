use std::path::PathBuf;

use clap::Parser;

use crate::Config;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Show frames from a video file, image or camera", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use a video file as input
    #[arg(long, alias = "video_path")]
    pub video_path: Option<PathBuf>,

    /// Use an image file as input
    #[arg(long, alias = "image_path")]
    pub image_path: Option<PathBuf>,

    /// Device number, e.g. 0 for /dev/video0
    #[arg(long, alias = "video_dev")]
    pub video_dev: Option<u32>,

    /// Image width
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    /// Hide the FPS overlay
    #[arg(long)]
    pub no_fps: bool,

    /// Read USB cameras through V4L2 instead of GStreamer
    #[arg(long)]
    pub no_usb_gstreamer: bool,
}

impl Args {
    /// Command line flags take precedence over the file and environment
    pub fn apply(&self, config: &mut Config) {
        let camera = &mut config.camera;
        if let Some(path) = &self.video_path {
            camera.video_path = Some(path.clone());
        }
        if let Some(path) = &self.image_path {
            camera.image_path = Some(path.clone());
        }
        if let Some(dev) = self.video_dev {
            camera.video_dev = Some(dev);
        }
        if let Some(width) = self.width {
            camera.image_width = width;
        }
        if let Some(height) = self.height {
            camera.image_height = height;
        }
        if self.no_usb_gstreamer {
            camera.usb_gstreamer = false;
        }

        let display = &mut config.display;
        if self.fullscreen {
            display.fullscreen = true;
        }
        if self.no_fps {
            display.show_fps = false;
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_underscore_spellings() {
        let args = Args::try_parse_from([
            "framegrab",
            "--video_dev",
            "1",
            "--width",
            "1280",
            "--height",
            "720",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.camera.video_dev, Some(1));
        assert_eq!(config.camera.image_width, 1280);
        assert_eq!(config.camera.image_height, 720);
        assert!(config.camera.video_path.is_none());
    }

    #[test]
    fn unset_flags_keep_config() {
        let mut config = Config::default();
        config.camera.image_path = Some("a.jpg".into());
        config.display.fullscreen = true;

        Args::default().apply(&mut config);
        assert_eq!(config.camera.image_path, Some("a.jpg".into()));
        assert!(config.display.fullscreen);
        assert!(config.camera.usb_gstreamer);
    }

    #[test]
    fn switches_off_overlay_and_gstreamer() {
        let args =
            Args::try_parse_from(["framegrab", "--no-fps", "--no-usb-gstreamer"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(!config.display.show_fps);
        assert!(!config.camera.usb_gstreamer);
    }
}
