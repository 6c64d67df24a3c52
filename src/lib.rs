pub mod capture;
pub mod cli;
pub mod display;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use capture::{Camera, CameraError, Frame};

/// Environment variables override the file, e.g. `FRAMEGRAB__CAMERA__VIDEO_DEV=1`
pub const ENV_PREFIX: &str = "FRAMEGRAB";

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub display: DisplayConfig,
}

/// Which source to open; the first set field wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_dev: Option<u32>,
    pub image_width: u32,
    pub image_height: u32,
    /// Route USB cameras through GStreamer instead of raw V4L2
    pub usb_gstreamer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_name: String,
    pub title: String,
    pub fullscreen: bool,
    pub show_fps: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            video_path: None,
            image_path: None,
            video_dev: None,
            image_width: 640,
            image_height: 480,
            usb_gstreamer: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_name: "framegrab".into(),
            title: "Camera Demo".into(),
            fullscreen: false,
            show_fps: true,
        }
    }
}

impl Config {
    /// Layer defaults, an optional TOML file and `FRAMEGRAB__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
