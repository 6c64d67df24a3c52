//! Source resolution and the capture backend seam

use std::path::{Path, PathBuf};

use tracing::info;

use crate::capture::frame::Frame;
use crate::capture::{still, v4l2, CameraError};
use crate::CameraConfig;

/// An open video source producing decoded frames
pub trait FrameSource: Send {
    /// Next frame, or `None` at end of stream
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Close the underlying device or pipeline
    fn release(&mut self) -> Result<(), CameraError>;
}

/// Opens capture handles for each kind of source
pub trait CaptureBackend: Send + Sync {
    fn open_file(&self, path: &Path) -> Result<Box<dyn FrameSource>, CameraError>;

    fn load_image(&self, path: &Path) -> Result<Frame, CameraError>;

    fn open_device(
        &self,
        index: u32,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn FrameSource>, CameraError>;

    fn open_onboard(&self, width: u32, height: u32) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// The single source a configuration selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    VideoFile(PathBuf),
    Image(PathBuf),
    Device(u32),
    Onboard,
}

impl Source {
    /// Pick the source in priority order: video file, image, device, onboard.
    pub fn resolve(config: &CameraConfig) -> Self {
        if let Some(path) = &config.video_path {
            Source::VideoFile(path.clone())
        } else if let Some(path) = &config.image_path {
            Source::Image(path.clone())
        } else if let Some(dev) = config.video_dev {
            Source::Device(dev)
        } else {
            Source::Onboard
        }
    }

    /// Live cameras are drained by a background task
    pub fn uses_thread(&self) -> bool {
        matches!(self, Source::Device(_) | Source::Onboard)
    }
}

/// GStreamer, V4L2 and `image` backed handles
#[derive(Debug, Clone)]
pub struct NativeBackend {
    usb_gstreamer: bool,
}

impl NativeBackend {
    pub fn new(usb_gstreamer: bool) -> Self {
        Self { usb_gstreamer }
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(feature = "gstreamer-pipeline")]
impl CaptureBackend for NativeBackend {
    fn open_file(&self, path: &Path) -> Result<Box<dyn FrameSource>, CameraError> {
        use crate::capture::{pipeline, GstCapture};

        info!("Opening video file: {}", path.display());
        let capture = GstCapture::launch(&pipeline::file_pipeline(path), false)?;
        Ok(Box::new(capture))
    }

    fn load_image(&self, path: &Path) -> Result<Frame, CameraError> {
        still::load_image(path)
    }

    fn open_device(
        &self,
        index: u32,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        use crate::capture::{pipeline, GstCapture};

        info!("Opening USB camera {} at {}x{}", index, width, height);
        if self.usb_gstreamer {
            let capture = GstCapture::launch(&pipeline::usb_pipeline(index, width, height), true)?;
            Ok(Box::new(capture))
        } else {
            Ok(Box::new(v4l2::V4l2Capture::open(index, width, height)?))
        }
    }

    fn open_onboard(&self, width: u32, height: u32) -> Result<Box<dyn FrameSource>, CameraError> {
        use crate::capture::{pipeline, GstCapture};
        use gstreamer as gst;

        info!("Opening onboard camera at {}x{}", width, height);
        gst::init()?;
        let description = pipeline::onboard_pipeline(width, height, pipeline::element_available)?;
        Ok(Box::new(GstCapture::launch(&description, true)?))
    }
}

#[cfg(not(feature = "gstreamer-pipeline"))]
impl CaptureBackend for NativeBackend {
    fn open_file(&self, _path: &Path) -> Result<Box<dyn FrameSource>, CameraError> {
        Err(CameraError::BackendUnavailable("GStreamer"))
    }

    fn load_image(&self, path: &Path) -> Result<Frame, CameraError> {
        still::load_image(path)
    }

    fn open_device(
        &self,
        index: u32,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        info!("Opening USB camera {} at {}x{}", index, width, height);
        if self.usb_gstreamer {
            info!("GStreamer not compiled in, using V4L2 directly");
        }
        Ok(Box::new(v4l2::V4l2Capture::open(index, width, height)?))
    }

    fn open_onboard(&self, _width: u32, _height: u32) -> Result<Box<dyn FrameSource>, CameraError> {
        Err(CameraError::BackendUnavailable("GStreamer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CameraConfig {
        CameraConfig::default()
    }

    #[test]
    fn video_path_wins() {
        let cfg = CameraConfig {
            video_path: Some("clip.mp4".into()),
            image_path: Some("a.jpg".into()),
            video_dev: Some(0),
            ..config()
        };
        assert_eq!(Source::resolve(&cfg), Source::VideoFile("clip.mp4".into()));
    }

    #[test]
    fn image_path_beats_device() {
        let cfg = CameraConfig {
            image_path: Some("a.jpg".into()),
            video_dev: Some(2),
            ..config()
        };
        assert_eq!(Source::resolve(&cfg), Source::Image("a.jpg".into()));
    }

    #[test]
    fn device_then_onboard() {
        let cfg = CameraConfig {
            video_dev: Some(2),
            ..config()
        };
        assert_eq!(Source::resolve(&cfg), Source::Device(2));
        assert_eq!(Source::resolve(&config()), Source::Onboard);
    }

    #[test]
    fn only_cameras_are_threaded() {
        assert!(Source::Device(0).uses_thread());
        assert!(Source::Onboard.uses_thread());
        assert!(!Source::VideoFile("a.mp4".into()).uses_thread());
        assert!(!Source::Image("a.jpg".into()).uses_thread());
    }
}
