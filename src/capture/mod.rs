pub mod camera;
pub mod decoder;
pub mod error;
pub mod frame;
#[cfg(feature = "gstreamer-pipeline")]
pub mod gst_capture;
pub mod pipeline;
pub mod source;
pub mod still;
pub mod v4l2;

pub use camera::Camera;
pub use error::CameraError;
pub use frame::Frame;
pub use frame::PixelFormat;
#[cfg(feature = "gstreamer-pipeline")]
pub use gst_capture::GstCapture;
pub use source::{CaptureBackend, FrameSource, NativeBackend, Source};
pub use v4l2::V4l2Capture;
