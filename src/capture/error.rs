use thiserror::Error;

use super::frame::PixelFormat;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("onboard camera source not found")]
    SourceNotFound,

    #[error("camera is already opened")]
    AlreadyOpen,

    #[error("camera is not opened")]
    NotOpen,

    #[error("capture task is already running")]
    AlreadyRunning,

    #[error("capture task is not running")]
    NotRunning,

    #[error("capture task must be stopped first")]
    StillRunning,

    #[error("{0} support was not compiled in")]
    BackendUnavailable(&'static str),

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("device error: {0}")]
    Device(#[from] std::io::Error),

    #[error("failed to decode frame: {0}")]
    Decode(#[from] jpeg_decoder::Error),

    #[error("frame is {actual:?}, expected {expected:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("frame holds {actual} bytes, expected {expected}")]
    ShortFrame { expected: usize, actual: usize },

    #[error("unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("capture task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

#[cfg(feature = "gstreamer-pipeline")]
impl From<gstreamer::glib::Error> for CameraError {
    fn from(e: gstreamer::glib::Error) -> Self {
        CameraError::Pipeline(e.to_string())
    }
}

#[cfg(feature = "gstreamer-pipeline")]
impl From<gstreamer::glib::BoolError> for CameraError {
    fn from(e: gstreamer::glib::BoolError) -> Self {
        CameraError::Pipeline(e.to_string())
    }
}
