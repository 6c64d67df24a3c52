use std::path::Path;

use tracing::info;

use crate::capture::frame::Frame;
use crate::capture::CameraError;

/// Decode a still image (jpg, png) into an RGB24 frame
pub fn load_image(path: &Path) -> Result<Frame, CameraError> {
    info!("Loading still image: {}", path.display());

    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(Frame::from_rgb(rgb.into_raw(), width, height, 0))
}
