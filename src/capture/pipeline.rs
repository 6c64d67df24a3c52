//! GStreamer pipeline descriptions for every streaming source

use std::path::Path;

use tracing::debug;

use crate::capture::CameraError;

/// Name of the appsink every pipeline terminates in
pub const APPSINK_NAME: &str = "appsink";

/// Common tail: convert to packed RGB and hand buffers to the appsink
const RGB_APPSINK: &str = "videoconvert ! video/x-raw,format=RGB ! appsink name=appsink";

/// Onboard camera drivers, newest L4T last
const NVCAMERASRC: &str = "nvcamerasrc";
const NVARGUSCAMERASRC: &str = "nvarguscamerasrc";

/// Decode any container GStreamer understands
pub fn file_pipeline(path: &Path) -> String {
    format!(
        "filesrc location=\"{}\" ! decodebin ! {}",
        escape(&path.to_string_lossy()),
        RGB_APPSINK
    )
}

/// USB webcam through v4l2src
pub fn usb_pipeline(dev: u32, width: u32, height: u32) -> String {
    format!(
        "v4l2src device=/dev/video{} ! \
         video/x-raw, width=(int){}, height=(int){} ! \
         {}",
        dev, width, height, RGB_APPSINK
    )
}

/// Jetson onboard camera.
///
/// `has_element` answers whether a GStreamer element factory is installed.
pub fn onboard_pipeline(
    width: u32,
    height: u32,
    has_element: impl Fn(&str) -> bool,
) -> Result<String, CameraError> {
    let pipeline = if has_element(NVCAMERASRC) {
        // On versions of L4T prior to 28.1, 'flip-method=2' may be needed on nvvidconv.
        format!(
            "nvcamerasrc ! \
             video/x-raw(memory:NVMM), \
             width=(int)2592, height=(int)1458, \
             format=(string)I420, framerate=(fraction)30/1 ! \
             nvvidconv ! \
             video/x-raw, width=(int){}, height=(int){}, \
             format=(string)BGRx ! \
             {}",
            width, height, RGB_APPSINK
        )
    } else if has_element(NVARGUSCAMERASRC) {
        format!(
            "nvarguscamerasrc ! \
             video/x-raw(memory:NVMM), \
             width=(int)1920, height=(int)1080, \
             format=(string)NV12, framerate=(fraction)30/1 ! \
             nvvidconv flip-method=2 ! \
             video/x-raw, width=(int){}, height=(int){}, \
             format=(string)BGRx ! \
             {}",
            width, height, RGB_APPSINK
        )
    } else {
        return Err(CameraError::SourceNotFound);
    };

    debug!("Onboard pipeline: {}", pipeline);
    Ok(pipeline)
}

/// Whether an element factory is registered with GStreamer
#[cfg(feature = "gstreamer-pipeline")]
pub fn element_available(name: &str) -> bool {
    use gstreamer as gst;

    match gst::ElementFactory::find(name) {
        Some(factory) => {
            debug!(
                "Found element: {} - {}",
                name,
                factory.metadata("long-name").unwrap_or("")
            );
            true
        }
        None => false,
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usb_pipeline_carries_device_and_size() {
        let p = usb_pipeline(1, 1280, 720);
        assert!(p.starts_with("v4l2src device=/dev/video1 ! "));
        assert!(p.contains("width=(int)1280, height=(int)720"));
        assert!(p.ends_with("appsink name=appsink"));
    }

    #[test]
    fn file_pipeline_quotes_location() {
        let p = file_pipeline(Path::new("/tmp/my \"clip\".mp4"));
        assert!(p.starts_with("filesrc location=\"/tmp/my \\\"clip\\\".mp4\" ! decodebin"));
        assert!(p.contains("video/x-raw,format=RGB"));
    }

    #[test]
    fn onboard_prefers_legacy_driver() {
        let p = onboard_pipeline(640, 480, |_| true).unwrap();
        assert!(p.starts_with("nvcamerasrc"));
        assert!(p.contains("width=(int)640, height=(int)480"));
    }

    #[test]
    fn onboard_falls_back_to_argus() {
        let p = onboard_pipeline(800, 600, |name| name == NVARGUSCAMERASRC).unwrap();
        assert!(p.starts_with("nvarguscamerasrc"));
        assert!(p.contains("flip-method=2"));
        assert!(p.contains("width=(int)800, height=(int)600"));
    }

    #[test]
    fn onboard_without_driver_is_not_found() {
        let err = onboard_pipeline(640, 480, |_| false).unwrap_err();
        assert!(matches!(err, CameraError::SourceNotFound));
    }
}
