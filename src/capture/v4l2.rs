//! Direct V4L2 capture for USB cameras when GStreamer is not used

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{info, instrument, warn};
use v4l::buffer::Type;
use v4l::capability::Flags as CapFlags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::capture::decoder;
use crate::capture::frame::{Frame, FrameMetadata, PixelFormat};
use crate::capture::source::FrameSource;
use crate::capture::CameraError;

const BUFFER_COUNT: u32 = 4;

/// Memory-mapped V4L2 stream decoding to RGB24
pub struct V4l2Capture {
    _device: Device,
    stream: Option<MmapStream<'static>>,
    width: u32,
    height: u32,
    format: PixelFormat,
    sequence: u64,
}

impl V4l2Capture {
    /// Open `/dev/video{index}` and start streaming at the closest supported size
    pub fn open(index: u32, width: u32, height: u32) -> Result<Self, CameraError> {
        info!("Initializing V4L2 capture: /dev/video{}", index);

        let device = Device::new(index as usize)?;

        let caps = device.query_caps()?;
        info!("Device: {} ({})", caps.card, caps.driver);

        if !caps.capabilities.contains(CapFlags::VIDEO_CAPTURE) {
            return Err(CameraError::Device(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "device doesn't support video capture",
            )));
        }

        // Prefer MJPEG, fall back to YUYV
        let mut fmt = device.format()?;
        fmt.width = width;
        fmt.height = height;
        fmt.fourcc = FourCC::new(b"MJPG");
        let mut actual = device.set_format(&fmt)?;
        if actual.fourcc != FourCC::new(b"MJPG") {
            fmt.fourcc = FourCC::new(b"YUYV");
            actual = device.set_format(&fmt)?;
        }

        let format = if actual.fourcc == FourCC::new(b"MJPG") {
            PixelFormat::Mjpeg
        } else if actual.fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv4
        } else {
            return Err(CameraError::Device(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("unsupported fourcc {}", actual.fourcc),
            )));
        };

        if actual.width != width || actual.height != height {
            warn!(
                "Requested {}x{}, device negotiated {}x{}",
                width, height, actual.width, actual.height
            );
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;
        info!("Capture stream started with {} buffers", BUFFER_COUNT);

        Ok(Self {
            _device: device,
            stream: Some(stream),
            width: actual.width,
            height: actual.height,
            format,
            sequence: 0,
        })
    }
}

impl FrameSource for V4l2Capture {
    #[instrument(skip(self))]
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        let timestamp = Instant::now();

        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let (buf, meta) = stream.next()?;
        let used = match meta.bytesused as usize {
            0 => buf.len(),
            n => n.min(buf.len()),
        };
        let rgb = decoder::decode_frame(&buf[..used], self.format, self.width, self.height)?;

        self.sequence += 1;

        let frame_meta = Arc::new(FrameMetadata {
            sequence: self.sequence,
            width: self.width,
            height: self.height,
            stride: self.width * 3,
            format: PixelFormat::Rgb24,
            device_timestamp: Some(
                Duration::from_secs(meta.timestamp.sec as u64)
                    + Duration::from_micros(meta.timestamp.usec as u64),
            ),
        });

        Ok(Some(Frame {
            data: Bytes::from(rgb),
            meta: frame_meta,
            timestamp,
        }))
    }

    fn release(&mut self) -> Result<(), CameraError> {
        info!("Releasing V4L2 stream");
        // Dropping the stream unmaps the buffers and stops streaming
        self.stream = None;
        Ok(())
    }
}
