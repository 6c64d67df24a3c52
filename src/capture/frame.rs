use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Frame data with zero-copy semantics
#[derive(Clone)]
pub struct Frame {
    /// Immutable frame data - can be shared across threads without copying
    pub data: Bytes,

    /// Frame metadata
    pub meta: Arc<FrameMetadata>,

    /// Capture timestamp for latency tracking
    pub timestamp: Instant,
}

/// Frame metadata
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    /// Bytes per row
    pub stride: u32,
    pub format: PixelFormat,
    pub device_timestamp: Option<Duration>, // Hardware timestamp if available
}

/// Pixel formats we support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb24,
    Yuyv4,
    Mjpeg,
}

impl Frame {
    /// Wrap a tightly packed RGB24 buffer.
    pub fn from_rgb(data: impl Into<Bytes>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            data: data.into(),
            meta: Arc::new(FrameMetadata {
                sequence,
                width,
                height,
                stride: width * 3,
                format: PixelFormat::Rgb24,
                device_timestamp: None,
            }),
            timestamp: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.meta.width
    }

    pub fn height(&self) -> u32 {
        self.meta.height
    }

    /// Copy the pixel data into a fresh allocation.
    ///
    /// Unlike `clone`, which shares the underlying buffer, the returned frame
    /// owns its own bytes.
    pub fn deep_copy(&self) -> Self {
        Self {
            data: Bytes::copy_from_slice(&self.data),
            meta: Arc::new(FrameMetadata::clone(&self.meta)),
            timestamp: self.timestamp,
        }
    }

    /// Whether two frames point at the same pixel buffer.
    pub fn shares_buffer(&self, other: &Frame) -> bool {
        self.data.as_ptr() == other.data.as_ptr() && self.data.len() == other.data.len()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.data.len())
            .field("meta", &self.meta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_and_deep_copy_does_not() {
        let frame = Frame::from_rgb(vec![7u8; 4 * 2 * 3], 4, 2, 1);

        let shared = frame.clone();
        assert!(shared.shares_buffer(&frame));

        let copy = frame.deep_copy();
        assert!(!copy.shares_buffer(&frame));
        assert_eq!(copy.data, frame.data);
        assert_eq!(copy.meta.stride, 12);
    }
}
