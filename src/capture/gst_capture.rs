//! GStreamer appsink capture for file, USB and onboard sources

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use tracing::{debug, info, instrument, warn};

use crate::capture::frame::{Frame, FrameMetadata, PixelFormat};
use crate::capture::pipeline::APPSINK_NAME;
use crate::capture::source::FrameSource;
use crate::capture::CameraError;

/// GStreamer pipeline terminating in an RGB appsink
pub struct GstCapture {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    sequence: u64,
}

impl GstCapture {
    /// Parse `description` and bring the pipeline to PLAYING.
    ///
    /// Live sources drop stale buffers; file sources deliver every frame.
    pub fn launch(description: &str, live: bool) -> Result<Self, CameraError> {
        gst::init()?;

        info!("Launching GStreamer pipeline");
        debug!("Pipeline: {}", description);

        let pipeline = gst::parse::launch(description)?
            .downcast::<gst::Pipeline>()
            .map_err(|_| CameraError::Pipeline("not a pipeline".into()))?;

        let appsink = pipeline
            .by_name(APPSINK_NAME)
            .ok_or_else(|| CameraError::Pipeline("failed to find appsink element".into()))?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| CameraError::Pipeline("failed to cast to AppSink".into()))?;

        appsink.set_property("emit-signals", false);
        appsink.set_property("sync", false);
        if live {
            appsink.set_property("max-buffers", 3u32);
            appsink.set_property("drop", true);
        }

        let mut capture = Self {
            pipeline,
            appsink,
            sequence: 0,
        };
        capture.play()?;
        Ok(capture)
    }

    fn play(&mut self) -> Result<(), CameraError> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| CameraError::Pipeline(format!("failed to start pipeline: {:?}", e)))?;

        let (state_change, _, _) = self.pipeline.state(Some(gst::ClockTime::from_seconds(5)));
        match state_change {
            Ok(gst::StateChangeSuccess::Success) => {
                info!("Pipeline started successfully");
                Ok(())
            }
            Ok(gst::StateChangeSuccess::Async) | Ok(gst::StateChangeSuccess::NoPreroll) => {
                info!("Pipeline starting asynchronously");
                Ok(())
            }
            Err(e) => Err(CameraError::Pipeline(format!(
                "failed to start pipeline: {:?}",
                e
            ))),
        }
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| CameraError::Pipeline(format!("failed to stop pipeline: {:?}", e)))?;
        Ok(())
    }
}

impl FrameSource for GstCapture {
    #[instrument(skip(self))]
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        let timestamp = Instant::now();

        let sample = match self.appsink.pull_sample() {
            Ok(sample) => sample,
            Err(_) if self.appsink.is_eos() => {
                debug!("End of stream");
                return Ok(None);
            }
            Err(e) => return Err(CameraError::Pipeline(format!("failed to pull sample: {}", e))),
        };

        let buffer = sample
            .buffer()
            .ok_or_else(|| CameraError::Pipeline("sample contains no buffer".into()))?;
        let map = buffer
            .map_readable()
            .map_err(|_| CameraError::Pipeline("failed to map buffer".into()))?;
        let caps = sample
            .caps()
            .ok_or_else(|| CameraError::Pipeline("sample has no caps".into()))?;
        let video_info = gst_video::VideoInfo::from_caps(caps)?;

        let width = video_info.width();
        let height = video_info.height();
        let row = width as usize * 3;
        let stride = video_info.stride()[0] as usize;
        let src = map.as_slice();

        if src.len() < stride * (height as usize).saturating_sub(1) + row {
            warn!("Short buffer: {} bytes for {}x{}", src.len(), width, height);
            return Err(CameraError::Pipeline("short buffer".into()));
        }

        // Pack rows when the converter pads them
        let data = if stride == row {
            Bytes::copy_from_slice(&src[..row * height as usize])
        } else {
            let mut packed = Vec::with_capacity(row * height as usize);
            for line in src.chunks(stride).take(height as usize) {
                packed.extend_from_slice(&line[..row]);
            }
            Bytes::from(packed)
        };

        self.sequence += 1;

        let meta = Arc::new(FrameMetadata {
            sequence: self.sequence,
            width,
            height,
            stride: row as u32,
            format: PixelFormat::Rgb24,
            device_timestamp: buffer.pts().map(|pts| pts.into()),
        });

        Ok(Some(Frame {
            data,
            meta,
            timestamp,
        }))
    }

    fn release(&mut self) -> Result<(), CameraError> {
        info!("Releasing GStreamer pipeline");
        self.stop()
    }
}

impl Drop for GstCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
