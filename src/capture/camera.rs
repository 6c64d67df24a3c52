//! Camera front-end: opens the configured source and serves the latest frame
//!
//! Video files and still images are read synchronously on every `read`.
//! USB and onboard cameras are drained by a blocking task that swaps each
//! new frame into a single latest-frame slot; `read` hands out whatever the
//! slot holds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::capture::frame::Frame;
use crate::capture::source::{CaptureBackend, FrameSource, NativeBackend, Source};
use crate::capture::CameraError;
use crate::CameraConfig;

/// Where the capture handle currently lives
enum Handle {
    Closed,
    Stream(Box<dyn FrameSource>),
    Still(Option<Frame>),
    /// The task owns the stream and hands it back when it exits
    Grabbing(JoinHandle<Box<dyn FrameSource>>),
}

pub struct Camera {
    config: CameraConfig,
    backend: Box<dyn CaptureBackend>,
    source: Option<Source>,
    handle: Handle,
    is_opened: bool,
    width: u32,
    height: u32,
    running: Arc<AtomicBool>,
    latest: Arc<ArcSwapOption<Frame>>,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let backend = NativeBackend::new(config.usb_gstreamer);
        Self::with_backend(config, Box::new(backend))
    }

    pub fn with_backend(config: CameraConfig, backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            config,
            backend,
            source: None,
            handle: Handle::Closed,
            is_opened: false,
            width: 0,
            height: 0,
            running: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Open the configured source and read one frame for its real size.
    ///
    /// `is_opened` is only set when that read yields a frame; a source that
    /// opens but produces nothing is not an error.
    pub fn open(&mut self) -> Result<(), CameraError> {
        if !matches!(self.handle, Handle::Closed) {
            return Err(CameraError::AlreadyOpen);
        }

        let source = Source::resolve(&self.config);
        let (width, height) = (self.config.image_width, self.config.image_height);
        info!("Opening camera source: {:?}", source);

        self.latest.store(None);
        self.handle = match &source {
            Source::VideoFile(path) => Handle::Stream(self.backend.open_file(path)?),
            Source::Image(path) => match self.backend.load_image(path) {
                Ok(frame) => Handle::Still(Some(frame)),
                Err(e) => {
                    warn!("Failed to load {}: {}", path.display(), e);
                    Handle::Still(None)
                }
            },
            Source::Device(dev) => Handle::Stream(self.backend.open_device(*dev, width, height)?),
            Source::Onboard => Handle::Stream(self.backend.open_onboard(width, height)?),
        };

        let first = match &mut self.handle {
            Handle::Stream(stream) => stream.read_frame().unwrap_or_else(|e| {
                warn!("First read failed: {}", e);
                None
            }),
            Handle::Still(frame) => frame.clone(),
            _ => None,
        };

        match first {
            Some(frame) => {
                self.width = frame.width();
                self.height = frame.height();
                self.is_opened = true;
                info!("Camera opened at {}x{}", self.width, self.height);
            }
            None => warn!("Camera source produced no frame"),
        }

        self.source = Some(source);
        Ok(())
    }

    /// Spawn the grabbing task for live cameras; a no-op for files and images.
    pub fn start(&mut self) -> Result<(), CameraError> {
        if matches!(self.handle, Handle::Grabbing(_)) {
            return Err(CameraError::AlreadyRunning);
        }

        let Some(source) = &self.source else {
            return Err(CameraError::NotOpen);
        };
        if !source.uses_thread() {
            return Ok(());
        }

        let stream = match std::mem::replace(&mut self.handle, Handle::Closed) {
            Handle::Stream(stream) => stream,
            other => {
                self.handle = other;
                return Err(CameraError::NotOpen);
            }
        };

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let latest = Arc::clone(&self.latest);
        self.handle = Handle::Grabbing(task::spawn_blocking(move || {
            grab_frames(stream, running, latest)
        }));

        info!("Capture task started");
        Ok(())
    }

    /// Signal the grabbing task and wait for it to exit.
    ///
    /// The flag is checked between reads, so this returns after the read in
    /// flight completes.
    pub async fn stop(&mut self) -> Result<(), CameraError> {
        self.running.store(false, Ordering::Release);

        match std::mem::replace(&mut self.handle, Handle::Closed) {
            Handle::Grabbing(task) => match task.await {
                Ok(stream) => {
                    self.handle = Handle::Stream(stream);
                    info!("Capture task stopped");
                    Ok(())
                }
                Err(e) => {
                    // The stream went down with the task
                    self.reset();
                    Err(CameraError::TaskFailed(e))
                }
            },
            other => {
                self.handle = other;
                match &self.source {
                    Some(source) if source.uses_thread() => Err(CameraError::NotRunning),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Latest frame.
    ///
    /// Files are read directly and rewound at end of stream. Images return a
    /// private copy of the decoded picture. Live cameras return the shared
    /// buffer last stored by the grabbing task.
    pub fn read(&mut self) -> Result<Option<Frame>, CameraError> {
        match (&self.source, &mut self.handle) {
            (None, _) => Err(CameraError::NotOpen),
            (Some(Source::VideoFile(path)), Handle::Stream(stream)) => {
                if let Some(frame) = stream.read_frame()? {
                    return Ok(Some(frame));
                }
                debug!("End of stream, reopening {}", path.display());
                // On failure the exhausted stream stays put and the next read retries
                let fresh = self.backend.open_file(path)?;
                let mut exhausted = std::mem::replace(stream, fresh);
                if let Err(e) = exhausted.release() {
                    warn!("Failed to release finished stream: {}", e);
                }
                stream.read_frame()
            }
            (Some(Source::Image(_)), Handle::Still(frame)) => Ok(frame.as_ref().map(Frame::deep_copy)),
            (Some(_), _) => Ok(self.latest.load_full().map(|frame| Frame::clone(&frame))),
        }
    }

    /// Close the capture handle. The grabbing task must be stopped first.
    pub fn release(&mut self) -> Result<(), CameraError> {
        match std::mem::replace(&mut self.handle, Handle::Closed) {
            Handle::Grabbing(task) => {
                self.handle = Handle::Grabbing(task);
                Err(CameraError::StillRunning)
            }
            Handle::Closed => Err(CameraError::NotOpen),
            Handle::Stream(mut stream) => {
                self.reset();
                stream.release()
            }
            Handle::Still(_) => {
                self.reset();
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.source = None;
        self.is_opened = false;
        self.width = 0;
        self.height = 0;
        self.latest.store(None);
    }

    pub fn is_opened(&self) -> bool {
        self.is_opened
    }

    /// Whether the grabbing task is alive; false after a capture failure
    pub fn is_running(&self) -> bool {
        matches!(self.handle, Handle::Grabbing(_)) && self.running.load(Ordering::Acquire)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        // Detached task exits after its current read
        self.running.store(false, Ordering::Release);
    }
}

/// Background loop: keep the slot filled until told to stop or the source dries up
fn grab_frames(
    mut stream: Box<dyn FrameSource>,
    running: Arc<AtomicBool>,
    latest: Arc<ArcSwapOption<Frame>>,
) -> Box<dyn FrameSource> {
    while running.load(Ordering::Acquire) {
        match stream.read_frame() {
            Ok(Some(frame)) => {
                latest.store(Some(Arc::new(frame)));
                metrics::counter!("frames_grabbed").increment(1);
            }
            Ok(None) => {
                warn!("grab_frames(): source returned no frame");
                break;
            }
            Err(e) => {
                warn!("grab_frames(): read failed: {}", e);
                break;
            }
        }
    }
    running.store(false, Ordering::Release);
    stream
}
