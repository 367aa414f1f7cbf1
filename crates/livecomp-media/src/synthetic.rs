//! A synthetic camera producing an animated test pattern.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, warn};

use livecomp_frame::{MediaStream, PixelBuffer, CHANNELS};
use livecomp_ipc::CameraConstraints;

use crate::error::AcquisitionError;
use crate::{stream_request, AcquisitionResult, MediaDevices, StreamRequest};

/// SMPTE-style colour bars, left to right.
const BARS: [[u8; 4]; 8] = [
    [255, 255, 255, 255],
    [255, 255, 0, 255],
    [0, 255, 255, 255],
    [0, 255, 0, 255],
    [255, 0, 255, 255],
    [255, 0, 0, 255],
    [0, 0, 255, 255],
    [0, 0, 0, 255],
];

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// A camera that resolves requests on a background thread.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    modes: Vec<(u32, u32)>,
    permission_granted: bool,
    startup_delay: Duration,
    fps: u32,
}

impl SyntheticCamera {
    /// A camera supporting 640×480 and 1280×720 at 30 fps.
    pub fn new() -> Self {
        Self {
            modes: vec![(640, 480), (1280, 720)],
            permission_granted: true,
            startup_delay: Duration::from_millis(50),
            fps: 30,
        }
    }

    /// Replace the supported `(width, height)` modes. An empty list behaves
    /// like a missing device.
    pub fn with_modes(mut self, modes: Vec<(u32, u32)>) -> Self {
        self.modes = modes;
        self
    }

    /// Refuse every request with a permission error.
    pub fn deny_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    /// Delay before a request resolves.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    fn open(&self, constraints: &CameraConstraints) -> AcquisitionResult<TestPatternStream> {
        if !self.permission_granted {
            return Err(AcquisitionError::PermissionDenied);
        }
        if self.modes.is_empty() {
            return Err(AcquisitionError::DeviceNotFound);
        }
        if constraints.audio {
            return Err(AcquisitionError::ConstraintNotSatisfied {
                constraint: "audio".to_string(),
            });
        }

        let (width, height) = constraints.dimensions();
        if width == 0 {
            return Err(AcquisitionError::ConstraintNotSatisfied {
                constraint: "width".to_string(),
            });
        }
        if height == 0 {
            return Err(AcquisitionError::ConstraintNotSatisfied {
                constraint: "height".to_string(),
            });
        }
        if !self.modes.iter().any(|&(w, _)| w == width) {
            return Err(AcquisitionError::ConstraintNotSatisfied {
                constraint: "width".to_string(),
            });
        }
        if !self.modes.contains(&(width, height)) {
            return Err(AcquisitionError::ConstraintNotSatisfied {
                constraint: "height".to_string(),
            });
        }

        Ok(TestPatternStream::new(width, height, self.fps))
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDevices for SyntheticCamera {
    fn get_user_media(&self, constraints: &CameraConstraints) -> StreamRequest {
        let (tx, rx) = stream_request();
        let camera = self.clone();
        let constraints = *constraints;

        let spawned = thread::Builder::new()
            .name("synthetic-camera".to_string())
            .spawn(move || {
                thread::sleep(camera.startup_delay);
                let outcome = camera
                    .open(&constraints)
                    .map(|stream| Box::new(stream) as Box<dyn MediaStream>);
                if tx.send(outcome).is_err() {
                    debug!("Camera request dropped before completion");
                }
            });

        // On spawn failure the sender is dropped with the closure, so the
        // request resolves as aborted.
        if let Err(e) = spawned {
            warn!("Failed to start camera thread: {}", e);
        }

        rx
    }
}

/// A live stream of scrolling colour bars.
pub struct TestPatternStream {
    id: String,
    width: u32,
    height: u32,
    frame_period: Duration,
    started: Instant,
    live: AtomicBool,
}

impl TestPatternStream {
    /// Create a stream producing `width`×`height` frames at `fps`.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        let id = format!("synthetic-{}", NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            width,
            height,
            frame_period: Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1))),
            started: Instant::now(),
            live: AtomicBool::new(true),
        }
    }

    /// Index of the frame showing at `elapsed` since start.
    fn frame_index(&self, elapsed: Duration) -> u64 {
        (elapsed.as_nanos() / self.frame_period.as_nanos()) as u64
    }

    /// Render frame number `index`. A zero-sized stream yields an empty,
    /// invalid buffer.
    pub fn render_frame(&self, index: u64) -> PixelBuffer {
        let w = self.width as usize;
        let h = self.height as usize;
        if w == 0 || h == 0 {
            return PixelBuffer::new(Bytes::new(), self.width, self.height);
        }
        let bar_width = (w / BARS.len()).max(1);
        let shift = (index % w as u64) as usize;

        let mut row = Vec::with_capacity(w * CHANNELS);
        for x in 0..w {
            let bar = ((x + shift) % w / bar_width).min(BARS.len() - 1);
            row.extend_from_slice(&BARS[bar]);
        }

        let mut data = Vec::with_capacity(row.len() * h);
        for _ in 0..h {
            data.extend_from_slice(&row);
        }

        PixelBuffer::new(Bytes::from(data), self.width, self.height)
    }
}

impl MediaStream for TestPatternStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn latest_frame(&self) -> Option<PixelBuffer> {
        if !self.live.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.render_frame(self.frame_index(self.started.elapsed())))
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(stream = %self.id, "Test pattern stream stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        camera: &SyntheticCamera,
        constraints: &CameraConstraints,
    ) -> AcquisitionResult<Box<dyn MediaStream>> {
        camera
            .get_user_media(constraints)
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_resolves_with_requested_size() {
        let camera = SyntheticCamera::new().with_startup_delay(Duration::ZERO);
        let stream = request(&camera, &CameraConstraints::default()).unwrap();
        let frame = stream.latest_frame().unwrap();
        assert!(frame.is_valid());
        assert_eq!((frame.width, frame.height), (640, 480));
    }

    #[test]
    fn test_permission_denied() {
        let camera = SyntheticCamera::new()
            .deny_permission()
            .with_startup_delay(Duration::ZERO);
        assert!(matches!(
            request(&camera, &CameraConstraints::default()),
            Err(AcquisitionError::PermissionDenied)
        ));
    }

    #[test]
    fn test_no_modes_means_no_device() {
        let camera = SyntheticCamera::new()
            .with_modes(Vec::new())
            .with_startup_delay(Duration::ZERO);
        assert!(matches!(
            request(&camera, &CameraConstraints::default()),
            Err(AcquisitionError::DeviceNotFound)
        ));
    }

    #[test]
    fn test_unsupported_exact_size() {
        let camera = SyntheticCamera::new()
            .with_modes(vec![(640, 360)])
            .with_startup_delay(Duration::ZERO);
        match request(&camera, &CameraConstraints::default()) {
            Err(AcquisitionError::ConstraintNotSatisfied { constraint }) => {
                assert_eq!(constraint, "height")
            }
            _ => panic!("expected height constraint failure"),
        }

        match request(&camera, &CameraConstraints::exact(800, 600)) {
            Err(AcquisitionError::ConstraintNotSatisfied { constraint }) => {
                assert_eq!(constraint, "width")
            }
            _ => panic!("expected width constraint failure"),
        }
    }

    #[test]
    fn test_zero_sized_mode_rejected() {
        let camera = SyntheticCamera::new()
            .with_modes(vec![(0, 480), (640, 0)])
            .with_startup_delay(Duration::ZERO);
        match request(&camera, &CameraConstraints::exact(0, 480)) {
            Err(AcquisitionError::ConstraintNotSatisfied { constraint }) => {
                assert_eq!(constraint, "width")
            }
            _ => panic!("expected width constraint failure"),
        }
        match request(&camera, &CameraConstraints::exact(640, 0)) {
            Err(AcquisitionError::ConstraintNotSatisfied { constraint }) => {
                assert_eq!(constraint, "height")
            }
            _ => panic!("expected height constraint failure"),
        }
    }

    #[test]
    fn test_zero_sized_stream_renders_invalid_frame() {
        let stream = TestPatternStream::new(0, 8, 30);
        let frame = stream.latest_frame().unwrap();
        assert!(!frame.is_valid());
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_stopped_stream_yields_nothing() {
        let stream = TestPatternStream::new(16, 8, 30);
        assert!(stream.latest_frame().is_some());
        stream.stop();
        assert!(stream.latest_frame().is_none());
    }

    #[test]
    fn test_pattern_scrolls() {
        let stream = TestPatternStream::new(16, 2, 30);
        let first = stream.render_frame(0);
        let second = stream.render_frame(1);
        assert_eq!(first.pixel(0, 0), Some(BARS[0]));
        assert_eq!(first.pixel(15, 1), Some(BARS[7]));
        assert_ne!(first, second);
        assert_eq!(stream.render_frame(16), first);
    }
}
