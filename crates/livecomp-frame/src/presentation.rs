//! Named presentation surfaces.
//!
//! Surfaces are provisioned by the host before the pipeline starts and are
//! resolved by logical name once, at initialization.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::FrameError;
use crate::pixel::PixelBuffer;
use crate::source::{ImageSource, MediaStream};
use crate::FrameResult;

/// Presentation attributes a video surface can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoAttribute {
    /// No audio output.
    Muted,

    /// Play inline instead of fullscreen.
    PlaysInline,

    /// Start playback as soon as a source is bound.
    Autoplay,
}

#[derive(Debug, Default, Clone, Copy)]
struct VideoAttributes {
    muted: bool,
    plays_inline: bool,
    autoplay: bool,
}

/// A surface that presents a live media stream.
pub struct VideoSurface {
    name: String,
    attributes: Mutex<VideoAttributes>,
    stream: Mutex<Option<Box<dyn MediaStream>>>,
    playing: AtomicBool,
}

impl VideoSurface {
    /// Create an empty video surface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Mutex::new(VideoAttributes::default()),
            stream: Mutex::new(None),
            playing: AtomicBool::new(false),
        }
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a presentation attribute.
    pub fn set_attribute(&self, attribute: VideoAttribute) {
        let mut attributes = self.attributes.lock();
        match attribute {
            VideoAttribute::Muted => attributes.muted = true,
            VideoAttribute::PlaysInline => attributes.plays_inline = true,
            VideoAttribute::Autoplay => attributes.autoplay = true,
        }
    }

    /// Whether a presentation attribute is set.
    pub fn has_attribute(&self, attribute: VideoAttribute) -> bool {
        let attributes = self.attributes.lock();
        match attribute {
            VideoAttribute::Muted => attributes.muted,
            VideoAttribute::PlaysInline => attributes.plays_inline,
            VideoAttribute::Autoplay => attributes.autoplay,
        }
    }

    /// Bind a stream as the live source, stopping any previous one.
    pub fn bind_stream(&self, stream: Box<dyn MediaStream>) {
        debug!(surface = %self.name, stream = %stream.id(), "Binding stream");

        let previous = self.stream.lock().replace(stream);
        if let Some(previous) = previous {
            previous.stop();
        }
        self.playing.store(false, Ordering::SeqCst);
    }

    /// Start playback of the bound stream.
    pub fn play(&self) -> FrameResult<()> {
        if self.stream.lock().is_none() {
            return Err(FrameError::NoSource(self.name.clone()));
        }

        self.playing.store(true, Ordering::SeqCst);
        info!(surface = %self.name, "Video playback started");
        Ok(())
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl ImageSource for VideoSurface {
    fn current_frame(&self) -> Option<PixelBuffer> {
        if !self.is_playing() {
            return None;
        }
        self.stream.lock().as_ref()?.latest_frame()
    }
}

impl Drop for VideoSurface {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.lock().take() {
            stream.stop();
        }
    }
}

/// Size of a 2D canvas surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

/// A surface the compositor presents rendered frames to.
pub struct OutputSurface {
    name: String,
    latest: Mutex<Option<PixelBuffer>>,
    presented: AtomicU64,
}

impl OutputSurface {
    /// Create an empty output surface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latest: Mutex::new(None),
            presented: AtomicU64::new(0),
        }
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Show a rendered frame.
    pub fn present(&self, frame: PixelBuffer) {
        *self.latest.lock() = Some(frame);
        self.presented.fetch_add(1, Ordering::Relaxed);
    }

    /// The most recently presented frame.
    pub fn latest_frame(&self) -> Option<PixelBuffer> {
        self.latest.lock().clone()
    }

    /// Number of frames presented so far.
    pub fn presented_count(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }
}

/// A registered presentation surface.
#[derive(Clone)]
pub enum Surface {
    Video(Arc<VideoSurface>),
    Canvas(CanvasSpec),
    Output(Arc<OutputSurface>),
}

impl Surface {
    /// Returns the kind of surface as a string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Canvas(_) => "canvas",
            Self::Output(_) => "output",
        }
    }
}

/// Name-addressed collection of presentation surfaces.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Arc<RwLock<HashMap<String, Surface>>>,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a video surface, replacing anything under the same name.
    pub fn insert_video(&self, name: &str) -> Arc<VideoSurface> {
        let surface = Arc::new(VideoSurface::new(name));
        self.insert(name, Surface::Video(Arc::clone(&surface)));
        surface
    }

    /// Register a canvas surface.
    pub fn insert_canvas(&self, name: &str, width: u32, height: u32) {
        self.insert(name, Surface::Canvas(CanvasSpec { width, height }));
    }

    /// Register an output surface.
    pub fn insert_output(&self, name: &str) -> Arc<OutputSurface> {
        let surface = Arc::new(OutputSurface::new(name));
        self.insert(name, Surface::Output(Arc::clone(&surface)));
        surface
    }

    fn insert(&self, name: &str, surface: Surface) {
        debug!(name, kind = surface.kind(), "Registering surface");
        self.surfaces.write().insert(name.to_string(), surface);
    }

    /// Look up a surface by name.
    pub fn get(&self, name: &str) -> FrameResult<Surface> {
        self.surfaces
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FrameError::SurfaceNotFound(name.to_string()))
    }

    /// Resolve a video surface.
    pub fn video(&self, name: &str) -> FrameResult<Arc<VideoSurface>> {
        match self.get(name)? {
            Surface::Video(surface) => Ok(surface),
            other => Err(mismatch(name, "video", &other)),
        }
    }

    /// Resolve a canvas surface.
    pub fn canvas(&self, name: &str) -> FrameResult<CanvasSpec> {
        match self.get(name)? {
            Surface::Canvas(spec) => Ok(spec),
            other => Err(mismatch(name, "canvas", &other)),
        }
    }

    /// Resolve an output surface.
    pub fn output(&self, name: &str) -> FrameResult<Arc<OutputSurface>> {
        match self.get(name)? {
            Surface::Output(surface) => Ok(surface),
            other => Err(mismatch(name, "output", &other)),
        }
    }
}

fn mismatch(name: &str, expected: &'static str, actual: &Surface) -> FrameError {
    FrameError::SurfaceKindMismatch {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct FixedStream {
        frame: PixelBuffer,
        stops: Arc<AtomicUsize>,
    }

    impl MediaStream for FixedStream {
        fn id(&self) -> &str {
            "fixed"
        }

        fn latest_frame(&self) -> Option<PixelBuffer> {
            Some(self.frame.clone())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fixed(stops: &Arc<AtomicUsize>) -> Box<dyn MediaStream> {
        Box::new(FixedStream {
            frame: PixelBuffer::filled(2, 2, [9, 9, 9, 255]),
            stops: Arc::clone(stops),
        })
    }

    #[test]
    fn test_lookup_by_kind() {
        let registry = SurfaceRegistry::new();
        registry.insert_video("camera");
        registry.insert_canvas("input", 640, 480);
        registry.insert_output("output");

        assert_eq!(registry.video("camera").unwrap().name(), "camera");
        assert_eq!(
            registry.canvas("input").unwrap(),
            CanvasSpec {
                width: 640,
                height: 480
            }
        );
        assert_eq!(registry.output("output").unwrap().name(), "output");
    }

    #[test]
    fn test_kind_mismatch() {
        let registry = SurfaceRegistry::new();
        registry.insert_canvas("camera", 1, 1);
        assert!(matches!(
            registry.video("camera"),
            Err(FrameError::SurfaceKindMismatch { expected: "video", actual: "canvas", .. })
        ));
    }

    #[test]
    fn test_missing_surface() {
        let registry = SurfaceRegistry::new();
        assert!(matches!(
            registry.output("output"),
            Err(FrameError::SurfaceNotFound(_))
        ));
    }

    #[test]
    fn test_video_attributes() {
        let video = VideoSurface::new("camera");
        assert!(!video.has_attribute(VideoAttribute::Muted));
        video.set_attribute(VideoAttribute::Muted);
        video.set_attribute(VideoAttribute::Autoplay);
        assert!(video.has_attribute(VideoAttribute::Muted));
        assert!(video.has_attribute(VideoAttribute::Autoplay));
        assert!(!video.has_attribute(VideoAttribute::PlaysInline));
    }

    #[test]
    fn test_video_yields_frames_only_while_playing() {
        let stops = Arc::new(AtomicUsize::new(0));
        let video = VideoSurface::new("camera");
        assert!(video.current_frame().is_none());
        assert!(matches!(video.play(), Err(FrameError::NoSource(_))));

        video.bind_stream(fixed(&stops));
        assert!(video.current_frame().is_none());

        video.play().unwrap();
        assert!(video.is_playing());
        assert_eq!(video.current_frame().unwrap().pixel(0, 0), Some([9, 9, 9, 255]));
    }

    #[test]
    fn test_rebinding_stops_previous_stream() {
        let stops = Arc::new(AtomicUsize::new(0));
        let video = VideoSurface::new("camera");
        video.bind_stream(fixed(&stops));
        video.bind_stream(fixed(&stops));
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        drop(video);
        assert_eq!(stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_output_present() {
        let output = OutputSurface::new("output");
        assert!(output.latest_frame().is_none());
        output.present(PixelBuffer::filled(1, 1, [1, 2, 3, 4]));
        assert_eq!(output.presented_count(), 1);
        assert_eq!(output.latest_frame().unwrap().pixel(0, 0), Some([1, 2, 3, 4]));
    }
}
