//! Media source adapter: binds a camera stream to a video surface.

use std::sync::Arc;

use crossbeam_channel::TryRecvError;
use tracing::{debug, error, info, instrument};

use livecomp_frame::{MediaStream, SurfaceRegistry, VideoAttribute, VideoSurface};
use livecomp_ipc::{CameraConstraints, CameraState};

use crate::error::AcquisitionError;
use crate::{AcquisitionResult, MediaDevices, StreamRequest};

/// A camera state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub previous: CameraState,
    pub current: CameraState,
}

/// Requests a camera stream and binds it to a video surface.
pub struct MediaSourceAdapter {
    devices: Box<dyn MediaDevices>,
    constraints: CameraConstraints,
    state: CameraState,
    video: Option<Arc<VideoSurface>>,
    pending: Option<StreamRequest>,
}

impl MediaSourceAdapter {
    /// Create an adapter that will request streams under `constraints`.
    pub fn new(devices: Box<dyn MediaDevices>, constraints: CameraConstraints) -> Self {
        Self {
            devices,
            constraints,
            state: CameraState::Uninitialised,
            video: None,
            pending: None,
        }
    }

    /// Bind to the named video surface and fire the stream request.
    ///
    /// Returns immediately. Has no effect unless the adapter is
    /// `Uninitialised`.
    #[instrument(name = "media_source_init", skip(self, registry))]
    pub fn initialise(
        &mut self,
        registry: &SurfaceRegistry,
        video_element_id: &str,
    ) -> Option<StateChange> {
        if self.state != CameraState::Uninitialised {
            debug!(state = self.state.name(), "Media source already initialised");
            return None;
        }

        let video = match registry.video(video_element_id) {
            Ok(video) => video,
            Err(e) => return Some(self.fail(e.into())),
        };

        video.set_attribute(VideoAttribute::Muted);
        video.set_attribute(VideoAttribute::PlaysInline);
        video.set_attribute(VideoAttribute::Autoplay);

        info!(constraints = ?self.constraints, "Requesting camera stream");
        self.pending = Some(self.devices.get_user_media(&self.constraints));
        self.video = Some(video);

        Some(self.transition(CameraState::Requesting))
    }

    /// Observe the outstanding request without blocking.
    ///
    /// Performs the single `Requesting -> Ready | Failed` transition when the
    /// request has completed.
    pub fn poll(&mut self) -> Option<StateChange> {
        if !self.state.is_requesting() {
            return None;
        }

        let outcome = match self.pending.as_ref()?.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AcquisitionError::Aborted),
        };
        self.pending = None;

        match outcome.and_then(|stream| self.attach(stream)) {
            Ok(()) => {
                info!("Camera ready");
                Some(self.transition(CameraState::Ready))
            }
            Err(e) => Some(self.fail(e)),
        }
    }

    fn attach(&self, stream: Box<dyn MediaStream>) -> AcquisitionResult<()> {
        let video = self.video.as_ref().ok_or(AcquisitionError::Aborted)?;
        video.bind_stream(stream);
        video.play()?;
        Ok(())
    }

    fn fail(&mut self, err: AcquisitionError) -> StateChange {
        error!(error = %err, "Camera acquisition failed");
        self.pending = None;
        self.transition(CameraState::Failed {
            message: err.to_string(),
        })
    }

    fn transition(&mut self, new_state: CameraState) -> StateChange {
        let previous = std::mem::replace(&mut self.state, new_state.clone());

        debug!(
            previous = %previous.name(),
            current = %new_state.name(),
            "Camera state transition"
        );

        StateChange {
            previous,
            current: new_state,
        }
    }

    /// Current acquisition state.
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Whether the camera stream is bound and playing.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// The bound video surface, once initialised.
    pub fn video_surface(&self) -> Option<&Arc<VideoSurface>> {
        self.video.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stream_request, StreamResolver};
    use livecomp_frame::{ImageSource, PixelBuffer};
    use parking_lot::Mutex;

    struct StubStream;

    impl MediaStream for StubStream {
        fn id(&self) -> &str {
            "stub"
        }

        fn latest_frame(&self) -> Option<PixelBuffer> {
            Some(PixelBuffer::filled(2, 2, [5, 6, 7, 255]))
        }

        fn stop(&self) {}
    }

    #[derive(Clone, Default)]
    struct ManualDevices {
        resolvers: Arc<Mutex<Vec<StreamResolver>>>,
        requests: Arc<Mutex<Vec<CameraConstraints>>>,
    }

    impl ManualDevices {
        fn resolve(&self, outcome: AcquisitionResult<Box<dyn MediaStream>>) {
            let resolver = self.resolvers.lock().pop().unwrap();
            resolver.send(outcome).unwrap();
        }

        fn abandon(&self) {
            self.resolvers.lock().clear();
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl MediaDevices for ManualDevices {
        fn get_user_media(&self, constraints: &CameraConstraints) -> StreamRequest {
            let (tx, rx) = stream_request();
            self.requests.lock().push(*constraints);
            self.resolvers.lock().push(tx);
            rx
        }
    }

    fn setup() -> (ManualDevices, MediaSourceAdapter, SurfaceRegistry) {
        let devices = ManualDevices::default();
        let adapter =
            MediaSourceAdapter::new(Box::new(devices.clone()), CameraConstraints::default());
        let registry = SurfaceRegistry::new();
        registry.insert_video("camera");
        (devices, adapter, registry)
    }

    #[test]
    fn test_initialise_requests_once() {
        let (devices, mut adapter, registry) = setup();

        let change = adapter.initialise(&registry, "camera").unwrap();
        assert_eq!(change.previous, CameraState::Uninitialised);
        assert_eq!(change.current, CameraState::Requesting);
        assert!(adapter.initialise(&registry, "camera").is_none());

        assert_eq!(devices.request_count(), 1);
        assert_eq!(devices.requests.lock()[0], CameraConstraints::default());
    }

    #[test]
    fn test_initialise_sets_presentation_attributes() {
        let (_devices, mut adapter, registry) = setup();
        adapter.initialise(&registry, "camera");

        let video = registry.video("camera").unwrap();
        assert!(video.has_attribute(VideoAttribute::Muted));
        assert!(video.has_attribute(VideoAttribute::PlaysInline));
        assert!(video.has_attribute(VideoAttribute::Autoplay));
    }

    #[test]
    fn test_poll_before_resolution_is_noop() {
        let (_devices, mut adapter, registry) = setup();
        assert!(adapter.poll().is_none());
        adapter.initialise(&registry, "camera");
        assert!(adapter.poll().is_none());
        assert!(adapter.state().is_requesting());
    }

    #[test]
    fn test_success_binds_and_plays() {
        let (devices, mut adapter, registry) = setup();
        adapter.initialise(&registry, "camera");
        devices.resolve(Ok(Box::new(StubStream)));

        let change = adapter.poll().unwrap();
        assert_eq!(change.current, CameraState::Ready);
        assert!(adapter.is_ready());

        let video = registry.video("camera").unwrap();
        assert!(video.is_playing());
        assert_eq!(video.current_frame().unwrap().pixel(0, 0), Some([5, 6, 7, 255]));

        // Terminal: no further transitions.
        assert!(adapter.poll().is_none());
        assert!(adapter.initialise(&registry, "camera").is_none());
    }

    #[test]
    fn test_failure_is_terminal() {
        let (devices, mut adapter, registry) = setup();
        adapter.initialise(&registry, "camera");
        devices.resolve(Err(AcquisitionError::PermissionDenied));

        let change = adapter.poll().unwrap();
        assert!(change.current.is_failed());
        assert!(!adapter.is_ready());
        assert!(adapter.poll().is_none());
        assert!(adapter.initialise(&registry, "camera").is_none());
        assert_eq!(devices.request_count(), 1);
    }

    #[test]
    fn test_dropped_request_counts_as_failure() {
        let (devices, mut adapter, registry) = setup();
        adapter.initialise(&registry, "camera");
        devices.abandon();

        let change = adapter.poll().unwrap();
        assert_eq!(
            change.current,
            CameraState::Failed {
                message: AcquisitionError::Aborted.to_string()
            }
        );
    }

    #[test]
    fn test_missing_surface_fails_without_request() {
        let devices = ManualDevices::default();
        let mut adapter =
            MediaSourceAdapter::new(Box::new(devices.clone()), CameraConstraints::default());
        let registry = SurfaceRegistry::new();

        let change = adapter.initialise(&registry, "camera").unwrap();
        assert!(change.current.is_failed());
        assert_eq!(devices.request_count(), 0);
        assert!(adapter.video_surface().is_none());
    }
}
