//! Pipeline controller: initialization sequencing and the per-tick cycle.

use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::{debug, info, instrument, trace, warn};

use livecomp_compositor::{Compositor, CompositorResult};
use livecomp_frame::{FrameSurface, SurfaceRegistry};
use livecomp_ipc::{CameraConstraints, CameraState, PipelineConfig, PipelineEvent};
use livecomp_media::{MediaDevices, MediaSourceAdapter, StateChange};

use crate::metrics::MetricsCollector;
use crate::state::PipelineState;
use crate::EngineResult;

/// What the capture step did on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Not initialised; no frame surface exists yet.
    Skipped,

    /// Ran, but the video surface had nothing to draw.
    Blank,

    /// A camera frame was drawn into the frame surface.
    Frame,
}

/// What the dispatch step did on a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Gated off: not initialised or camera not ready.
    Skipped,

    /// `copy` and `render` both succeeded.
    Rendered,

    /// A compositor call failed; the error was logged and discarded.
    Failed(String),
}

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Initialization completed on this tick.
    pub initialised_now: bool,
    pub capture: CaptureOutcome,
    pub dispatch: DispatchOutcome,
}

/// Drives camera frames through the frame surface into the compositor.
///
/// The controller does no scheduling of its own: the host calls
/// [`PipelineController::tick`] once per display refresh, arming the next
/// tick before it does so.
pub struct PipelineController {
    config: PipelineConfig,
    registry: SurfaceRegistry,
    compositor: Box<dyn Compositor>,
    media: MediaSourceAdapter,
    frame: Option<FrameSurface>,
    state: PipelineState,
    metrics: Arc<MetricsCollector>,
    event_tx: Option<Sender<PipelineEvent>>,
}

impl PipelineController {
    /// Create a controller. Nothing is initialised until the first tick.
    pub fn new(
        config: PipelineConfig,
        registry: SurfaceRegistry,
        compositor: Box<dyn Compositor>,
        devices: Box<dyn MediaDevices>,
    ) -> Self {
        let media = MediaSourceAdapter::new(devices, CameraConstraints::default());
        let metrics = Arc::new(MetricsCollector::new(config.refresh_rate_hz));

        Self {
            config,
            registry,
            compositor,
            media,
            frame: None,
            state: PipelineState::default(),
            metrics,
            event_tx: None,
        }
    }

    /// Send pipeline events to `event_tx`.
    pub fn with_events(mut self, event_tx: Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Run one tick: initialise if needed, capture, then dispatch.
    ///
    /// Never fails; compositor errors are logged and reported in the
    /// returned [`TickReport`].
    pub fn tick(&mut self) -> TickReport {
        self.metrics.record_tick();

        let initialised_now = self.ensure_initialised();
        self.observe_camera();
        let capture = self.capture_step();

        let dispatch = match self.dispatch_step() {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Compositor dispatch failed");
                self.metrics.record_dispatch_failure();
                let message = e.to_string();
                self.send_event(PipelineEvent::CompositorFailed {
                    message: message.clone(),
                });
                DispatchOutcome::Failed(message)
            }
        };

        TickReport {
            initialised_now,
            capture,
            dispatch,
        }
    }

    /// Initialise the compositor, frame surface and camera, once.
    ///
    /// Returns true only on the tick that completes initialization. Skipped
    /// while the compositor is not loaded; a failed attempt is retried on
    /// the next call.
    pub fn ensure_initialised(&mut self) -> bool {
        if self.state.initialised {
            return false;
        }

        if !self.compositor.is_available() {
            trace!("Compositor not loaded yet, deferring initialisation");
            return false;
        }

        match self.initialise() {
            Ok(()) => {
                self.state.initialised = true;
                info!("Pipeline initialised");
                self.send_event(PipelineEvent::Initialised);
                true
            }
            Err(e) => {
                warn!(error = %e, "Pipeline initialisation deferred");
                self.send_event(PipelineEvent::InitialisationDeferred {
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    #[instrument(name = "pipeline_init", skip(self))]
    fn initialise(&mut self) -> EngineResult<()> {
        self.compositor.initialise(&self.config.output_surface)?;

        let surface = FrameSurface::initialise(&self.registry, &self.config.input_surface)?;
        self.frame = Some(surface);

        if let Some(change) = self
            .media
            .initialise(&self.registry, &self.config.camera_surface)
        {
            self.on_camera_change(change);
        }

        Ok(())
    }

    fn observe_camera(&mut self) {
        if let Some(change) = self.media.poll() {
            self.on_camera_change(change);
        }
    }

    fn on_camera_change(&mut self, change: StateChange) {
        self.state.camera_ready = self.media.is_ready();
        self.send_event(PipelineEvent::CameraStateChanged {
            previous: change.previous,
            current: change.current,
        });
    }

    /// Draw the current video frame into the frame surface.
    pub fn capture_step(&mut self) -> CaptureOutcome {
        if !self.state.can_capture() {
            return CaptureOutcome::Skipped;
        }
        let Some(frame) = self.frame.as_mut() else {
            return CaptureOutcome::Skipped;
        };

        self.metrics.record_capture();

        let drew = match self.media.video_surface() {
            Some(video) => frame.capture_from(video.as_ref()),
            None => false,
        };

        if drew {
            CaptureOutcome::Frame
        } else {
            CaptureOutcome::Blank
        }
    }

    /// Hand the frame surface to the compositor and render.
    ///
    /// Gated on `initialised && camera_ready`. A failed `copy` skips
    /// `render` so a partial frame is never presented.
    pub fn dispatch_step(&mut self) -> CompositorResult<DispatchOutcome> {
        if !self.state.can_dispatch() {
            return Ok(DispatchOutcome::Skipped);
        }
        let Some(frame) = self.frame.as_ref() else {
            return Ok(DispatchOutcome::Skipped);
        };

        let pixels = frame.read_pixels();
        self.compositor.copy(&pixels)?;
        self.compositor.render()?;

        self.metrics.record_dispatch();
        Ok(DispatchOutcome::Rendered)
    }

    /// Send a metrics snapshot and start a new reporting window.
    pub fn report_metrics(&self) {
        let snapshot = self.metrics.snapshot();
        debug!(?snapshot, "Pipeline metrics");
        self.send_event(PipelineEvent::Metrics(snapshot));
        self.metrics.mark_reported();
    }

    /// Current session flags.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The frame surface, once initialised.
    pub fn frame_surface(&self) -> Option<&FrameSurface> {
        self.frame.as_ref()
    }

    /// Current camera acquisition state.
    pub fn camera_state(&self) -> &CameraState {
        self.media.state()
    }

    /// Shared metrics collector.
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Session configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn send_event(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}
