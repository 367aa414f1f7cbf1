//! Pipeline session state.

/// The two flags gating the capture and dispatch steps.
///
/// `initialised` flips to true once, after the compositor, frame surface and
/// camera request are all set up. `camera_ready` flips to true once, when the
/// camera stream is bound and playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub initialised: bool,
    pub camera_ready: bool,
}

impl PipelineState {
    /// Whether the capture step runs.
    pub fn can_capture(&self) -> bool {
        self.initialised
    }

    /// Whether the dispatch step runs.
    pub fn can_dispatch(&self) -> bool {
        self.initialised && self.camera_ready
    }
}
