//! Events sent from the pipeline to the host.

use serde::{Deserialize, Serialize};

use crate::state::CameraState;
use crate::types::PipelineMetrics;

/// Events that the pipeline can send to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Compositor, frame surface and camera request are all set up.
    Initialised,

    /// Initialization could not complete this tick and will be retried.
    InitialisationDeferred {
        /// Why the attempt was abandoned.
        reason: String,
    },

    /// Camera acquisition state has changed.
    CameraStateChanged {
        /// Previous state.
        previous: CameraState,

        /// Current state.
        current: CameraState,
    },

    /// A compositor call failed during dispatch. The loop continues.
    CompositorFailed {
        /// Error message.
        message: String,
    },

    /// Updated pipeline metrics.
    Metrics(PipelineMetrics),
}
