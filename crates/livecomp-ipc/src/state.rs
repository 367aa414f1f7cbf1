//! Camera acquisition state machine types.

use serde::{Deserialize, Serialize};

/// Acquisition state of the media source.
///
/// `Uninitialised -> Requesting -> {Ready, Failed}`. `Ready` and `Failed` are
/// terminal for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraState {
    /// No stream has been requested yet.
    #[default]
    Uninitialised,

    /// A stream request is outstanding.
    Requesting,

    /// The stream is bound to the video surface and playing.
    Ready,

    /// Acquisition failed; no retry will be made.
    Failed {
        /// Error message.
        message: String,
    },
}

impl CameraState {
    /// Returns true if the camera is ready.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if a request is outstanding.
    pub fn is_requesting(&self) -> bool {
        matches!(self, Self::Requesting)
    }

    /// Returns true if acquisition failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialised => "Uninitialised",
            Self::Requesting => "Requesting",
            Self::Ready => "Ready",
            Self::Failed { .. } => "Failed",
        }
    }
}
