//! Error types for the compositor module.

use livecomp_frame::FrameError;
use thiserror::Error;

/// Errors raised by compositor calls.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The compositor engine has not been loaded yet.
    #[error("Compositor not loaded")]
    Unavailable,

    /// `render` was called before `initialise`.
    #[error("Compositor not initialised")]
    NotInitialised,

    /// The output surface could not be resolved.
    #[error("Output surface unavailable: {0}")]
    Surface(#[from] FrameError),

    /// Frame data does not match its declared dimensions.
    #[error("Malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// Frame dimensions the engine cannot accept.
    #[error("Unsupported frame size: {width}x{height}")]
    UnsupportedFrame { width: u32, height: u32 },

    /// Internal rendering failure.
    #[error("Render failed: {0}")]
    Render(String),
}
