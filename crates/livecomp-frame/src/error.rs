//! Error types for the frame module.

use thiserror::Error;

/// Errors that can occur while resolving or sizing surfaces.
#[derive(Debug, Error)]
pub enum FrameError {
    /// No surface is registered under the name.
    #[error("Presentation surface not found: {0}")]
    SurfaceNotFound(String),

    /// A surface exists under the name but is of another kind.
    #[error("Surface `{name}` is a {actual} surface, expected {expected}")]
    SurfaceKindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Surface dimensions cannot hold any pixels.
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Playback was requested on a video surface with no stream bound.
    #[error("Video surface `{0}` has no stream bound")]
    NoSource(String),
}
