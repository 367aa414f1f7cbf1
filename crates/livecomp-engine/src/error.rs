//! Error types for the engine.

use livecomp_compositor::CompositorError;
use livecomp_frame::FrameError;
use thiserror::Error;

/// Errors that can occur while setting up or driving the pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The compositor rejected initialization.
    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),

    /// The frame surface could not be created.
    #[error("Frame surface error: {0}")]
    Frame(#[from] FrameError),

    /// Refresh rate must be positive and finite.
    #[error("Invalid refresh rate: {0} Hz")]
    InvalidRefreshRate(f32),

    /// The refresh thread could not be started.
    #[error("Failed to start refresh thread: {0}")]
    Thread(#[from] std::io::Error),
}
