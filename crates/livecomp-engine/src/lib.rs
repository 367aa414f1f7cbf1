//! Frame pipeline controller for the live compositor.
//!
//! This crate sequences one-time initialization of the compositor, frame
//! surface and camera, then drives the per-refresh capture and dispatch
//! cycle.

mod controller;
mod error;
mod metrics;
mod refresh;
mod state;

pub use controller::{CaptureOutcome, DispatchOutcome, PipelineController, TickReport};
pub use error::EngineError;
pub use metrics::MetricsCollector;
pub use refresh::RefreshLoop;
pub use state::PipelineState;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
