//! Error types for camera acquisition.

use livecomp_frame::FrameError;
use thiserror::Error;

/// Errors that end a camera acquisition attempt.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The user or platform refused camera access.
    #[error("Permission denied for camera")]
    PermissionDenied,

    /// No camera device is present.
    #[error("No camera device found")]
    DeviceNotFound,

    /// No device mode satisfies the requested constraint.
    #[error("Constraint not satisfiable: {constraint}")]
    ConstraintNotSatisfied { constraint: String },

    /// The device failed to start.
    #[error("Camera device error: {0}")]
    Device(String),

    /// The request was dropped before it completed.
    #[error("Camera request aborted")]
    Aborted,

    /// The video surface could not be bound.
    #[error("Video surface unavailable: {0}")]
    Surface(#[from] FrameError),
}
