//! Camera stream acquisition and binding.
//!
//! This crate requests a live camera stream under fixed constraints, binds
//! it to a named video surface, and reports whether the camera became ready.

mod adapter;
mod error;
mod synthetic;

pub use adapter::{MediaSourceAdapter, StateChange};
pub use error::AcquisitionError;
pub use synthetic::{SyntheticCamera, TestPatternStream};

use crossbeam_channel::{Receiver, Sender};
use livecomp_frame::MediaStream;
use livecomp_ipc::CameraConstraints;

/// Result type for acquisition operations.
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Outcome of a stream request. Completed exactly once.
pub type StreamRequest = Receiver<AcquisitionResult<Box<dyn MediaStream>>>;

/// Completion side of a [`StreamRequest`].
pub type StreamResolver = Sender<AcquisitionResult<Box<dyn MediaStream>>>;

/// Create a single-shot stream request channel.
pub fn stream_request() -> (StreamResolver, StreamRequest) {
    crossbeam_channel::bounded(1)
}

/// Platform capability that hands out camera streams.
pub trait MediaDevices: Send {
    /// Request a stream. Returns immediately; the request resolves later.
    fn get_user_media(&self, constraints: &CameraConstraints) -> StreamRequest;
}
