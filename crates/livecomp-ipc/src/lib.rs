//! Typed pipeline<->host messages for the live compositor.
//!
//! This crate defines the configuration, state and event types shared between
//! the frame pipeline and whatever hosts it.

mod events;
mod state;
mod types;

pub use events::PipelineEvent;
pub use state::CameraState;
pub use types::{
    CameraConstraints, ExactConstraint, PipelineConfig, PipelineMetrics, VideoConstraints,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for events (pipeline → host).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<PipelineEvent>, Receiver<PipelineEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
