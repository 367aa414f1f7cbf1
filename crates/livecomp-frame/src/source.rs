//! Read-only image sources.

use crate::pixel::PixelBuffer;

/// Something the frame surface can sample a frame from.
pub trait ImageSource {
    /// The frame currently presented, or `None` if nothing is showing yet.
    fn current_frame(&self) -> Option<PixelBuffer>;
}

/// A live media stream handle.
///
/// Owned by whoever acquired it; the pipeline only reads frames from it.
pub trait MediaStream: Send + Sync {
    /// Stream identifier.
    fn id(&self) -> &str;

    /// The most recent decoded frame, if the stream has produced one.
    fn latest_frame(&self) -> Option<PixelBuffer>;

    /// Stop all tracks. Later calls to `latest_frame` return `None`.
    fn stop(&self);
}
