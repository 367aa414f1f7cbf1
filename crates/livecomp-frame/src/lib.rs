//! Frame surface and named presentation surfaces.
//!
//! The frame surface is the fixed-size pixel buffer that sits between the
//! camera and the compositor. Presentation surfaces are the named video,
//! canvas and output elements the pipeline binds to at initialization.

mod error;
mod pixel;
mod presentation;
mod source;
mod surface;

pub use error::FrameError;
pub use pixel::PixelBuffer;
pub use presentation::{
    CanvasSpec, OutputSurface, Surface, SurfaceRegistry, VideoAttribute, VideoSurface,
};
pub use source::{ImageSource, MediaStream};
pub use surface::FrameSurface;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
