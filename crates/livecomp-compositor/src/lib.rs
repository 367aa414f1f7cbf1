//! Compositor capability contract and CPU compositor.
//!
//! The pipeline only relies on [`Compositor`]: initialise against a named
//! output surface, accept a pixel frame, render.

mod deferred;
mod error;
mod software;

pub use deferred::{compositor_loader, CompositorLoader, DeferredCompositor};
pub use error::CompositorError;
pub use software::SoftwareCompositor;

use livecomp_frame::PixelBuffer;

/// Result type for compositor operations.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// An image-compositing engine.
pub trait Compositor: Send {
    /// Whether the engine is loaded and may be initialised.
    fn is_available(&self) -> bool {
        true
    }

    /// Bind the engine to the named output surface.
    fn initialise(&mut self, output_surface: &str) -> CompositorResult<()>;

    /// Hand a frame to the engine.
    fn copy(&mut self, frame: &PixelBuffer) -> CompositorResult<()>;

    /// Render the current frame to the output surface.
    fn render(&mut self) -> CompositorResult<()>;
}
