//! CPU compositor.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument, trace};

use livecomp_frame::{OutputSurface, PixelBuffer, SurfaceRegistry};

use crate::error::CompositorError;
use crate::{Compositor, CompositorResult};

/// Compositor that keeps a fixed-size texture in memory and presents it to
/// an output surface with the red and blue channels swapped.
///
/// A copied frame waits in a staging slot until the next `render` uploads
/// it. Copies arriving while a frame is still staged are dropped.
pub struct SoftwareCompositor {
    registry: SurfaceRegistry,
    texture: RgbaImage,
    staged: Option<RgbaImage>,
    output: Option<Arc<OutputSurface>>,
    dropped_copies: u64,
    rendered: u64,
}

impl SoftwareCompositor {
    /// Initial texture colour.
    pub const BLANK: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// Create a compositor with a `width`×`height` texture.
    pub fn new(registry: SurfaceRegistry, width: u32, height: u32) -> Self {
        Self {
            registry,
            texture: RgbaImage::from_pixel(width, height, Self::BLANK),
            staged: None,
            output: None,
            dropped_copies: 0,
            rendered: 0,
        }
    }

    /// Texture `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.texture.dimensions()
    }

    /// Copies dropped because a frame was still staged.
    pub fn dropped_copies(&self) -> u64 {
        self.dropped_copies
    }

    /// Frames presented so far.
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    fn present(&mut self, output: &OutputSurface) {
        let mut frame = self.texture.clone();
        for pixel in frame.pixels_mut() {
            pixel.0.swap(0, 2);
        }
        output.present(PixelBuffer::from_image(frame));
        self.rendered += 1;
    }
}

impl Compositor for SoftwareCompositor {
    #[instrument(name = "compositor_init", skip(self))]
    fn initialise(&mut self, output_surface: &str) -> CompositorResult<()> {
        let output = self.registry.output(output_surface)?;

        let (width, height) = self.texture.dimensions();
        if width == 0 || height == 0 {
            return Err(CompositorError::UnsupportedFrame { width, height });
        }

        self.present(&output);
        self.output = Some(output);

        info!(width, height, "Compositor initialised");
        Ok(())
    }

    fn copy(&mut self, frame: &PixelBuffer) -> CompositorResult<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(CompositorError::UnsupportedFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let expected = PixelBuffer::rgba_buffer_size(frame.width, frame.height);
        if frame.data.len() != expected {
            return Err(CompositorError::MalformedFrame {
                expected,
                actual: frame.data.len(),
            });
        }

        if self.staged.is_some() {
            self.dropped_copies += 1;
            trace!(dropped = self.dropped_copies, "Frame still staged, dropping copy");
            return Ok(());
        }

        let image = frame.to_image().ok_or(CompositorError::MalformedFrame {
            expected,
            actual: frame.data.len(),
        })?;

        let (width, height) = self.texture.dimensions();
        let staged = if image.dimensions() == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, FilterType::Nearest)
        };
        self.staged = Some(staged);

        Ok(())
    }

    fn render(&mut self) -> CompositorResult<()> {
        let output = self.output.clone().ok_or(CompositorError::NotInitialised)?;

        if let Some(staged) = self.staged.take() {
            self.texture = staged;
        }
        self.present(&output);

        if self.rendered % 600 == 0 {
            debug!(rendered = self.rendered, "Compositor frames rendered");
        }
        Ok(())
    }
}
