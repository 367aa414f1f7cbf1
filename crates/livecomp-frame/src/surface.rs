//! The frame surface bridging the camera and the compositor.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, instrument, trace};

use crate::error::FrameError;
use crate::pixel::PixelBuffer;
use crate::presentation::SurfaceRegistry;
use crate::source::ImageSource;
use crate::FrameResult;

/// Fixed-size RGBA surface written once per tick by the capture step.
pub struct FrameSurface {
    image: RgbaImage,
}

impl FrameSurface {
    /// Colour the surface is cleared to.
    pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// Create a surface of the given size. Contents are undefined until
    /// [`FrameSurface::clear`] is called.
    pub fn new(width: u32, height: u32) -> FrameResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }

        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Create a surface sized after the named canvas and clear it.
    #[instrument(name = "frame_surface_init", skip(registry))]
    pub fn initialise(registry: &SurfaceRegistry, canvas_name: &str) -> FrameResult<Self> {
        let spec = registry.canvas(canvas_name)?;
        let mut surface = Self::new(spec.width, spec.height)?;
        surface.clear();

        debug!(width = spec.width, height = spec.height, "Frame surface initialized");
        Ok(surface)
    }

    /// Fill the whole surface with the background colour.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Self::BACKGROUND;
        }
    }

    /// Overwrite the surface with the source's current frame, scaled to fit.
    ///
    /// Returns false when the source had nothing to draw; the surface keeps
    /// its previous contents in that case.
    pub fn capture_from(&mut self, source: &dyn ImageSource) -> bool {
        let Some(frame) = source.current_frame() else {
            return false;
        };

        let Some(image) = frame.to_image() else {
            trace!(
                width = frame.width,
                height = frame.height,
                len = frame.data.len(),
                "Ignoring malformed source frame"
            );
            return false;
        };

        let (width, height) = self.image.dimensions();
        self.image = if image.dimensions() == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, FilterType::Nearest)
        };

        true
    }

    /// Copy out the full surface.
    pub fn read_pixels(&self) -> PixelBuffer {
        PixelBuffer::from_image(self.image.clone())
    }

    /// Surface `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
