//! Raw pixel buffers.

use bytes::Bytes;
use image::RgbaImage;

use crate::CHANNELS;

/// A tightly packed RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// RGBA pixel data, row-major, no padding.
    pub data: Bytes,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer.
    pub fn new(data: Bytes, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// A buffer of the given size filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(Self::rgba_buffer_size(width, height))
            .collect::<Vec<_>>();
        Self::new(Bytes::from(data), width, height)
    }

    /// Expected RGBA buffer size for given dimensions.
    pub fn rgba_buffer_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Validate that the data matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == Self::rgba_buffer_size(self.width, self.height)
    }

    /// The pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy into an owned image, or `None` if the buffer is malformed.
    pub fn to_image(&self) -> Option<RgbaImage> {
        if !self.is_valid() {
            return None;
        }
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }

    /// Wrap an image's pixels.
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(Bytes::from(image.into_raw()), width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_buffer_is_valid() {
        let buffer = PixelBuffer::filled(4, 2, [1, 2, 3, 4]);
        assert!(buffer.is_valid());
        assert_eq!(buffer.data.len(), 32);
        assert_eq!(buffer.pixel(3, 1), Some([1, 2, 3, 4]));
        assert_eq!(buffer.pixel(4, 0), None);
    }

    #[test]
    fn test_short_buffer_is_invalid() {
        let buffer = PixelBuffer::new(Bytes::from_static(&[0, 0, 0]), 1, 1);
        assert!(!buffer.is_valid());
        assert!(buffer.to_image().is_none());
    }

    #[test]
    fn test_zero_sized_buffer_is_invalid() {
        let buffer = PixelBuffer::new(Bytes::new(), 0, 0);
        assert!(!buffer.is_valid());
    }
}
