// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// An RGBA8 image with straight (unpremultiplied) alpha, stored row-major.
///
/// This is the value handed to comparison tools; two bitmaps are equal exactly
/// when their dimensions and bytes are equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wraps an RGBA8 buffer, returning `None` if its length does not match
    /// `width * height * 4`.
    #[must_use]
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == byte_len(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wraps a buffer a backend produced for a surface it allocated.
    pub(crate) fn from_surface(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            byte_len(width, height),
            "surface readback does not match its dimensions"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn as_rgba8(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the bitmap, returning its RGBA8 bytes.
    #[must_use]
    pub fn into_rgba8(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns true if every pixel is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::Bitmap;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Bitmap::from_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(Bitmap::from_rgba8(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let mut bytes = vec![0_u8; 2 * 2 * 4];
        bytes[(2 + 1) * 4..(2 + 1) * 4 + 4].copy_from_slice(&[1, 2, 3, 4]);
        let bitmap = Bitmap::from_rgba8(2, 2, bytes).unwrap();
        assert_eq!(bitmap.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(bitmap.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(bitmap.pixel(2, 0), None);
    }

    #[test]
    fn into_rgba8_returns_the_buffer() {
        let bytes: Vec<u8> = (0..8).collect();
        let bitmap = Bitmap::from_rgba8(2, 1, bytes.clone()).unwrap();
        assert_eq!(bitmap.as_rgba8(), &bytes[..]);
        assert_eq!(bitmap.into_rgba8(), bytes);
    }

    #[test]
    fn transparency_check() {
        let mut bytes = vec![0_u8; 4];
        let bitmap = Bitmap::from_rgba8(1, 1, bytes.clone()).unwrap();
        assert!(bitmap.is_transparent());
        bytes[3] = 1;
        assert!(!Bitmap::from_rgba8(1, 1, bytes).unwrap().is_transparent());
    }
}
