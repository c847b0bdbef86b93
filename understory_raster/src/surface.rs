// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath};
use peniko::Color;
use thiserror::Error;

use crate::{Bitmap, DisplayList, FillRule};

/// Failure to obtain a drawable pixel surface.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    /// A surface with a zero dimension was requested.
    #[error("cannot allocate an empty {width}x{height} surface")]
    Empty {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The requested dimensions exceed what the backend can address.
    #[error("{backend} surfaces are limited to {max}x{max} pixels, requested {width}x{height}")]
    TooLarge {
        /// Backend name.
        backend: &'static str,
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Largest supported extent on either axis.
        max: u32,
    },
    /// The backend refused to allocate pixel storage.
    #[error("{backend} failed to allocate a {width}x{height} pixel buffer")]
    Allocation {
        /// Backend name.
        backend: &'static str,
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// A drawable pixel buffer that can replay a [`DisplayList`].
///
/// Implementations are selected at build time (see [`NativeSurface`](crate::NativeSurface));
/// callers that want to stay backend agnostic are generic over `S: PixelSurface`.
///
/// All drawing is in surface pixel space after the current transform is applied.
pub trait PixelSurface: Sized {
    /// Short backend name used in diagnostics.
    const NAME: &'static str;

    /// Allocates a cleared (fully transparent) surface.
    fn new(width: u32, height: u32) -> Result<Self, RasterError>;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Sets the transform applied to subsequent geometry.
    fn set_transform(&mut self, transform: Affine);

    /// Fills `path` with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule);

    /// Strokes `path` with a solid color.
    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color);

    /// Intersects the clip with `path`.
    fn push_clip(&mut self, path: &BezPath);

    /// Pops the most recent clip.
    fn pop_clip(&mut self);

    /// Resolves all pending drawing into an unpremultiplied RGBA8 bitmap.
    fn finish(self) -> Bitmap;

    /// Draws a whole display list with `transform` applied on top of it.
    fn draw(&mut self, list: &DisplayList, transform: Affine) {
        list.replay(self, transform);
    }
}

/// Allocates a `width` x `height` surface of type `S`, draws `list` into it and
/// returns the resulting bitmap.
pub fn render<S: PixelSurface>(
    list: &DisplayList,
    width: u32,
    height: u32,
    transform: Affine,
) -> Result<Bitmap, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::Empty { width, height });
    }
    let mut surface = S::new(width, height)?;
    surface.draw(list, transform);
    Ok(surface.finish())
}
