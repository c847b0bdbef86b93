// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tiny-skia`-backed pixel surface.

use core::fmt;

use kurbo::{Affine, BezPath, PathEl};
use peniko::Color;
use tiny_skia::{Mask, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

use crate::{Bitmap, FillRule, PixelSurface, RasterError};

/// Pixel surface backed by a [`tiny_skia::Pixmap`].
///
/// Clips are kept as a stack of coverage masks; each push intersects with the
/// mask below it.
pub struct TinySkiaSurface {
    pixmap: Pixmap,
    transform: Transform,
    empty_mask: Mask,
    clips: Vec<Mask>,
}

impl fmt::Debug for TinySkiaSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinySkiaSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clip_depth", &self.clips.len())
            .finish_non_exhaustive()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "tiny-skia geometry is f32; logical coordinates fit comfortably"
)]
fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32);
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "tiny-skia transforms are f32"
)]
fn to_skia_transform(xf: Affine) -> Transform {
    let [a, b, c, d, e, f] = xf.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

impl PixelSurface for TinySkiaSurface {
    const NAME: &'static str = "tiny_skia";

    fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        let alloc_failed = || RasterError::Allocation {
            backend: Self::NAME,
            width,
            height,
        };
        let pixmap = Pixmap::new(width, height).ok_or_else(alloc_failed)?;
        let empty_mask = Mask::new(width, height).ok_or_else(alloc_failed)?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            empty_mask,
            clips: Vec::new(),
        })
    }

    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = to_skia_transform(transform);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let rule = match rule {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        };
        self.pixmap.fill_path(
            &path,
            &solid_paint(color),
            rule,
            self.transform,
            self.clips.last(),
        );
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "tiny-skia stroke widths are f32"
    )]
    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(color),
            &stroke,
            self.transform,
            self.clips.last(),
        );
    }

    fn push_clip(&mut self, path: &BezPath) {
        let mask = match (to_skia_path(path), self.clips.last()) {
            // An empty clip path hides everything until it is popped.
            (None, _) => self.empty_mask.clone(),
            (Some(path), None) => {
                let mut mask = self.empty_mask.clone();
                mask.fill_path(&path, tiny_skia::FillRule::Winding, true, self.transform);
                mask
            }
            (Some(path), Some(top)) => {
                let mut mask = top.clone();
                mask.intersect_path(&path, tiny_skia::FillRule::Winding, true, self.transform);
                mask
            }
        };
        self.clips.push(mask);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn finish(self) -> Bitmap {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let mut bytes = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            bytes.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Bitmap::from_surface(width, height, bytes)
    }
}
