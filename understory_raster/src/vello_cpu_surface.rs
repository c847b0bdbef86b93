// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `vello_cpu`-backed pixel surface.

use core::fmt;

use kurbo::{Affine, BezPath, PathEl, Point};
use peniko::Color;
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath as CpuBezPath, Point as CpuPoint, Stroke,
};
use vello_cpu::peniko::{Color as CpuColor, Fill};
use vello_cpu::{Pixmap, RenderContext, RenderMode, RenderSettings};

use crate::{Bitmap, FillRule, PixelSurface, RasterError};

/// Pixel surface backed by the sparse-strips [`vello_cpu::RenderContext`].
pub struct VelloCpuSurface {
    ctx: RenderContext,
    width: u16,
    height: u16,
    clip_depth: usize,
}

impl fmt::Debug for VelloCpuSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("clip_depth", &self.clip_depth)
            .finish_non_exhaustive()
    }
}

impl VelloCpuSurface {
    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn point_to_cpu(p: Point) -> CpuPoint {
        CpuPoint::new(p.x, p.y)
    }

    fn path_to_cpu(path: &BezPath) -> CpuBezPath {
        let mut out = CpuBezPath::new();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => out.move_to(Self::point_to_cpu(p)),
                PathEl::LineTo(p) => out.line_to(Self::point_to_cpu(p)),
                PathEl::QuadTo(p1, p2) => {
                    out.quad_to(Self::point_to_cpu(p1), Self::point_to_cpu(p2));
                }
                PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                    Self::point_to_cpu(p1),
                    Self::point_to_cpu(p2),
                    Self::point_to_cpu(p3),
                ),
                PathEl::ClosePath => out.close_path(),
            }
        }
        out
    }

    fn color_to_cpu(color: Color) -> CpuColor {
        let rgba = color.to_rgba8();
        CpuColor::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl PixelSurface for VelloCpuSurface {
    const NAME: &'static str = "vello_cpu";

    fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        let too_large = || RasterError::TooLarge {
            backend: Self::NAME,
            width,
            height,
            max: u32::from(u16::MAX),
        };
        let w = u16::try_from(width).map_err(|_| too_large())?;
        let h = u16::try_from(height).map_err(|_| too_large())?;
        let settings = RenderSettings {
            // Force u8 pipeline output even if `f32_pipeline` is enabled elsewhere in the
            // workspace, to keep captures stable across configurations.
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        Ok(Self {
            ctx: RenderContext::new_with(w, h, settings),
            width: w,
            height: h,
            clip_depth: 0,
        })
    }

    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn set_transform(&mut self, transform: Affine) {
        self.ctx.set_transform(Self::affine_to_cpu(transform));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule) {
        let fill = match rule {
            FillRule::NonZero => Fill::NonZero,
            FillRule::EvenOdd => Fill::EvenOdd,
        };
        self.ctx.set_fill_rule(fill);
        self.ctx.set_paint(Self::color_to_cpu(color));
        self.ctx.fill_path(&Self::path_to_cpu(path));
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        self.ctx.set_stroke(Stroke::new(width));
        self.ctx.set_paint(Self::color_to_cpu(color));
        self.ctx.stroke_path(&Self::path_to_cpu(path));
    }

    fn push_clip(&mut self, path: &BezPath) {
        self.clip_depth += 1;
        self.ctx.set_fill_rule(Fill::NonZero);
        self.ctx.push_clip_layer(&Self::path_to_cpu(path));
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            return;
        }
        self.clip_depth -= 1;
        self.ctx.pop_layer();
    }

    fn finish(mut self) -> Bitmap {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let unpremul = pixmap.take_unpremultiplied();
        let mut bytes = Vec::with_capacity(unpremul.len() * 4);
        for p in unpremul {
            bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        Bitmap::from_surface(u32::from(self.width), u32::from(self.height), bytes)
    }
}
