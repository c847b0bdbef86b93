// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath, Shape};
use peniko::Color;

use crate::PixelSurface;

/// Flattening tolerance used when converting shapes into paths.
const SHAPE_TOLERANCE: f64 = 0.1;

/// Fill rule used for filling paths.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Non-zero winding rule.
    #[default]
    NonZero,
    /// Even-odd rule.
    EvenOdd,
}

/// A single recorded paint operation.
///
/// Geometry is expressed in the coordinate space established by the most recent
/// [`PaintOp::SetTransform`] (or the identity at the start of a list).
#[derive(Clone, Debug, PartialEq)]
pub enum PaintOp {
    /// Set the current transform, relative to the list's origin.
    SetTransform(Affine),
    /// Fill a path with a solid color.
    Fill {
        /// Path to fill.
        path: BezPath,
        /// Fill color.
        color: Color,
        /// Fill rule.
        rule: FillRule,
    },
    /// Stroke a path with a solid color.
    Stroke {
        /// Path to stroke.
        path: BezPath,
        /// Stroke width in local units.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// Intersect the clip with a path until the matching [`PaintOp::PopClip`].
    PushClip(BezPath),
    /// Pop the most recent clip.
    PopClip,
    /// Where externally supplied content is composited; replays as nothing.
    ///
    /// Content spliced in at a slot paints above everything recorded before it,
    /// below everything after it, and under the clips open at that point.
    Slot(usize),
}

/// An ordered, replayable list of paint operations.
///
/// Display lists are plain values: they can be cloned, compared, appended into one
/// another under a transform, and replayed into any [`PixelSurface`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    ops: Vec<PaintOp>,
    transform: Affine,
    clip_depth: usize,
}

impl DisplayList {
    /// Creates an empty display list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded operations.
    #[must_use]
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the transform that applies to subsequently recorded geometry.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Number of clips pushed and not yet popped.
    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// Sets the transform for subsequently recorded geometry.
    pub fn set_transform(&mut self, transform: Affine) {
        if transform == self.transform {
            return;
        }
        self.transform = transform;
        self.ops.push(PaintOp::SetTransform(transform));
    }

    /// Fills `shape` with `color` using the non-zero rule.
    pub fn fill(&mut self, shape: &impl Shape, color: Color) {
        self.fill_with_rule(shape, color, FillRule::NonZero);
    }

    /// Fills `shape` with `color` using `rule`.
    pub fn fill_with_rule(&mut self, shape: &impl Shape, color: Color, rule: FillRule) {
        self.ops.push(PaintOp::Fill {
            path: shape.to_path(SHAPE_TOLERANCE),
            color,
            rule,
        });
    }

    /// Strokes the outline of `shape`.
    pub fn stroke(&mut self, shape: &impl Shape, width: f64, color: Color) {
        self.ops.push(PaintOp::Stroke {
            path: shape.to_path(SHAPE_TOLERANCE),
            width,
            color,
        });
    }

    /// Pushes a clip. Must be balanced with [`DisplayList::pop_clip`].
    pub fn push_clip(&mut self, shape: &impl Shape) {
        self.clip_depth += 1;
        self.ops.push(PaintOp::PushClip(shape.to_path(SHAPE_TOLERANCE)));
    }

    /// Pops the most recent clip. Unbalanced pops are ignored.
    pub fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            return;
        }
        self.clip_depth -= 1;
        self.ops.push(PaintOp::PopClip);
    }

    /// Marks a slot for content composited later.
    pub fn slot(&mut self, slot: usize) {
        self.ops.push(PaintOp::Slot(slot));
    }

    /// Appends `other` as if it were painted under `transform`.
    ///
    /// The current transform of `self` is preserved across the call and any clips
    /// left open by `other` are closed. Slots in `other` are kept.
    pub fn append(&mut self, other: &Self, transform: Affine) {
        self.append_with_slots(other, transform, |slot, out| out.slot(slot));
    }

    /// Like [`DisplayList::append`], but hands every slot in `other` to `splice`.
    ///
    /// `splice` runs with the clips `other` has open at the slot still in effect.
    /// Whatever transform it leaves behind is reset before the next op.
    pub fn append_with_slots(
        &mut self,
        other: &Self,
        transform: Affine,
        mut splice: impl FnMut(usize, &mut Self),
    ) {
        if other.is_empty() {
            return;
        }
        let saved = self.transform;
        self.set_transform(transform);
        let mut depth = 0_usize;
        for op in &other.ops {
            match op {
                PaintOp::SetTransform(xf) => {
                    self.transform = transform * *xf;
                    self.ops.push(PaintOp::SetTransform(self.transform));
                }
                PaintOp::PushClip(_) => {
                    depth += 1;
                    self.ops.push(op.clone());
                }
                PaintOp::PopClip => {
                    depth = depth.saturating_sub(1);
                    self.ops.push(PaintOp::PopClip);
                }
                PaintOp::Slot(slot) => {
                    let current = self.transform;
                    splice(*slot, self);
                    self.set_transform(current);
                }
                _ => self.ops.push(op.clone()),
            }
        }
        for _ in 0..depth {
            self.ops.push(PaintOp::PopClip);
        }
        self.set_transform(saved);
    }

    /// Replays the list into `surface`, with `base` applied on top of every
    /// recorded transform.
    pub fn replay<S: PixelSurface>(&self, surface: &mut S, base: Affine) {
        surface.set_transform(base);
        let mut depth = 0_usize;
        for op in &self.ops {
            match op {
                PaintOp::SetTransform(xf) => surface.set_transform(base * *xf),
                PaintOp::Fill { path, color, rule } => surface.fill_path(path, *color, *rule),
                PaintOp::Stroke { path, width, color } => {
                    surface.stroke_path(path, *width, *color);
                }
                PaintOp::PushClip(path) => {
                    depth += 1;
                    surface.push_clip(path);
                }
                PaintOp::PopClip => {
                    if depth > 0 {
                        depth -= 1;
                        surface.pop_clip();
                    }
                }
                PaintOp::Slot(_) => {}
            }
        }
        for _ in 0..depth {
            surface.pop_clip();
        }
    }
}
