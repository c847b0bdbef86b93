// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`View`] trait and the context views paint into.

use core::fmt;
use std::rc::Rc;

use kurbo::{Affine, Rect, Shape, Size};
use peniko::Color;
use understory_raster::DisplayList;

use crate::Environment;

/// A size proposed to a view by its parent.
///
/// `None` on an axis asks for the view's ideal extent on that axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ProposedSize {
    /// Proposed width.
    pub width: Option<f64>,
    /// Proposed height.
    pub height: Option<f64>,
}

impl ProposedSize {
    /// The zero-by-zero proposal: asks for the smallest size the content accepts.
    pub const ZERO: Self = Self {
        width: Some(0.0),
        height: Some(0.0),
    };

    /// No proposal on either axis.
    pub const UNSPECIFIED: Self = Self {
        width: None,
        height: None,
    };

    /// Proposes exactly `size`.
    #[must_use]
    pub const fn fixed(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
        }
    }

    /// Fills unspecified axes from `fallback`.
    #[must_use]
    pub fn unwrap_or(self, fallback: Size) -> Size {
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}

/// A declarative view: measures itself against a proposal and paints into bounds.
///
/// Views are values. The pipeline clones a caller's view into a host and never
/// mutates it.
pub trait View: fmt::Debug {
    /// Size this view wants for `proposal` in `env`.
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size;

    /// Paints into `bounds`, in host coordinates.
    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect);

    /// True when the view can draw itself directly, with no display pass.
    fn snapshots_itself(&self) -> bool {
        false
    }
}

impl<V: View + ?Sized> View for Rc<V> {
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size {
        (**self).size_that_fits(proposal, env)
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        (**self).paint(cx, bounds);
    }

    fn snapshots_itself(&self) -> bool {
        (**self).snapshots_itself()
    }
}

/// A type-erased, shareable view.
pub type AnyView = Rc<dyn View>;

/// Erases a view's type.
pub fn any_view(view: impl View + 'static) -> AnyView {
    Rc::new(view)
}

/// Deferred content discovered while painting, mounted as its own node.
pub(crate) struct Embed {
    pub(crate) frame: Rect,
    pub(crate) content: AnyView,
    pub(crate) ready_after: u32,
}

/// Paint context handed to [`View::paint`].
///
/// Recording goes into a [`DisplayList`]. Deferred content is either collected as an
/// embed for the host to mount, or, when nothing collects embeds (for example
/// inside already-deferred content), painted inline.
pub struct PaintCx<'a> {
    list: &'a mut DisplayList,
    embeds: Option<&'a mut Vec<Embed>>,
    env: &'a Environment,
}

impl fmt::Debug for PaintCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaintCx")
            .field("ops", &self.list.ops().len())
            .field("collects_embeds", &self.embeds.is_some())
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl<'a> PaintCx<'a> {
    pub(crate) fn new(
        list: &'a mut DisplayList,
        embeds: Option<&'a mut Vec<Embed>>,
        env: &'a Environment,
    ) -> Self {
        Self { list, embeds, env }
    }

    /// The environment views resolve colors and metrics against.
    #[must_use]
    pub fn env(&self) -> &Environment {
        self.env
    }

    /// Fills `shape` with a solid color.
    pub fn fill(&mut self, shape: &impl Shape, color: Color) {
        self.list.fill(shape, color);
    }

    /// Strokes the outline of `shape`.
    pub fn stroke(&mut self, shape: &impl Shape, width: f64, color: Color) {
        self.list.stroke(shape, width, color);
    }

    /// Runs `f` with the clip intersected with `shape`.
    pub fn with_clip(&mut self, shape: &impl Shape, f: impl FnOnce(&mut Self)) {
        self.list.push_clip(shape);
        f(self);
        self.list.pop_clip();
    }

    /// Paints `child` into `bounds`.
    pub fn paint_child(&mut self, child: &dyn View, bounds: Rect) {
        child.paint(self, bounds);
    }

    /// Draws a recorded picture with `transform` applied.
    pub fn draw_picture(&mut self, picture: &DisplayList, transform: Affine) {
        self.list.append(picture, transform);
    }

    /// Hands `content` to the host as deferred content occupying `bounds`.
    ///
    /// The content renders `ready_after` display cycles after it is mounted, and is
    /// composited at this point of the paint order under the clips now in effect.
    pub fn embed_deferred(&mut self, bounds: Rect, content: AnyView, ready_after: u32) {
        match self.embeds.as_deref_mut() {
            Some(embeds) => {
                self.list.slot(embeds.len());
                embeds.push(Embed {
                    frame: bounds,
                    content,
                    ready_after,
                });
            }
            None => content.paint(self, bounds),
        }
    }
}

/// Paints `view` into a fresh display list with embeds painted inline.
pub(crate) fn record(view: &dyn View, bounds: Rect, env: &Environment) -> DisplayList {
    let mut list = DisplayList::new();
    let mut cx = PaintCx::new(&mut list, None, env);
    view.paint(&mut cx, bounds);
    list
}
