// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in views.
//!
//! These are enough to build realistic fixtures: filled and stroked shapes, fixed
//! frames, padding, stacks, text-scale-aware metrics, content that renders on a
//! later display cycle ([`Deferred`]) and pre-recorded pictures ([`Scene`]).
//!
//! Measurement follows a propose/accept protocol: a parent proposes a size (or
//! leaves an axis open) and the child answers with the size it wants. Shapes accept
//! whatever they are offered, so under the zero proposal they measure as zero.

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape as _, Size};
use peniko::Color;
use understory_raster::DisplayList;

use crate::{AnyView, Appearance, Environment, Insets, PaintCx, ProposedSize, View, any_view};

const PATH_TOLERANCE: f64 = 0.1;

/// A color that may depend on the environment's appearance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DynamicColor {
    /// The same color in every appearance.
    Fixed(Color),
    /// One color per appearance.
    Adaptive {
        /// Color in the light appearance.
        light: Color,
        /// Color in the dark appearance.
        dark: Color,
    },
    /// The appearance's primary foreground color.
    Label,
    /// The appearance's system background color.
    SystemBackground,
}

impl DynamicColor {
    /// Resolves to a concrete color for `appearance`.
    #[must_use]
    pub fn resolve(self, appearance: Appearance) -> Color {
        match (self, appearance) {
            (Self::Fixed(color), _) => color,
            (Self::Adaptive { light, .. }, Appearance::Light) => light,
            (Self::Adaptive { dark, .. }, Appearance::Dark) => dark,
            (Self::Label, _) => appearance.label(),
            (Self::SystemBackground, _) => appearance.system_background(),
        }
    }
}

impl From<Color> for DynamicColor {
    fn from(color: Color) -> Self {
        Self::Fixed(color)
    }
}

/// Placement along one axis when a child is smaller than the space it is given.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Leading or top edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Trailing or bottom edge.
    End,
}

impl Alignment {
    /// Offset of an extent `used` within `available`.
    #[must_use]
    pub fn offset(self, available: f64, used: f64) -> f64 {
        let slack = (available - used).max(0.0);
        match self {
            Self::Start => 0.0,
            Self::Center => slack / 2.0,
            Self::End => slack,
        }
    }
}

fn place(bounds: Rect, size: Size, horizontal: Alignment, vertical: Alignment) -> Rect {
    let w = size.width.min(bounds.width()).max(0.0);
    let h = size.height.min(bounds.height()).max(0.0);
    let origin = Point::new(
        bounds.x0 + horizontal.offset(bounds.width(), w),
        bounds.y0 + vertical.offset(bounds.height(), h),
    );
    Rect::from_origin_size(origin, Size::new(w, h))
}

/// Geometry drawn by [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rect,
    /// Rectangle with uniformly rounded corners.
    RoundedRect {
        /// Corner radius in logical points.
        radius: f64,
    },
    /// Ellipse inscribed in the bounds.
    Ellipse,
}

impl ShapeKind {
    fn path(self, rect: Rect) -> BezPath {
        match self {
            Self::Rect => rect.to_path(PATH_TOLERANCE),
            Self::RoundedRect { radius } => {
                RoundedRect::from_rect(rect, radius).to_path(PATH_TOLERANCE)
            }
            Self::Ellipse => Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
        }
    }
}

/// A filled and/or stroked shape that takes whatever size it is proposed.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    fill: Option<DynamicColor>,
    stroke: Option<(f64, DynamicColor)>,
}

impl Shape {
    /// A filled rectangle.
    #[must_use]
    pub fn rect(fill: impl Into<DynamicColor>) -> Self {
        Self::filled(ShapeKind::Rect, fill)
    }

    /// A filled rounded rectangle.
    #[must_use]
    pub fn rounded_rect(radius: f64, fill: impl Into<DynamicColor>) -> Self {
        Self::filled(ShapeKind::RoundedRect { radius }, fill)
    }

    /// A filled ellipse.
    #[must_use]
    pub fn ellipse(fill: impl Into<DynamicColor>) -> Self {
        Self::filled(ShapeKind::Ellipse, fill)
    }

    /// A filled shape of any kind.
    #[must_use]
    pub fn filled(kind: ShapeKind, fill: impl Into<DynamicColor>) -> Self {
        Self {
            kind,
            fill: Some(fill.into()),
            stroke: None,
        }
    }

    /// An unfilled outline.
    #[must_use]
    pub fn outline(kind: ShapeKind, width: f64, color: impl Into<DynamicColor>) -> Self {
        Self {
            kind,
            fill: None,
            stroke: Some((width, color.into())),
        }
    }

    /// Adds a stroke drawn inside the bounds.
    #[must_use]
    pub fn with_stroke(mut self, width: f64, color: impl Into<DynamicColor>) -> Self {
        self.stroke = Some((width, color.into()));
        self
    }

    /// The shape's geometry.
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

impl View for Shape {
    fn size_that_fits(&self, proposal: ProposedSize, _env: &Environment) -> Size {
        proposal.unwrap_or(Size::ZERO)
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        let appearance = cx.env().appearance;
        if let Some(fill) = self.fill {
            cx.fill(&self.kind.path(bounds), fill.resolve(appearance));
        }
        if let Some((width, color)) = self.stroke {
            let inner = bounds.inset(-width / 2.0);
            if inner.width() > 0.0 && inner.height() > 0.0 {
                cx.stroke(&self.kind.path(inner), width, color.resolve(appearance));
            }
        }
    }
}

/// Gives a child a fixed width and/or height.
///
/// Unset axes take the child's own extent.
#[derive(Clone, Debug)]
pub struct Frame {
    width: Option<f64>,
    height: Option<f64>,
    alignment: Alignment,
    child: AnyView,
}

impl Frame {
    /// Wraps `child` with no fixed extent.
    pub fn new(child: impl View + 'static) -> Self {
        Self {
            width: None,
            height: None,
            alignment: Alignment::Center,
            child: any_view(child),
        }
    }

    /// Wraps `child` in a `width` by `height` frame.
    pub fn fixed(width: f64, height: f64, child: impl View + 'static) -> Self {
        Self::new(child).with_width(width).with_height(height)
    }

    /// Fixes the width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Fixes the height.
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Sets how a smaller child sits inside the frame on both axes.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl View for Frame {
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size {
        let child_proposal = ProposedSize {
            width: self.width.or(proposal.width),
            height: self.height.or(proposal.height),
        };
        let child = self.child.size_that_fits(child_proposal, env);
        Size::new(
            self.width.unwrap_or(child.width),
            self.height.unwrap_or(child.height),
        )
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        let child = self
            .child
            .size_that_fits(ProposedSize::fixed(bounds.size()), cx.env());
        let rect = place(bounds, child, self.alignment, self.alignment);
        cx.paint_child(&*self.child, rect);
    }
}

/// Insets a child.
#[derive(Clone, Debug)]
pub struct Padding {
    insets: Insets,
    child: AnyView,
}

impl Padding {
    /// Pads `child` by `insets`.
    pub fn new(insets: Insets, child: impl View + 'static) -> Self {
        Self {
            insets,
            child: any_view(child),
        }
    }

    /// Pads `child` by `amount` on every edge.
    pub fn uniform(amount: f64, child: impl View + 'static) -> Self {
        Self::new(Insets::uniform(amount), child)
    }
}

impl View for Padding {
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size {
        let inner = ProposedSize {
            width: proposal
                .width
                .map(|w| (w - self.insets.horizontal()).max(0.0)),
            height: proposal
                .height
                .map(|h| (h - self.insets.vertical()).max(0.0)),
        };
        self.insets
            .outset_size(self.child.size_that_fits(inner, env))
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        cx.paint_child(&*self.child, self.insets.inset_rect(bounds));
    }
}

/// Direction a [`Stack`] arranges its children in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Top to bottom.
    Vertical,
    /// Leading to trailing.
    Horizontal,
    /// On top of one another, first child at the back.
    Layered,
}

/// Arranges children along an axis, or layers them.
///
/// Along the main axis the proposal is split evenly between children after
/// spacing; across it each child is placed with the stack's alignment.
#[derive(Clone, Debug)]
pub struct Stack {
    axis: Axis,
    spacing: f64,
    alignment: Alignment,
    children: Vec<AnyView>,
}

impl Stack {
    /// An empty stack along `axis`.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            spacing: 0.0,
            alignment: Alignment::Center,
            children: Vec::new(),
        }
    }

    /// A top-to-bottom stack.
    #[must_use]
    pub fn vertical() -> Self {
        Self::new(Axis::Vertical)
    }

    /// A leading-to-trailing stack.
    #[must_use]
    pub fn horizontal() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// A back-to-front stack.
    #[must_use]
    pub fn layered() -> Self {
        Self::new(Axis::Layered)
    }

    /// Sets the gap between adjacent children.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets cross-axis alignment (both axes for layered stacks).
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl View + 'static) -> Self {
        self.children.push(any_view(child));
        self
    }

    /// Appends an already erased child.
    #[must_use]
    pub fn any_child(mut self, child: AnyView) -> Self {
        self.children.push(child);
        self
    }

    fn gaps(&self) -> f64 {
        self.spacing * self.children.len().saturating_sub(1) as f64
    }

    fn main(&self, size: Size) -> f64 {
        match self.axis {
            Axis::Horizontal => size.width,
            Axis::Vertical | Axis::Layered => size.height,
        }
    }

    fn cross(&self, size: Size) -> f64 {
        match self.axis {
            Axis::Horizontal => size.height,
            Axis::Vertical | Axis::Layered => size.width,
        }
    }

    fn child_sizes(&self, proposal: ProposedSize, env: &Environment) -> Vec<Size> {
        let (main, cross) = match self.axis {
            Axis::Horizontal => (proposal.width, proposal.height),
            Axis::Vertical | Axis::Layered => (proposal.height, proposal.width),
        };
        let count = self.children.len().max(1) as f64;
        let share = main.map(|m| ((m - self.gaps()) / count).max(0.0));
        let child_proposal = match self.axis {
            Axis::Horizontal => ProposedSize {
                width: share,
                height: cross,
            },
            Axis::Vertical | Axis::Layered => ProposedSize {
                width: cross,
                height: share,
            },
        };
        self.children
            .iter()
            .map(|child| child.size_that_fits(child_proposal, env))
            .collect()
    }
}

impl View for Stack {
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size {
        if self.children.is_empty() {
            return Size::ZERO;
        }
        if self.axis == Axis::Layered {
            return self
                .children
                .iter()
                .map(|child| child.size_that_fits(proposal, env))
                .fold(Size::ZERO, |acc, s| {
                    Size::new(acc.width.max(s.width), acc.height.max(s.height))
                });
        }
        let sizes = self.child_sizes(proposal, env);
        let main = sizes.iter().map(|s| self.main(*s)).sum::<f64>() + self.gaps();
        let cross = sizes.iter().map(|s| self.cross(*s)).fold(0.0, f64::max);
        match self.axis {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical | Axis::Layered => Size::new(cross, main),
        }
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        let proposal = ProposedSize::fixed(bounds.size());
        if self.axis == Axis::Layered {
            for child in &self.children {
                let size = child.size_that_fits(proposal, cx.env());
                let rect = place(bounds, size, self.alignment, self.alignment);
                cx.paint_child(&**child, rect);
            }
            return;
        }
        let sizes = self.child_sizes(proposal, cx.env());
        let mut cursor = match self.axis {
            Axis::Horizontal => bounds.x0,
            Axis::Vertical | Axis::Layered => bounds.y0,
        };
        for (child, size) in self.children.iter().zip(sizes) {
            let rect = match self.axis {
                Axis::Horizontal => {
                    let slot = Rect::new(cursor, bounds.y0, cursor + size.width, bounds.y1);
                    place(slot, size, Alignment::Start, self.alignment)
                }
                Axis::Vertical | Axis::Layered => {
                    let slot = Rect::new(bounds.x0, cursor, bounds.x1, cursor + size.height);
                    place(slot, size, self.alignment, Alignment::Start)
                }
            };
            cx.paint_child(&**child, rect);
            cursor += self.main(size) + self.spacing;
        }
    }
}

/// A fixed base size multiplied by the environment's text scale.
///
/// Stands in for text-sized content: measuring it under larger content size
/// categories yields a proportionally larger size.
#[derive(Clone, Debug)]
pub struct ScaledFrame {
    base: Size,
    child: AnyView,
}

impl ScaledFrame {
    /// Wraps `child` at `base` size for the default content size.
    pub fn new(base: Size, child: impl View + 'static) -> Self {
        Self {
            base,
            child: any_view(child),
        }
    }
}

impl View for ScaledFrame {
    fn size_that_fits(&self, _proposal: ProposedSize, env: &Environment) -> Size {
        self.base * env.text_scale()
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        cx.paint_child(&*self.child, bounds);
    }
}

/// Content that paints only after a number of display cycles.
///
/// Hosts mount it as its own node; until it has rendered, the node's backing
/// layer is empty and the capture engine waits on its ready signal.
#[derive(Clone, Debug)]
pub struct Deferred {
    content: AnyView,
    ready_after: u32,
}

impl Deferred {
    /// `content` becomes ready `ready_after` display cycles after mounting.
    ///
    /// Zero means it is ready as soon as it is mounted.
    pub fn new(ready_after: u32, content: impl View + 'static) -> Self {
        Self {
            content: any_view(content),
            ready_after,
        }
    }

    /// Display cycles before the content is ready.
    #[must_use]
    pub fn ready_after(&self) -> u32 {
        self.ready_after
    }
}

impl View for Deferred {
    fn size_that_fits(&self, proposal: ProposedSize, env: &Environment) -> Size {
        self.content.size_that_fits(proposal, env)
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        cx.embed_deferred(bounds, self.content.clone(), self.ready_after);
    }
}

/// A pre-recorded picture of a given size.
///
/// Scenes draw themselves directly, so the capture engine skips the display pass
/// when one is the root view. The picture is stretched to the bounds it is given.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    size: Size,
    picture: DisplayList,
}

impl Scene {
    /// Wraps a picture recorded in a `size` coordinate space.
    #[must_use]
    pub fn new(size: Size, picture: DisplayList) -> Self {
        Self { size, picture }
    }

    /// The recorded picture.
    #[must_use]
    pub fn picture(&self) -> &DisplayList {
        &self.picture
    }
}

impl View for Scene {
    fn size_that_fits(&self, _proposal: ProposedSize, _env: &Environment) -> Size {
        self.size
    }

    fn paint(&self, cx: &mut PaintCx<'_>, bounds: Rect) {
        if self.size.width <= 0.0 || self.size.height <= 0.0 {
            return;
        }
        let transform = Affine::translate(bounds.origin().to_vec2())
            * Affine::scale_non_uniform(
                bounds.width() / self.size.width,
                bounds.height() / self.size.height,
            );
        cx.draw_picture(&self.picture, transform);
    }

    fn snapshots_itself(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Size};
    use peniko::Color;
    use understory_raster::{DisplayList, PaintOp};

    use super::{
        Alignment, Deferred, DynamicColor, Frame, Padding, ScaledFrame, Scene, Shape, Stack,
    };
    use crate::view::record;
    use crate::{
        Appearance, ContentSize, Environment, Insets, ProposedSize, TraitCollection, View,
    };

    const RED: Color = Color::from_rgba8(255, 0, 0, 255);

    fn env() -> Environment {
        Environment::default()
    }

    #[test]
    fn shapes_measure_zero_under_the_zero_proposal() {
        let shape = Shape::rect(RED);
        assert_eq!(shape.size_that_fits(ProposedSize::ZERO, &env()), Size::ZERO);
        assert_eq!(
            shape.size_that_fits(ProposedSize::UNSPECIFIED, &env()),
            Size::ZERO
        );
        assert_eq!(
            shape.size_that_fits(ProposedSize::fixed(Size::new(3.0, 4.0)), &env()),
            Size::new(3.0, 4.0)
        );
    }

    #[test]
    fn frame_overrides_only_fixed_axes() {
        let frame = Frame::new(Shape::rect(RED)).with_width(12.0);
        assert_eq!(
            frame.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(12.0, 0.0)
        );
        assert_eq!(
            frame.size_that_fits(ProposedSize::UNSPECIFIED, &env()),
            Size::new(12.0, 0.0)
        );
        let fixed = Frame::fixed(12.0, 7.0, Shape::rect(RED));
        assert_eq!(
            fixed.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(12.0, 7.0)
        );
    }

    #[test]
    fn padding_adds_insets() {
        let padded = Padding::new(
            Insets::new(1.0, 2.0, 3.0, 4.0),
            Frame::fixed(10.0, 10.0, Shape::rect(RED)),
        );
        assert_eq!(
            padded.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(16.0, 14.0)
        );
    }

    #[test]
    fn vertical_stack_sums_main_axis() {
        let stack = Stack::vertical()
            .with_spacing(2.0)
            .child(Frame::fixed(10.0, 5.0, Shape::rect(RED)))
            .child(Frame::fixed(20.0, 5.0, Shape::rect(RED)));
        assert_eq!(
            stack.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(20.0, 12.0)
        );
        assert_eq!(
            Stack::horizontal().size_that_fits(ProposedSize::ZERO, &env()),
            Size::ZERO
        );
    }

    #[test]
    fn horizontal_stack_splits_proposal_evenly() {
        let stack = Stack::horizontal()
            .child(Shape::rect(RED))
            .child(Shape::rect(RED));
        let list = record(&stack, Rect::new(0.0, 0.0, 10.0, 4.0), &env());
        assert_eq!(list.ops().len(), 2);
        assert_eq!(
            stack.size_that_fits(ProposedSize::fixed(Size::new(10.0, 4.0)), &env()),
            Size::new(10.0, 4.0)
        );
    }

    #[test]
    fn layered_stack_takes_the_largest_child() {
        let stack = Stack::layered()
            .with_alignment(Alignment::End)
            .child(Frame::fixed(4.0, 9.0, Shape::rect(RED)))
            .child(Frame::fixed(8.0, 2.0, Shape::rect(RED)));
        assert_eq!(
            stack.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(8.0, 9.0)
        );
    }

    #[test]
    fn scaled_frame_follows_content_size() {
        let view = ScaledFrame::new(Size::new(17.0, 34.0), Shape::rect(RED));
        let large = Environment::resolve(
            &TraitCollection::new().with_content_size(ContentSize::AccessibilityMedium),
        );
        assert_eq!(
            view.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(17.0, 34.0)
        );
        let scaled = view.size_that_fits(ProposedSize::ZERO, &large);
        assert!((scaled.width - 28.0).abs() < 1e-9, "width {}", scaled.width);
        assert!((scaled.height - 56.0).abs() < 1e-9, "height {}", scaled.height);
    }

    #[test]
    fn adaptive_colors_follow_appearance() {
        let blue = Color::from_rgba8(0, 0, 255, 255);
        let color = DynamicColor::Adaptive {
            light: RED,
            dark: blue,
        };
        assert_eq!(color.resolve(Appearance::Light), RED);
        assert_eq!(color.resolve(Appearance::Dark), blue);
        assert_eq!(
            DynamicColor::SystemBackground.resolve(Appearance::Dark),
            Appearance::Dark.system_background()
        );
    }

    #[test]
    fn deferred_measures_like_its_content() {
        let view = Deferred::new(3, Frame::fixed(6.0, 6.0, Shape::rect(RED)));
        assert_eq!(
            view.size_that_fits(ProposedSize::ZERO, &env()),
            Size::new(6.0, 6.0)
        );
        assert!(!view.snapshots_itself());
    }

    #[test]
    fn scene_stretches_its_picture() {
        let mut picture = DisplayList::new();
        picture.fill(&Rect::new(0.0, 0.0, 1.0, 1.0), RED);
        let scene = Scene::new(Size::new(1.0, 1.0), picture);
        assert!(scene.snapshots_itself());
        let list = record(&scene, Rect::new(2.0, 2.0, 6.0, 6.0), &env());
        assert!(
            list.ops()
                .iter()
                .any(|op| matches!(op, PaintOp::SetTransform(_))),
            "scene must be drawn under a transform"
        );
    }
}
