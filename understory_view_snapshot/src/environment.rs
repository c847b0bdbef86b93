// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};
use peniko::Color;

/// Light or dark color scheme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Appearance {
    /// Light color scheme.
    Light,
    /// Dark color scheme.
    Dark,
}

impl Appearance {
    /// Appearance used when nothing in the host, its traits or its window picks one.
    pub const PLATFORM_DEFAULT: Self = Self::Light;

    /// Background color hosts paint under their content.
    #[must_use]
    pub const fn system_background(self) -> Color {
        match self {
            Self::Light => Color::from_rgba8(255, 255, 255, 255),
            Self::Dark => Color::from_rgba8(0, 0, 0, 255),
        }
    }

    /// Primary foreground color.
    #[must_use]
    pub const fn label(self) -> Color {
        match self {
            Self::Light => Color::from_rgba8(0, 0, 0, 255),
            Self::Dark => Color::from_rgba8(255, 255, 255, 255),
        }
    }
}

/// How a snapshot picks its appearance.
///
/// There is deliberately no implicit default: callers either name an appearance or
/// opt into whatever the host and platform already use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AppearanceChoice {
    /// Force this appearance on the host for the duration of the capture.
    Explicit(Appearance),
    /// Leave the host's appearance untouched.
    PlatformDefault,
}

impl From<Appearance> for AppearanceChoice {
    fn from(appearance: Appearance) -> Self {
        Self::Explicit(appearance)
    }
}

/// Preferred text size category.
///
/// Views that scale with text (see [`ScaledFrame`](crate::ScaledFrame)) multiply
/// their base metrics by [`ContentSize::text_scale`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentSize {
    /// Extra small.
    ExtraSmall,
    /// Small.
    Small,
    /// Medium.
    Medium,
    /// Large (the default).
    Large,
    /// Extra large.
    ExtraLarge,
    /// Extra extra large.
    ExtraExtraLarge,
    /// Extra extra extra large.
    ExtraExtraExtraLarge,
    /// Accessibility medium.
    AccessibilityMedium,
    /// Accessibility large.
    AccessibilityLarge,
    /// Accessibility extra large.
    AccessibilityExtraLarge,
    /// Accessibility extra extra large.
    AccessibilityExtraExtraLarge,
    /// Accessibility extra extra extra large.
    AccessibilityExtraExtraExtraLarge,
}

impl ContentSize {
    const BASE_POINT_SIZE: f64 = 17.0;

    /// Body text point size for this category.
    #[must_use]
    pub const fn body_point_size(self) -> f64 {
        match self {
            Self::ExtraSmall => 14.0,
            Self::Small => 15.0,
            Self::Medium => 16.0,
            Self::Large => 17.0,
            Self::ExtraLarge => 19.0,
            Self::ExtraExtraLarge => 21.0,
            Self::ExtraExtraExtraLarge => 23.0,
            Self::AccessibilityMedium => 28.0,
            Self::AccessibilityLarge => 33.0,
            Self::AccessibilityExtraLarge => 40.0,
            Self::AccessibilityExtraExtraLarge => 47.0,
            Self::AccessibilityExtraExtraExtraLarge => 53.0,
        }
    }

    /// Scale factor relative to [`ContentSize::Large`].
    #[must_use]
    pub fn text_scale(self) -> f64 {
        self.body_point_size() / Self::BASE_POINT_SIZE
    }
}

/// Coarse horizontal or vertical space class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// Constrained space.
    Compact,
    /// Expansive space.
    Regular,
}

/// Kind of device the view is presented on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Idiom {
    /// Phone.
    Phone,
    /// Tablet.
    Pad,
    /// Desktop window.
    Desktop,
}

/// A set of optional trait overrides.
///
/// Unset fields defer to whatever the collection is merged over. See
/// [`TraitCollection::merged`] and [`Environment::resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraitCollection {
    /// Pixels per logical point.
    pub display_scale: Option<f64>,
    /// Color scheme.
    pub appearance: Option<Appearance>,
    /// Preferred text size.
    pub content_size: Option<ContentSize>,
    /// Horizontal size class.
    pub horizontal_size_class: Option<SizeClass>,
    /// Vertical size class.
    pub vertical_size_class: Option<SizeClass>,
    /// Device idiom.
    pub idiom: Option<Idiom>,
}

impl TraitCollection {
    /// An empty collection (no overrides).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a collection where every field set in `over` replaces the one in `self`.
    #[must_use]
    pub fn merged(&self, over: &Self) -> Self {
        Self {
            display_scale: over.display_scale.or(self.display_scale),
            appearance: over.appearance.or(self.appearance),
            content_size: over.content_size.or(self.content_size),
            horizontal_size_class: over.horizontal_size_class.or(self.horizontal_size_class),
            vertical_size_class: over.vertical_size_class.or(self.vertical_size_class),
            idiom: over.idiom.or(self.idiom),
        }
    }

    /// Sets the display scale.
    #[must_use]
    pub fn with_display_scale(mut self, scale: f64) -> Self {
        self.display_scale = Some(scale);
        self
    }

    /// Sets the appearance.
    #[must_use]
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    /// Sets the preferred text size.
    #[must_use]
    pub fn with_content_size(mut self, content_size: ContentSize) -> Self {
        self.content_size = Some(content_size);
        self
    }

    /// Sets both size classes.
    #[must_use]
    pub fn with_size_classes(mut self, horizontal: SizeClass, vertical: SizeClass) -> Self {
        self.horizontal_size_class = Some(horizontal);
        self.vertical_size_class = Some(vertical);
        self
    }

    /// Sets the idiom.
    #[must_use]
    pub fn with_idiom(mut self, idiom: Idiom) -> Self {
        self.idiom = Some(idiom);
        self
    }
}

/// Fully resolved traits that views measure and paint against.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    /// Pixels per logical point.
    pub display_scale: f64,
    /// Color scheme.
    pub appearance: Appearance,
    /// Preferred text size.
    pub content_size: ContentSize,
    /// Horizontal size class.
    pub horizontal_size_class: SizeClass,
    /// Vertical size class.
    pub vertical_size_class: SizeClass,
    /// Device idiom.
    pub idiom: Idiom,
}

impl Environment {
    /// Resolves `traits`, filling unset fields with platform defaults.
    #[must_use]
    pub fn resolve(traits: &TraitCollection) -> Self {
        Self {
            display_scale: traits.display_scale.unwrap_or(1.0),
            appearance: traits.appearance.unwrap_or(Appearance::PLATFORM_DEFAULT),
            content_size: traits.content_size.unwrap_or(ContentSize::Large),
            horizontal_size_class: traits.horizontal_size_class.unwrap_or(SizeClass::Regular),
            vertical_size_class: traits.vertical_size_class.unwrap_or(SizeClass::Regular),
            idiom: traits.idiom.unwrap_or(Idiom::Desktop),
        }
    }

    /// Text scale implied by [`Environment::content_size`].
    #[must_use]
    pub fn text_scale(&self) -> f64 {
        self.content_size.text_scale()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::resolve(&TraitCollection::new())
    }
}

/// Edge insets in logical points.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Insets {
    /// Top inset.
    pub top: f64,
    /// Left inset.
    pub left: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Right inset.
    pub right: f64,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates insets from top, left, bottom and right values.
    #[must_use]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Same inset on every edge.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Sum of left and right.
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Shrinks `rect` by these insets, never producing negative extents.
    #[must_use]
    pub fn inset_rect(&self, rect: Rect) -> Rect {
        let x0 = rect.x0 + self.left;
        let y0 = rect.y0 + self.top;
        let x1 = (rect.x1 - self.right).max(x0);
        let y1 = (rect.y1 - self.bottom).max(y0);
        Rect::new(x0, y0, x1, y1)
    }

    /// Grows `size` by these insets.
    #[must_use]
    pub fn outset_size(&self, size: Size) -> Size {
        Size::new(size.width + self.horizontal(), size.height + self.vertical())
    }
}
