// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout strategies and their resolution into a [`RenderConfig`].

use kurbo::Size;

use crate::{AppearanceChoice, DeviceProfile, Insets, TraitCollection};

/// How a snapshot derives its size.
#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
    /// Use a device profile's screen size, safe area and traits.
    Device(DeviceProfile),
    /// Use exactly this size in logical points; content is proposed the whole rectangle.
    Fixed {
        /// Width in logical points.
        width: f64,
        /// Height in logical points.
        height: f64,
    },
    /// Ask the content for its minimum size.
    SizeThatFits,
}

impl Layout {
    /// Short label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Device(profile) => profile.name,
            Self::Fixed { .. } => "fixed",
            Self::SizeThatFits => "size_that_fits",
        }
    }
}

/// A resolved layout: what the host is configured with before capture.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Safe-area insets.
    pub safe_area: Insets,
    /// Target size, or `None` while it still has to be measured.
    pub size: Option<Size>,
    /// Traits applied to the host.
    pub traits: TraitCollection,
}

/// Resolves `layout` against caller `traits` and an appearance choice.
///
/// Device traits are merged under the caller's (the caller wins). An explicit
/// appearance replaces whatever appearance the traits carried; the platform default
/// leaves it alone.
#[must_use]
pub fn resolve(
    layout: &Layout,
    traits: &TraitCollection,
    appearance: AppearanceChoice,
) -> RenderConfig {
    let (safe_area, size, mut traits) = match layout {
        Layout::Device(profile) => (
            profile.safe_area,
            Some(profile.size),
            profile.traits.merged(traits),
        ),
        Layout::Fixed { width, height } => {
            (Insets::ZERO, Some(Size::new(*width, *height)), traits.clone())
        }
        Layout::SizeThatFits => (Insets::ZERO, None, traits.clone()),
    };
    if let AppearanceChoice::Explicit(appearance) = appearance {
        traits.appearance = Some(appearance);
    }
    RenderConfig {
        safe_area,
        size,
        traits,
    }
}
