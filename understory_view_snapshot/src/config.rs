// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{AppearanceChoice, Layout, RenderConfig, TraitCollection, layout};

/// Per-invocation snapshot settings.
///
/// There is no `Default`: every configuration names its layout and appearance choice.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotConfig {
    /// How the size is derived.
    pub layout: Layout,
    /// How the appearance is picked.
    pub appearance: AppearanceChoice,
    /// Trait overrides applied on top of the layout's own traits.
    pub traits: TraitCollection,
}

impl SnapshotConfig {
    /// Creates a configuration with no trait overrides.
    #[must_use]
    pub fn new(layout: Layout, appearance: impl Into<AppearanceChoice>) -> Self {
        Self {
            layout,
            appearance: appearance.into(),
            traits: TraitCollection::new(),
        }
    }

    /// Shorthand for a fixed-size layout.
    #[must_use]
    pub fn fixed(width: f64, height: f64, appearance: impl Into<AppearanceChoice>) -> Self {
        Self::new(Layout::Fixed { width, height }, appearance)
    }

    /// Replaces the trait overrides.
    #[must_use]
    pub fn with_traits(mut self, traits: TraitCollection) -> Self {
        self.traits = traits;
        self
    }

    /// Resolves the layout into a [`RenderConfig`].
    #[must_use]
    pub fn resolve(&self) -> RenderConfig {
        layout::resolve(&self.layout, &self.traits, self.appearance)
    }
}
