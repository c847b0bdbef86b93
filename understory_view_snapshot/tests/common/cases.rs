// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};
use understory_view_snapshot::{
    AnyView, Appearance, ContentSize, Deferred, DeviceProfile, DisplayList, DynamicColor, Frame,
    Layout, Orientation, Padding, ScaledFrame, Scene, Shape, ShapeKind, SnapshotConfig, Stack,
    TraitCollection, any_view,
};

use super::{BLACK_PX, BLUE, BLUE_PX, GREEN, GREEN_PX, RED, RED_PX, WHITE_PX};

/// A named view plus how to snapshot it.
pub(crate) trait SnapshotCase: Sync {
    fn name(&self) -> &'static str;

    fn config(&self) -> SnapshotConfig;

    fn view(&self) -> AnyView;

    /// Bitmap dimensions the capture must produce, if known up front.
    fn expected_pixels(&self) -> Option<(u32, u32)> {
        None
    }

    /// Pixels that must hold a given RGBA value.
    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[]
    }
}

struct FixedLightStack;

impl SnapshotCase for FixedLightStack {
    fn name(&self) -> &'static str {
        "fixed_light_stack"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::fixed(20.0, 20.0, Appearance::Light)
    }

    fn view(&self) -> AnyView {
        any_view(
            Stack::vertical()
                .child(Shape::rect(RED))
                .child(Shape::rect(BLUE)),
        )
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((20, 20))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(10, 5, RED_PX), (10, 15, BLUE_PX)]
    }
}

struct FixedDarkLabel;

impl SnapshotCase for FixedDarkLabel {
    fn name(&self) -> &'static str {
        "fixed_dark_label"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::fixed(16.0, 16.0, Appearance::Dark)
    }

    fn view(&self) -> AnyView {
        any_view(Padding::uniform(4.0, Shape::rect(DynamicColor::Label)))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(1, 1, BLACK_PX), (8, 8, WHITE_PX)]
    }
}

struct IntrinsicFrame;

impl SnapshotCase for IntrinsicFrame {
    fn name(&self) -> &'static str {
        "intrinsic_frame"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::new(Layout::SizeThatFits, Appearance::Light)
    }

    fn view(&self) -> AnyView {
        any_view(Frame::fixed(24.0, 12.0, Shape::ellipse(GREEN)))
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((24, 12))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(12, 6, GREEN_PX), (0, 0, WHITE_PX)]
    }
}

struct DeviceSafeArea;

impl SnapshotCase for DeviceSafeArea {
    fn name(&self) -> &'static str {
        "device_iphone_se_portrait"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::new(
            Layout::Device(DeviceProfile::iphone_se(Orientation::Portrait)),
            Appearance::Light,
        )
        .with_traits(TraitCollection::new().with_display_scale(1.0))
    }

    fn view(&self) -> AnyView {
        any_view(Shape::rect(BLUE))
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((320, 568))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(10, 10, WHITE_PX), (160, 300, BLUE_PX)]
    }
}

struct DeferredRow;

impl SnapshotCase for DeferredRow {
    fn name(&self) -> &'static str {
        "deferred_row"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::fixed(30.0, 10.0, Appearance::Light)
    }

    fn view(&self) -> AnyView {
        any_view(
            Stack::horizontal()
                .child(Deferred::new(2, Shape::rect(RED)))
                .child(Deferred::new(0, Shape::rect(GREEN)))
                .child(Deferred::new(1, Shape::rect(BLUE))),
        )
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((30, 10))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(5, 5, RED_PX), (15, 5, GREEN_PX), (25, 5, BLUE_PX)]
    }
}

struct LargestContentSize;

impl SnapshotCase for LargestContentSize {
    fn name(&self) -> &'static str {
        "scaled_accessibility_xxxl"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::new(Layout::SizeThatFits, Appearance::Light).with_traits(
            TraitCollection::new()
                .with_content_size(ContentSize::AccessibilityExtraExtraExtraLarge),
        )
    }

    fn view(&self) -> AnyView {
        any_view(ScaledFrame::new(Size::new(10.0, 10.0), Shape::rect(RED)))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(5, 5, RED_PX), (25, 25, RED_PX)]
    }
}

struct SceneAtDoubleScale;

impl SnapshotCase for SceneAtDoubleScale {
    fn name(&self) -> &'static str {
        "scene_double_scale"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::fixed(8.0, 8.0, Appearance::Light)
            .with_traits(TraitCollection::new().with_display_scale(2.0))
    }

    fn view(&self) -> AnyView {
        let mut picture = DisplayList::new();
        picture.fill(&Rect::new(0.0, 0.0, 2.0, 4.0), RED);
        picture.fill(&Rect::new(2.0, 0.0, 4.0, 4.0), BLUE);
        any_view(Scene::new(Size::new(4.0, 4.0), picture))
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((16, 16))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[(2, 8, RED_PX), (13, 8, BLUE_PX)]
    }
}

struct StrokedOutlines;

impl SnapshotCase for StrokedOutlines {
    fn name(&self) -> &'static str {
        "stroked_outlines"
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::fixed(40.0, 20.0, Appearance::Light)
    }

    fn view(&self) -> AnyView {
        any_view(
            Stack::horizontal()
                .child(Shape::outline(ShapeKind::Rect, 4.0, RED))
                .child(Shape::rect(BLUE).with_stroke(4.0, GREEN)),
        )
    }

    fn expected_pixels(&self) -> Option<(u32, u32)> {
        Some((40, 20))
    }

    fn expected_colors(&self) -> &'static [(u32, u32, [u8; 4])] {
        &[
            (1, 10, RED_PX),
            (10, 1, RED_PX),
            (18, 10, RED_PX),
            (10, 10, WHITE_PX),
            (21, 10, GREEN_PX),
            (30, 18, GREEN_PX),
            (30, 10, BLUE_PX),
        ]
    }
}

static CASES: &[&dyn SnapshotCase] = &[
    &FixedLightStack,
    &FixedDarkLabel,
    &IntrinsicFrame,
    &DeviceSafeArea,
    &DeferredRow,
    &LargestContentSize,
    &SceneAtDoubleScale,
    &StrokedOutlines,
];

pub(crate) fn matches_glob(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let Some((prefix, rest)) = pattern.split_once('*') else {
        return pattern == text;
    };
    let Some(mut remainder) = text.strip_prefix(prefix) else {
        return false;
    };
    let mut parts = rest.split('*').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            return remainder.ends_with(part);
        }
        match remainder.find(part) {
            Some(idx) => remainder = &remainder[idx + part.len()..],
            None => return false,
        }
    }
    true
}

fn case_filters() -> Option<Vec<String>> {
    let raw = std::env::var("UNDERSTORY_VIEW_CASE").ok()?;
    let filters: Vec<String> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!filters.is_empty()).then_some(filters)
}

pub(crate) fn selected_cases() -> Vec<&'static dyn SnapshotCase> {
    let Some(filters) = case_filters() else {
        return CASES.to_vec();
    };

    let selected: Vec<&'static dyn SnapshotCase> = CASES
        .iter()
        .copied()
        .filter(|case| filters.iter().any(|f| matches_glob(f, case.name())))
        .collect();

    if selected.is_empty() {
        let available: Vec<&str> = CASES.iter().map(|c| c.name()).collect();
        panic!(
            "UNDERSTORY_VIEW_CASE matched no snapshot cases.\n  filter: {filters:?}\n  available: {available:?}"
        );
    }

    selected
}
