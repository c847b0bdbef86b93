// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;

use crate::{Idiom, Insets, SizeClass, TraitCollection};

/// Device orientation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Taller than wide.
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// A named device viewport: screen size, safe area and the traits it implies.
///
/// Snapshots laid out with [`Layout::Device`](crate::Layout::Device) take their size
/// and safe area from the profile, independent of the content's intrinsic size.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceProfile {
    /// Profile name, including orientation.
    pub name: &'static str,
    /// Screen size in logical points.
    pub size: Size,
    /// Safe-area insets in logical points.
    pub safe_area: Insets,
    /// Traits the device presents to content.
    pub traits: TraitCollection,
}

fn phone_traits(scale: f64, orientation: Orientation, wide_landscape: bool) -> TraitCollection {
    let (horizontal, vertical) = match orientation {
        Orientation::Portrait => (SizeClass::Compact, SizeClass::Regular),
        Orientation::Landscape if wide_landscape => (SizeClass::Regular, SizeClass::Compact),
        Orientation::Landscape => (SizeClass::Compact, SizeClass::Compact),
    };
    TraitCollection::new()
        .with_display_scale(scale)
        .with_size_classes(horizontal, vertical)
        .with_idiom(Idiom::Phone)
}

fn pad_traits(scale: f64) -> TraitCollection {
    TraitCollection::new()
        .with_display_scale(scale)
        .with_size_classes(SizeClass::Regular, SizeClass::Regular)
        .with_idiom(Idiom::Pad)
}

impl DeviceProfile {
    /// Creates a custom profile.
    #[must_use]
    pub fn new(
        name: &'static str,
        size: Size,
        safe_area: Insets,
        traits: TraitCollection,
    ) -> Self {
        Self {
            name,
            size,
            safe_area,
            traits,
        }
    }

    /// 4-inch phone with a status bar.
    #[must_use]
    pub fn iphone_se(orientation: Orientation) -> Self {
        let traits = phone_traits(2.0, orientation, false);
        match orientation {
            Orientation::Portrait => Self::new(
                "iphone_se_portrait",
                Size::new(320.0, 568.0),
                Insets::new(20.0, 0.0, 0.0, 0.0),
                traits,
            ),
            Orientation::Landscape => Self::new(
                "iphone_se_landscape",
                Size::new(568.0, 320.0),
                Insets::ZERO,
                traits,
            ),
        }
    }

    /// 4.7-inch phone with a status bar.
    #[must_use]
    pub fn iphone_8(orientation: Orientation) -> Self {
        let traits = phone_traits(2.0, orientation, false);
        match orientation {
            Orientation::Portrait => Self::new(
                "iphone_8_portrait",
                Size::new(375.0, 667.0),
                Insets::new(20.0, 0.0, 0.0, 0.0),
                traits,
            ),
            Orientation::Landscape => Self::new(
                "iphone_8_landscape",
                Size::new(667.0, 375.0),
                Insets::ZERO,
                traits,
            ),
        }
    }

    /// 5.5-inch phone; regular width in landscape.
    #[must_use]
    pub fn iphone_8_plus(orientation: Orientation) -> Self {
        let traits = phone_traits(3.0, orientation, true);
        match orientation {
            Orientation::Portrait => Self::new(
                "iphone_8_plus_portrait",
                Size::new(414.0, 736.0),
                Insets::new(20.0, 0.0, 0.0, 0.0),
                traits,
            ),
            Orientation::Landscape => Self::new(
                "iphone_8_plus_landscape",
                Size::new(736.0, 414.0),
                Insets::ZERO,
                traits,
            ),
        }
    }

    /// 5.8-inch phone with a sensor housing and home indicator.
    #[must_use]
    pub fn iphone_x(orientation: Orientation) -> Self {
        let traits = phone_traits(3.0, orientation, false);
        match orientation {
            Orientation::Portrait => Self::new(
                "iphone_x_portrait",
                Size::new(375.0, 812.0),
                Insets::new(44.0, 0.0, 34.0, 0.0),
                traits,
            ),
            Orientation::Landscape => Self::new(
                "iphone_x_landscape",
                Size::new(812.0, 375.0),
                Insets::new(0.0, 44.0, 21.0, 44.0),
                traits,
            ),
        }
    }

    /// 6.1-inch phone with a sensor housing and home indicator.
    #[must_use]
    pub fn iphone_13(orientation: Orientation) -> Self {
        let traits = phone_traits(3.0, orientation, false);
        match orientation {
            Orientation::Portrait => Self::new(
                "iphone_13_portrait",
                Size::new(390.0, 844.0),
                Insets::new(47.0, 0.0, 34.0, 0.0),
                traits,
            ),
            Orientation::Landscape => Self::new(
                "iphone_13_landscape",
                Size::new(844.0, 390.0),
                Insets::new(0.0, 47.0, 21.0, 47.0),
                traits,
            ),
        }
    }

    /// 7.9-inch tablet.
    #[must_use]
    pub fn ipad_mini(orientation: Orientation) -> Self {
        let safe_area = Insets::new(20.0, 0.0, 0.0, 0.0);
        match orientation {
            Orientation::Portrait => Self::new(
                "ipad_mini_portrait",
                Size::new(768.0, 1024.0),
                safe_area,
                pad_traits(2.0),
            ),
            Orientation::Landscape => Self::new(
                "ipad_mini_landscape",
                Size::new(1024.0, 768.0),
                safe_area,
                pad_traits(2.0),
            ),
        }
    }

    /// 11-inch tablet with a home indicator.
    #[must_use]
    pub fn ipad_pro_11(orientation: Orientation) -> Self {
        let safe_area = Insets::new(24.0, 0.0, 20.0, 0.0);
        match orientation {
            Orientation::Portrait => Self::new(
                "ipad_pro_11_portrait",
                Size::new(834.0, 1194.0),
                safe_area,
                pad_traits(2.0),
            ),
            Orientation::Landscape => Self::new(
                "ipad_pro_11_landscape",
                Size::new(1194.0, 834.0),
                safe_area,
                pad_traits(2.0),
            ),
        }
    }

    /// Every built-in profile in `orientation`.
    #[must_use]
    pub fn all(orientation: Orientation) -> [Self; 7] {
        [
            Self::iphone_se(orientation),
            Self::iphone_8(orientation),
            Self::iphone_8_plus(orientation),
            Self::iphone_x(orientation),
            Self::iphone_13(orientation),
            Self::ipad_mini(orientation),
            Self::ipad_pro_11(orientation),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceProfile, Orientation};
    use crate::SizeClass;

    #[test]
    fn landscape_swaps_portrait_extents() {
        for (portrait, landscape) in DeviceProfile::all(Orientation::Portrait)
            .into_iter()
            .zip(DeviceProfile::all(Orientation::Landscape))
        {
            assert_eq!(portrait.size.width, landscape.size.height, "{}", portrait.name);
            assert_eq!(portrait.size.height, landscape.size.width, "{}", portrait.name);
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = DeviceProfile::all(Orientation::Portrait)
            .iter()
            .chain(DeviceProfile::all(Orientation::Landscape).iter())
            .map(|p| p.name)
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn size_classes_follow_orientation() {
        let x = DeviceProfile::iphone_x(Orientation::Landscape);
        assert_eq!(x.traits.horizontal_size_class, Some(SizeClass::Compact));
        assert_eq!(x.traits.vertical_size_class, Some(SizeClass::Compact));

        let plus = DeviceProfile::iphone_8_plus(Orientation::Landscape);
        assert_eq!(plus.traits.horizontal_size_class, Some(SizeClass::Regular));

        let pad = DeviceProfile::ipad_mini(Orientation::Portrait);
        assert_eq!(pad.traits.vertical_size_class, Some(SizeClass::Regular));
    }

    #[test]
    fn notched_phones_have_landscape_side_insets() {
        let x = DeviceProfile::iphone_13(Orientation::Landscape);
        assert_eq!(x.safe_area.left, 47.0);
        assert_eq!(x.safe_area.right, 47.0);
        assert_eq!(x.safe_area.top, 0.0);
    }
}
