// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for view snapshot integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(
    dead_code,
    reason = "Each test binary uses a different subset of the helpers."
)]

use kompari::{Image, ImageDifference, compare_images};
use peniko::Color;
use understory_view_snapshot::{Bitmap, Snapshot};

pub(crate) mod cases;

pub(crate) const RED: Color = Color::from_rgba8(255, 0, 0, 255);
pub(crate) const GREEN: Color = Color::from_rgba8(0, 255, 0, 255);
pub(crate) const BLUE: Color = Color::from_rgba8(0, 0, 255, 255);

pub(crate) const WHITE_PX: [u8; 4] = [255, 255, 255, 255];
pub(crate) const BLACK_PX: [u8; 4] = [0, 0, 0, 255];
pub(crate) const RED_PX: [u8; 4] = [255, 0, 0, 255];
pub(crate) const GREEN_PX: [u8; 4] = [0, 255, 0, 255];
pub(crate) const BLUE_PX: [u8; 4] = [0, 0, 255, 255];

/// Routes `tracing` output to the test harness. `RUST_LOG` picks the level.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn to_image(bitmap: &Bitmap) -> Image {
    kompari::image::ImageBuffer::from_raw(
        bitmap.width(),
        bitmap.height(),
        bitmap.as_rgba8().to_vec(),
    )
    .expect("RGBA buffer size should match image dimensions")
}

pub(crate) fn assert_same_pixels(name: &str, a: &Bitmap, b: &Bitmap) {
    match compare_images(&to_image(a), &to_image(b)) {
        ImageDifference::None => {}
        diff => panic!("`{name}` differs: {diff:?}"),
    }
}

/// Renders every selected case twice and checks the two captures agree.
pub(crate) fn run_cases(mut render: impl FnMut(&dyn cases::SnapshotCase) -> Snapshot) {
    let mut errors = Vec::new();
    for case in cases::selected_cases() {
        let first = render(case);
        let second = render(case);

        if let Some((width, height)) = case.expected_pixels() {
            let actual = (first.bitmap.width(), first.bitmap.height());
            if actual != (width, height) {
                errors.push(format!(
                    "`{}` has {}x{} pixels, expected {width}x{height}",
                    case.name(),
                    actual.0,
                    actual.1
                ));
            }
        }
        for &(x, y, expected) in case.expected_colors() {
            let actual = first.bitmap.pixel(x, y);
            if actual != Some(expected) {
                errors.push(format!(
                    "`{}` pixel ({x}, {y}) is {actual:?}, expected {expected:?}",
                    case.name()
                ));
            }
        }
        match compare_images(&to_image(&first.bitmap), &to_image(&second.bitmap)) {
            ImageDifference::None => {}
            diff => errors.push(format!(
                "`{}` is not deterministic, diff: {diff:?}",
                case.name()
            )),
        }
    }
    assert_no_snapshot_errors(errors);
}

pub(crate) fn assert_no_snapshot_errors(errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }

    eprintln!("Snapshot failures (set `UNDERSTORY_VIEW_CASE` to narrow the run):");
    for error in &errors {
        eprintln!("  - {error}");
    }
    panic!("snapshot failures: {}", errors.len());
}
