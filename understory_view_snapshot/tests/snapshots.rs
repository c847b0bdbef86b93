// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Every registered case, captured twice with the build's backend and compared with `kompari`.

use understory_view_snapshot::{AnyView, Bitmap, Snapshotting, snapshot_view};

mod common;

#[test]
fn snapshots() {
    common::init_tracing();
    common::run_cases(|case| snapshot_view(&case.view(), &case.config()));
}

#[test]
fn view_strategy_matches_direct_capture() {
    common::init_tracing();
    let mut errors = Vec::new();
    for case in common::cases::selected_cases() {
        let view = case.view();
        let strategy = Snapshotting::<AnyView, Bitmap>::view(case.config());
        let bitmap = strategy.snapshot(&view).wait();

        for &(x, y, expected) in case.expected_colors() {
            let actual = bitmap.pixel(x, y);
            if actual != Some(expected) {
                errors.push(format!(
                    "`{}` pixel ({x}, {y}) is {actual:?}, expected {expected:?}",
                    case.name()
                ));
            }
        }
        let direct = snapshot_view(&view, &case.config());
        if (direct.bitmap.width(), direct.bitmap.height()) != (bitmap.width(), bitmap.height()) {
            errors.push(format!("`{}` differs in size from a direct capture", case.name()));
        } else {
            common::assert_same_pixels(case.name(), &direct.bitmap, &bitmap);
        }
    }
    common::assert_no_snapshot_errors(errors);
}

#[test]
fn case_filter_globs() {
    use common::cases::matches_glob;

    assert!(matches_glob("*", "deferred_row"));
    assert!(matches_glob("deferred_row", "deferred_row"));
    assert!(matches_glob("fixed_*", "fixed_dark_label"));
    assert!(matches_glob("*_label", "fixed_dark_label"));
    assert!(matches_glob("fixed_*_label", "fixed_dark_label"));
    assert!(!matches_glob("fixed_*", "intrinsic_frame"));
    assert!(!matches_glob("*_row", "deferred_row_2"));
}
