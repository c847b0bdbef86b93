// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen windows: reuse, occupancy and what they contribute to the environment.

use understory_view_snapshot::{
    Appearance, AppearanceChoice, Bitmap, HostingView, OffscreenWindow, Shape, SnapshotConfig,
    SnapshotRenderer, Snapshotting, Stack,
};

mod common;

use common::{BLACK_PX, BLUE, BLUE_PX, RED, RED_PX, WHITE_PX};

#[test]
fn window_can_be_reused_sequentially() {
    common::init_tracing();
    let window = OffscreenWindow::new(1.0);
    let strategy = Snapshotting::<Shape, Bitmap>::view_in_window(
        SnapshotConfig::fixed(6.0, 6.0, Appearance::Light),
        window.clone(),
    );

    let red = strategy.snapshot(&Shape::rect(RED)).wait();
    assert!(window.is_empty());
    let blue = strategy.snapshot(&Shape::rect(BLUE)).wait();
    assert!(window.is_empty());

    assert_eq!(red.pixel(3, 3), Some(RED_PX));
    assert_eq!(blue.pixel(3, 3), Some(BLUE_PX));
}

#[test]
#[should_panic(expected = "already has content view")]
fn occupied_window_aborts() {
    let window = OffscreenWindow::new(1.0);
    let mut occupant = HostingView::new(Shape::rect(RED));
    window.set_content_view(&mut occupant).unwrap();

    SnapshotRenderer::default()
        .capture_view(
            &Shape::rect(BLUE),
            &SnapshotConfig::fixed(4.0, 4.0, Appearance::Light),
            Some(&window),
        )
        .wait();
}

#[test]
#[should_panic(expected = "already attached to a window")]
fn host_in_another_window_aborts() {
    let first = OffscreenWindow::new(1.0);
    let second = OffscreenWindow::new(1.0);
    let mut host = HostingView::new(Shape::rect(RED));
    first.set_content_view(&mut host).unwrap();

    SnapshotRenderer::default()
        .capture_host(
            &mut host,
            &SnapshotConfig::fixed(4.0, 4.0, Appearance::Light),
            Some(&second),
        )
        .wait();
}

#[test]
fn window_supplies_scale_and_appearance() {
    let window = OffscreenWindow::new(2.0).with_appearance(Appearance::Dark);
    let view = Stack::horizontal()
        .child(Shape::rect(RED))
        .child(Stack::vertical());
    let renderer = SnapshotRenderer::default();

    let inherited = renderer
        .capture_view(
            &view,
            &SnapshotConfig::fixed(8.0, 4.0, AppearanceChoice::PlatformDefault),
            Some(&window),
        )
        .wait();
    assert_eq!(inherited.scale, 2.0);
    assert_eq!(inherited.bitmap.width(), 16);
    assert_eq!(inherited.bitmap.pixel(2, 4), Some(RED_PX));
    assert_eq!(inherited.bitmap.pixel(12, 4), Some(BLACK_PX));

    let forced = renderer
        .capture_view(
            &view,
            &SnapshotConfig::fixed(8.0, 4.0, Appearance::Light),
            Some(&window),
        )
        .wait();
    assert_eq!(forced.bitmap.pixel(12, 4), Some(WHITE_PX));
    assert_eq!(window.appearance(), Some(Appearance::Dark));
}
