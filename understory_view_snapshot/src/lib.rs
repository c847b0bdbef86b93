// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_view_snapshot --heading-base-level=0

//! Understory View Snapshot: render declarative views into deterministic bitmaps.
//!
//! This crate hosts a [`View`] in an offscreen [`HostingView`], drives it through
//! layout and display, waits for any asynchronously rendered content, and reads the
//! result back as a [`Bitmap`]. The caller's host is always returned to the state it
//! was in before the capture.
//!
//! ## Pieces
//!
//! - [`SnapshotConfig`] and [`Layout`]: how big to render and with which
//!   environment. [`resolve_layout`] turns a layout into a concrete [`RenderConfig`].
//! - [`DeviceProfile`]: canned device sizes, safe areas and traits.
//! - [`HostingView`] and [`OffscreenWindow`]: the host and its optional window.
//! - [`SnapshotRenderer`]: the render-and-capture engine, generic over the raster
//!   backend.
//! - [`RunLoop`] and [`join_all`]: the display-cycle scheduler and the barrier
//!   over [`Deferred`] content.
//! - [`RestoreGuard`]: undoes every mutation to a host when dropped.
//! - [`Snapshotting`]: composable strategies, with [`Snapshotting::view`] as the
//!   view-to-bitmap strategy.
//!
//! ## Failures
//!
//! Misuse is fatal. Zero-sized targets, occupied windows and lost deferred content
//! log a [`SnapshotError`] through `tracing` and then panic with its message.
//!
//! ## Minimal example
//!
//! ```rust
//! use peniko::Color;
//! use understory_view_snapshot::{Appearance, Shape, SnapshotConfig, snapshot_view};
//!
//! let view = Shape::rect(Color::from_rgba8(0, 0, 255, 255));
//! let snapshot = snapshot_view(&view, &SnapshotConfig::fixed(10.0, 4.0, Appearance::Light));
//!
//! assert_eq!(snapshot.bitmap.width(), 10);
//! assert_eq!(snapshot.bitmap.height(), 4);
//! assert_eq!(snapshot.bitmap.pixel(5, 2), Some([0, 0, 255, 255]));
//! ```

#![deny(unsafe_code)]

mod capture;
mod config;
mod device;
mod environment;
mod error;
mod host;
mod layout;
mod restore;
mod run_loop;
mod strategy;
mod view;
mod views;

pub use capture::{CapturePhase, Snapshot, SnapshotRenderer, pixel_extent, snapshot_view};
pub use config::SnapshotConfig;
pub use device::{DeviceProfile, Orientation};
pub use environment::{
    Appearance, AppearanceChoice, ContentSize, Environment, Idiom, Insets, SizeClass,
    TraitCollection,
};
pub use error::SnapshotError;
pub use host::{
    HostFlags, HostId, HostingView, NodeFlags, NodeId, NodeKind, OffscreenWindow, PlatformNode,
};
pub use layout::{Layout, RenderConfig, resolve as resolve_layout};
pub use restore::RestoreGuard;
pub use run_loop::{ReadySignal, RunLoop, Subrender, join_all};
pub use strategy::{Async, Snapshotting};
pub use view::{AnyView, PaintCx, ProposedSize, View, any_view};
pub use views::{
    Alignment, Axis, Deferred, DynamicColor, Frame, Padding, ScaledFrame, Scene, Shape,
    ShapeKind, Stack,
};

pub use understory_raster::{Bitmap, DisplayList, NativeSurface};
