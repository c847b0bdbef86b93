// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_raster --heading-base-level=0

//! Understory Raster: recorded paint lists and deterministic CPU rasterization.
//!
//! This crate is the pixel side of Understory view snapshots. It provides:
//!
//! - [`DisplayList`]: a small, recorded paint IR (state ops + draw ops) in logical
//!   coordinates. Views paint into a display list; hosts composite display lists.
//! - [`PixelSurface`]: the capability a raster backend implements to replay a
//!   display list into pixels.
//! - [`Bitmap`]: the RGBA8, straight-alpha output value handed to comparison tools.
//!
//! ## Backends
//!
//! Backends are selected at build time with cargo features, not at runtime:
//!
//! - `vello_cpu` (default): the sparse-strips `vello_cpu` renderer, forced onto its
//!   u8 pipeline so output is stable across configurations.
//! - `tiny_skia`: the `tiny-skia` rasterizer.
//!
//! [`NativeSurface`] names the backend chosen for this build. When both features
//! are enabled, `vello_cpu` wins.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Affine, Rect};
//! use peniko::Color;
//! use understory_raster::{DisplayList, NativeSurface, render};
//!
//! let mut list = DisplayList::new();
//! list.fill(&Rect::new(0.0, 0.0, 8.0, 8.0), Color::from_rgba8(255, 0, 0, 255));
//!
//! let bitmap = render::<NativeSurface>(&list, 8, 8, Affine::IDENTITY).unwrap();
//! assert_eq!(bitmap.pixel(4, 4), Some([255, 0, 0, 255]));
//! ```

#![deny(unsafe_code)]

mod bitmap;
mod display_list;
mod surface;

#[cfg(feature = "tiny_skia")]
mod tiny_skia_surface;
#[cfg(feature = "vello_cpu")]
mod vello_cpu_surface;

pub use bitmap::Bitmap;
pub use display_list::{DisplayList, FillRule, PaintOp};
pub use surface::{PixelSurface, RasterError, render};

#[cfg(feature = "tiny_skia")]
pub use tiny_skia_surface::TinySkiaSurface;
#[cfg(feature = "vello_cpu")]
pub use vello_cpu_surface::VelloCpuSurface;

/// The raster backend selected for this build.
#[cfg(feature = "vello_cpu")]
pub type NativeSurface = VelloCpuSurface;

/// The raster backend selected for this build.
#[cfg(all(feature = "tiny_skia", not(feature = "vello_cpu")))]
pub type NativeSurface = TinySkiaSurface;

#[cfg(not(any(feature = "vello_cpu", feature = "tiny_skia")))]
compile_error!("understory_raster needs a raster backend: enable `vello_cpu` or `tiny_skia`");
