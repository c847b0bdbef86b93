// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;
use understory_raster::RasterError;

/// Conditions that end a snapshot invocation.
///
/// None of these are recoverable from inside a capture: the pipeline reports them
/// through [`SnapshotError::abort`], which logs and then panics. Restoration of a
/// caller-supplied host still runs while the panic unwinds.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The resolved size has a zero (or negative) extent.
    #[error("view not renderable to image at size {}x{}", .0.width, .0.height)]
    ZeroSize(Size),
    /// The host was already some window's content view.
    #[error("hosting view {host} is already attached to a window")]
    HostAlreadyAttached {
        /// Debug id of the host.
        host: u64,
    },
    /// The window already has a content view.
    #[error("window already has content view {occupant}; remove it before reusing the window")]
    WindowOccupied {
        /// Debug id of the current content view.
        occupant: u64,
    },
    /// A deferred view went away before it signalled readiness.
    #[error("deferred subview {node} was dropped before it finished rendering")]
    SubrenderDropped {
        /// Debug id of the deferred node.
        node: u64,
    },
    /// The capture is pending but the run loop has no display work left.
    #[error("run loop stalled after {cycles} display cycles with the capture still pending")]
    Stalled {
        /// Display cycles run before stalling.
        cycles: u64,
    },
    /// The raster backend could not produce a surface.
    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl SnapshotError {
    /// Logs the error and panics with its message.
    #[track_caller]
    pub fn abort(self) -> ! {
        tracing::error!(error = %self, "snapshot aborted");
        panic!("{self}");
    }
}
