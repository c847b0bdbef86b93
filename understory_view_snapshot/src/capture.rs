// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render-and-capture engine.

use core::borrow::BorrowMut;
use core::fmt;
use core::marker::PhantomData;

use kurbo::{Affine, Size};
use tracing::Instrument as _;
use understory_raster::{Bitmap, DisplayList, NativeSurface, PixelSurface, render};

use crate::{
    AppearanceChoice, Async, HostingView, OffscreenWindow, ProposedSize, RestoreGuard,
    SnapshotConfig, SnapshotError, View, join_all,
};

/// Steps of one capture, in order.
///
/// A capture goes `Idle → SizeResolved → Mounted`, then either `SyncCaptured`
/// (self-snapshotting root) or `AwaitingSubrenders → AllReady → Captured`, and
/// finally `Restored → Done`. Transitions are logged at `debug` level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CapturePhase {
    /// Nothing has happened yet.
    Idle,
    /// The target size is known.
    SizeResolved,
    /// The host is sized, configured and (optionally) in a window.
    Mounted,
    /// The root view drew itself directly.
    SyncCaptured,
    /// Waiting on deferred content.
    AwaitingSubrenders,
    /// Every deferred node has rendered.
    AllReady,
    /// Pixels have been read back.
    Captured,
    /// Host state has been restored.
    Restored,
    /// The result has been handed over.
    Done,
}

fn enter(phase: CapturePhase) {
    tracing::debug!(?phase, "capture phase");
}

/// The result of one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Captured pixels.
    pub bitmap: Bitmap,
    /// Logical size the host was captured at.
    pub size: Size,
    /// Pixels per logical point.
    pub scale: f64,
}

/// Pixel extent of `len` logical points at `scale`.
///
/// Values within floating-point noise of an integer round to it; anything else
/// rounds up so no content is cut off.
#[allow(
    clippy::cast_possible_truncation,
    reason = "oversized extents saturate and are rejected by the raster backend"
)]
#[must_use]
pub fn pixel_extent(len: f64, scale: f64) -> u32 {
    let px = len * scale;
    let nearest = px.round();
    let px = if (px - nearest).abs() < 1e-6 {
        nearest
    } else {
        px.ceil()
    };
    px.max(0.0) as u32
}

/// Drives hosts through layout, display, the subrender barrier and rasterization.
///
/// `S` is the raster backend; it defaults to the one selected for this build.
pub struct SnapshotRenderer<S = NativeSurface> {
    _surface: PhantomData<fn() -> S>,
}

impl<S> fmt::Debug for SnapshotRenderer<S>
where
    S: PixelSurface,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotRenderer")
            .field("backend", &S::NAME)
            .finish()
    }
}

impl<S> Clone for SnapshotRenderer<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SnapshotRenderer<S> {}

impl Default for SnapshotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PixelSurface + 'static> SnapshotRenderer<S> {
    /// Creates a renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _surface: PhantomData,
        }
    }

    /// Captures `view` in a fresh, temporary host.
    ///
    /// The view is cloned into the host; the caller's value is never touched.
    pub fn capture_view<V>(
        &self,
        view: &V,
        config: &SnapshotConfig,
        window: Option<&OffscreenWindow>,
    ) -> Async<'static, Snapshot>
    where
        V: View + Clone + 'static,
    {
        self.capture::<V, _>(HostingView::new(view.clone()), config, window)
    }

    /// Captures a caller-owned host.
    ///
    /// Every mutation made to `host` is undone before the result is delivered, or
    /// while unwinding if the capture aborts.
    pub fn capture_host<'a, V>(
        &self,
        host: &'a mut HostingView<V>,
        config: &SnapshotConfig,
        window: Option<&OffscreenWindow>,
    ) -> Async<'a, Snapshot>
    where
        V: View + 'a,
    {
        self.capture::<V, _>(host, config, window)
    }

    /// Captures a host that is either owned or borrowed through `H`.
    ///
    /// # Panics
    ///
    /// Aborts with a [`SnapshotError`] message when the resolved size has a zero
    /// extent, when `window` is occupied or the host is already in a window, when
    /// the backend cannot allocate a surface, or when deferred content goes away
    /// before rendering.
    pub fn capture<'a, V, H>(
        &self,
        host: H,
        config: &SnapshotConfig,
        window: Option<&OffscreenWindow>,
    ) -> Async<'a, Snapshot>
    where
        V: View + 'a,
        H: BorrowMut<HostingView<V>> + 'a,
    {
        let span = tracing::debug_span!(
            "snapshot",
            layout = config.layout.label(),
            backend = S::NAME,
            width = tracing::field::Empty,
            height = tracing::field::Empty,
            scale = tracing::field::Empty,
        );
        let entered = span.enter();
        enter(CapturePhase::Idle);

        let mut render_config = config.resolve();
        let mut guard = RestoreGuard::<V, H>::new(host);

        let traits = guard.traits().merged(&render_config.traits);
        guard.set_traits(traits);
        if let AppearanceChoice::Explicit(appearance) = config.appearance {
            guard.set_appearance(Some(appearance));
        }
        guard.set_safe_area(render_config.safe_area);

        let size = match render_config.size {
            Some(size) => size,
            None => {
                let size = guard.size_that_fits(ProposedSize::ZERO);
                render_config.size = Some(size);
                size
            }
        };
        tracing::debug!(
            phase = ?CapturePhase::SizeResolved,
            size = ?render_config.size,
            "capture phase"
        );

        if let Some(window) = window {
            if let Err(err) = guard.attach(window) {
                err.abort();
            }
        }
        if !(size.width > 0.0 && size.height > 0.0) {
            SnapshotError::ZeroSize(size).abort();
        }
        guard.set_frame(size);

        let scale = guard.environment().display_scale;
        let width = pixel_extent(size.width, scale);
        let height = pixel_extent(size.height, scale);
        span.record("width", width);
        span.record("height", height);
        span.record("scale", scale);
        enter(CapturePhase::Mounted);

        if guard.root_view().snapshots_itself() {
            let picture = guard.draw_directly();
            let bitmap = rasterize::<S>(&picture, width, height, scale);
            enter(CapturePhase::SyncCaptured);
            drop(guard);
            enter(CapturePhase::Restored);
            enter(CapturePhase::Done);
            return Async::Ready(Snapshot {
                bitmap,
                size,
                scale,
            });
        }

        guard.layout_if_needed();
        guard.display();
        let signals = guard.ready_signals();
        tracing::debug!(
            phase = ?CapturePhase::AwaitingSubrenders,
            count = signals.len(),
            "capture phase"
        );
        drop(entered);

        Async::pending(
            async move {
                let subrenders = match join_all(signals).await {
                    Ok(subrenders) => subrenders,
                    Err(err) => err.abort(),
                };
                enter(CapturePhase::AllReady);

                for subrender in subrenders {
                    guard.insert_overlay(subrender.node, subrender.picture);
                }
                guard.display();
                let bitmap = rasterize::<S>(&guard.composite(), width, height, scale);
                enter(CapturePhase::Captured);

                drop(guard);
                enter(CapturePhase::Restored);
                enter(CapturePhase::Done);
                Snapshot {
                    bitmap,
                    size,
                    scale,
                }
            }
            .instrument(span),
        )
    }
}

fn rasterize<S: PixelSurface>(
    picture: &DisplayList,
    width: u32,
    height: u32,
    scale: f64,
) -> Bitmap {
    match render::<S>(picture, width, height, Affine::scale(scale)) {
        Ok(bitmap) => bitmap,
        Err(err) => SnapshotError::from(err).abort(),
    }
}

/// Captures `view` with the build's raster backend and waits for the result.
///
/// # Panics
///
/// See [`SnapshotRenderer::capture`].
pub fn snapshot_view<V>(view: &V, config: &SnapshotConfig) -> Snapshot
where
    V: View + Clone + 'static,
{
    SnapshotRenderer::<NativeSurface>::new()
        .capture_view(view, config, None)
        .wait()
}

#[cfg(test)]
mod tests {
    use super::pixel_extent;

    #[test]
    fn pixel_extent_rounds_up_fractions() {
        assert_eq!(pixel_extent(10.0, 1.0), 10);
        assert_eq!(pixel_extent(10.2, 1.0), 11);
        assert_eq!(pixel_extent(10.5, 2.0), 21);
        assert_eq!(pixel_extent(0.1, 3.0), 1);
    }

    #[test]
    fn pixel_extent_ignores_float_noise() {
        assert_eq!(pixel_extent(0.1 + 0.2, 10.0), 3);
        assert_eq!(pixel_extent(37.0 / 3.0, 3.0), 37);
    }
}
