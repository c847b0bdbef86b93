// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::borrow::BorrowMut;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use kurbo::Size;

use crate::{Appearance, HostingView, Insets, OffscreenWindow, SnapshotError, TraitCollection};

/// Host state captured before a capture mutates it.
#[derive(Clone, Debug, PartialEq)]
struct RestoreSnapshot {
    frame: Size,
    appearance: Option<Appearance>,
    traits: TraitCollection,
    safe_area: Insets,
}

/// Undoes every mutation made to a host during one capture, when dropped.
///
/// The guard owns or borrows the host through `H`. Dropping it (normally or while
/// unwinding) removes temporary overlays, restores the frame, restores appearance,
/// traits and safe area, and, if it attached the host to a window, detaches it and
/// clears the host's backing layers.
pub struct RestoreGuard<V, H: BorrowMut<HostingView<V>>> {
    host: H,
    saved: RestoreSnapshot,
    attached: Option<OffscreenWindow>,
    _view: PhantomData<fn() -> V>,
}

impl<V, H: BorrowMut<HostingView<V>>> fmt::Debug for RestoreGuard<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreGuard")
            .field("host", &self.host.borrow().id())
            .field("saved", &self.saved)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl<V, H: BorrowMut<HostingView<V>>> RestoreGuard<V, H> {
    /// Captures the host's current state.
    pub fn new(host: H) -> Self {
        let h = host.borrow();
        let saved = RestoreSnapshot {
            frame: h.frame(),
            appearance: h.appearance(),
            traits: h.traits().clone(),
            safe_area: h.safe_area(),
        };
        Self {
            host,
            saved,
            attached: None,
            _view: PhantomData,
        }
    }

    /// Makes the host `window`'s content view until the guard drops.
    pub fn attach(&mut self, window: &OffscreenWindow) -> Result<(), SnapshotError> {
        window.set_content_view(self.host.borrow_mut())?;
        self.attached = Some(window.clone());
        Ok(())
    }

    /// True if this guard attached the host to a window.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }
}

impl<V, H: BorrowMut<HostingView<V>>> Deref for RestoreGuard<V, H> {
    type Target = HostingView<V>;

    fn deref(&self) -> &Self::Target {
        self.host.borrow()
    }
}

impl<V, H: BorrowMut<HostingView<V>>> DerefMut for RestoreGuard<V, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.host.borrow_mut()
    }
}

impl<V, H: BorrowMut<HostingView<V>>> Drop for RestoreGuard<V, H> {
    fn drop(&mut self) {
        let host = self.host.borrow_mut();
        let overlays = host.remove_temporary_subviews();
        host.set_frame(self.saved.frame);
        host.set_appearance(self.saved.appearance);
        host.set_traits(self.saved.traits.clone());
        host.set_safe_area(self.saved.safe_area);
        if let Some(window) = self.attached.take() {
            window.remove_content_view(host);
            host.clear_layers();
        }
        tracing::debug!(host = host.id().get(), overlays, "host restored");
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;
    use peniko::Color;

    use super::RestoreGuard;
    use crate::{
        Appearance, Deferred, HostingView, Insets, OffscreenWindow, Shape, TraitCollection,
    };

    #[test]
    fn restores_borrowed_host() {
        let mut host = HostingView::new(Deferred::new(
            0,
            Shape::rect(Color::from_rgba8(9, 9, 9, 255)),
        ));
        host.set_frame(Size::new(5.0, 6.0));
        host.set_traits(TraitCollection::new().with_display_scale(2.0));
        let window = OffscreenWindow::new(1.0);
        {
            let mut guard = RestoreGuard::<Deferred, _>::new(&mut host);
            assert!(!guard.is_attached());
            guard.attach(&window).unwrap();
            assert!(guard.is_attached());
            guard.set_frame(Size::new(50.0, 60.0));
            guard.set_appearance(Some(Appearance::Dark));
            guard.set_safe_area(Insets::uniform(3.0));
            guard.set_traits(TraitCollection::new());
            guard.display();
            let node = guard.deferred_subviews()[0];
            guard.insert_overlay(node, understory_raster::DisplayList::new());
            assert!(window.content_view().is_some());
        }
        assert_eq!(host.frame(), Size::new(5.0, 6.0));
        assert_eq!(host.appearance(), None);
        assert_eq!(host.safe_area(), Insets::ZERO);
        assert_eq!(host.traits().display_scale, Some(2.0));
        assert!(host.window().is_none());
        assert!(window.is_empty());
        assert_eq!(host.layer_count(), 0);
        assert_eq!(host.subview_count(), 1, "only the overlay is removed");
    }

    #[test]
    fn unattached_guard_leaves_window_alone() {
        let window = OffscreenWindow::new(1.0);
        let mut host = HostingView::new(Shape::rect(Color::from_rgba8(0, 0, 0, 255)));
        window.set_content_view(&mut host).unwrap();
        let guard = RestoreGuard::<Shape, _>::new(&mut host);
        assert!(!guard.is_attached(), "the host was attached by its owner");
        drop(guard);
        assert!(host.window().is_some());
        assert_eq!(window.content_view(), Some(host.id()));
    }
}
