// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot strategies: composable value-to-format transforms.
//!
//! A [`Snapshotting<V, F>`] turns a `V` into a comparable `F`, possibly
//! asynchronously. Strategies compose by pulling back along a transform of their
//! input: the view strategy is the bitmap identity strategy pulled back along
//! "capture this view".

use core::fmt;
use std::rc::Rc;

use futures::FutureExt as _;
use futures::future::{Either, LocalBoxFuture, Ready};
use understory_raster::{Bitmap, NativeSurface};

use crate::{OffscreenWindow, RunLoop, SnapshotConfig, SnapshotRenderer, View};

/// A value that is either available now or produced later on the run loop.
pub enum Async<'a, T> {
    /// Available on the current call stack.
    Ready(T),
    /// Produced once the future completes.
    Pending(LocalBoxFuture<'a, T>),
}

impl<T: fmt::Debug> fmt::Debug for Async<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.debug_tuple("Pending").finish_non_exhaustive(),
        }
    }
}

impl<'a, T: 'a> Async<'a, T> {
    /// Wraps a value that is already available.
    pub fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    /// Wraps a future.
    pub fn pending(future: impl Future<Output = T> + 'a) -> Self {
        Self::Pending(future.boxed_local())
    }

    /// True if the value is available without waiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Transforms the eventual value.
    pub fn map<U: 'a>(self, f: impl FnOnce(T) -> U + 'a) -> Async<'a, U> {
        match self {
            Self::Ready(value) => Async::Ready(f(value)),
            Self::Pending(future) => Async::Pending(future.map(f).boxed_local()),
        }
    }

    /// Chains another asynchronous step. Stays ready if both steps are.
    pub fn and_then<U: 'a>(self, f: impl FnOnce(T) -> Async<'a, U> + 'a) -> Async<'a, U> {
        match self {
            Self::Ready(value) => f(value),
            Self::Pending(future) => Async::pending(async move { f(future.await).await }),
        }
    }

    /// Returns the value, running the current thread's [`RunLoop`] while pending.
    ///
    /// # Panics
    ///
    /// Aborts if the run loop stalls with the value still pending.
    pub fn wait(self) -> T {
        match self {
            Self::Ready(value) => value,
            Self::Pending(future) => match RunLoop::current().block_on(future) {
                Ok(value) => value,
                Err(err) => err.abort(),
            },
        }
    }

    /// Delivers the value to `callback`, exactly once.
    pub fn run(self, callback: impl FnOnce(T)) {
        callback(self.wait());
    }
}

impl<'a, T: 'a> IntoFuture for Async<'a, T> {
    type Output = T;
    type IntoFuture = Either<Ready<T>, LocalBoxFuture<'a, T>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(value) => Either::Left(futures::future::ready(value)),
            Self::Pending(future) => Either::Right(future),
        }
    }
}

/// A strategy for turning a `V` into a comparable `F`.
pub struct Snapshotting<V: ?Sized, F> {
    snapshot: Rc<dyn Fn(&V) -> Async<'static, F>>,
}

impl<V: ?Sized, F> Clone for Snapshotting<V, F> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Rc::clone(&self.snapshot),
        }
    }
}

impl<V: ?Sized, F> fmt::Debug for Snapshotting<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshotting").finish_non_exhaustive()
    }
}

impl<V: ?Sized + 'static, F: 'static> Snapshotting<V, F> {
    /// Wraps a snapshot function.
    pub fn new(snapshot: impl Fn(&V) -> Async<'static, F> + 'static) -> Self {
        Self {
            snapshot: Rc::new(snapshot),
        }
    }

    /// Snapshots `value`.
    pub fn snapshot(&self, value: &V) -> Async<'static, F> {
        (self.snapshot)(value)
    }

    /// Adapts this strategy to inputs of type `N` through a synchronous transform.
    #[must_use]
    pub fn pullback<N: ?Sized + 'static>(
        &self,
        transform: impl Fn(&N) -> V + 'static,
    ) -> Snapshotting<N, F>
    where
        V: Sized,
    {
        let inner = self.clone();
        Snapshotting::new(move |value: &N| inner.snapshot(&transform(value)))
    }

    /// Adapts this strategy to inputs of type `N` through an asynchronous transform.
    #[must_use]
    pub fn async_pullback<N: ?Sized + 'static>(
        &self,
        transform: impl Fn(&N) -> Async<'static, V> + 'static,
    ) -> Snapshotting<N, F>
    where
        V: Sized,
    {
        let inner = self.clone();
        Snapshotting::new(move |value: &N| {
            let inner = inner.clone();
            transform(value).and_then(move |v| inner.snapshot(&v))
        })
    }
}

impl Snapshotting<Bitmap, Bitmap> {
    /// The identity strategy over bitmaps.
    #[must_use]
    pub fn image() -> Self {
        Self::new(|bitmap: &Bitmap| Async::Ready(bitmap.clone()))
    }
}

impl<V: View + Clone + 'static> Snapshotting<V, Bitmap> {
    /// Renders views to bitmaps with `config`, each in a fresh host.
    #[must_use]
    pub fn view(config: SnapshotConfig) -> Self {
        Snapshotting::<Bitmap, Bitmap>::image().async_pullback(move |view: &V| {
            SnapshotRenderer::<NativeSurface>::new()
                .capture_view(view, &config, None)
                .map(|snapshot| snapshot.bitmap)
        })
    }

    /// Like [`Snapshotting::view`], but hosts each view in `window`.
    ///
    /// The window must be empty whenever a snapshot is taken.
    #[must_use]
    pub fn view_in_window(config: SnapshotConfig, window: OffscreenWindow) -> Self {
        Snapshotting::<Bitmap, Bitmap>::image().async_pullback(move |view: &V| {
            SnapshotRenderer::<NativeSurface>::new()
                .capture_view(view, &config, Some(&window))
                .map(|snapshot| snapshot.bitmap)
        })
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use understory_raster::Bitmap;

    use super::{Async, Snapshotting};

    fn pixel(value: u8) -> Bitmap {
        Bitmap::from_rgba8(1, 1, vec![value, value, value, 255]).unwrap()
    }

    #[test]
    fn pullback_adapts_the_input() {
        let strategy = Snapshotting::image().pullback(|v: &u8| pixel(*v));
        let out = strategy.snapshot(&7).wait();
        assert_eq!(out.pixel(0, 0), Some([7, 7, 7, 255]));
    }

    #[test]
    fn async_pullback_stays_ready_when_the_transform_is() {
        let strategy =
            Snapshotting::image().async_pullback(|v: &u8| Async::ready(pixel(*v)));
        assert!(strategy.snapshot(&1).is_ready());

        let deferred = Snapshotting::image()
            .async_pullback(|v: &u8| Async::pending(futures::future::ready(pixel(*v))));
        let result = deferred.snapshot(&3);
        assert!(!result.is_ready());
        assert_eq!(result.wait().pixel(0, 0), Some([3, 3, 3, 255]));
    }

    #[test]
    fn run_calls_back_once() {
        let calls = Cell::new(0);
        Async::pending(async { 5 }).run(|v| {
            assert_eq!(v, 5);
            calls.set(calls.get() + 1);
        });
        Async::ready(6).run(|_| calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn map_composes() {
        assert_eq!(Async::ready(2).map(|v| v * 3).wait(), 6);
        assert_eq!(Async::pending(async { 2 }).map(|v| v + 1).wait(), 3);
    }
}
