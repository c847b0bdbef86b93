// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cooperative display-cycle scheduler and the subrender barrier.
//!
//! Deferred content is registered with the thread's [`RunLoop`] when it is
//! mounted. Each [`RunLoop::tick`] is one display cycle: deferred content counts
//! cycles down and, once it has rendered, resolves every [`ReadySignal`] handed out
//! for it. [`join_all`] is the barrier over those signals.

use core::cell::RefCell;
use core::fmt;
use core::pin::{Pin, pin};
use core::task::{Context, Poll};
use std::rc::{Rc, Weak};

use futures::FutureExt as _;
use futures::channel::oneshot;
use kurbo::{Rect, Size};
use understory_raster::DisplayList;

use crate::view::record;
use crate::{AnyView, Environment, NodeId, SnapshotError};

thread_local! {
    static CURRENT: RunLoop = RunLoop::new();
}

struct RunLoopState {
    cycle: u64,
    observers: Vec<Weak<RefCell<DeferredState>>>,
}

/// A single-threaded display-cycle scheduler.
///
/// Cloning yields another handle to the same loop.
#[derive(Clone)]
pub struct RunLoop {
    state: Rc<RefCell<RunLoopState>>,
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RunLoop")
            .field("cycle", &state.cycle)
            .field("observers", &state.observers.len())
            .finish()
    }
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLoop {
    /// Creates a loop with no scheduled work.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RunLoopState {
                cycle: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// The loop belonging to the current thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// Display cycles run so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.state.borrow().cycle
    }

    /// True if some mounted deferred content has not rendered yet.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.state
            .borrow()
            .observers
            .iter()
            .any(|weak| weak.strong_count() > 0)
    }

    pub(crate) fn schedule(&self, deferred: &Rc<RefCell<DeferredState>>) {
        if deferred.borrow().is_loaded() {
            return;
        }
        self.state.borrow_mut().observers.push(Rc::downgrade(deferred));
    }

    /// Runs one display cycle.
    ///
    /// Returns false when there was nothing to advance.
    pub fn tick(&self) -> bool {
        let (cycle, observers) = {
            let mut state = self.state.borrow_mut();
            state.cycle += 1;
            (state.cycle, core::mem::take(&mut state.observers))
        };
        let mut advanced = false;
        let mut pending = Vec::with_capacity(observers.len());
        for weak in observers {
            let Some(deferred) = weak.upgrade() else {
                continue;
            };
            advanced = true;
            if !deferred.borrow_mut().advance() {
                pending.push(weak);
            }
        }
        tracing::trace!(cycle, pending = pending.len(), "display cycle");
        self.state.borrow_mut().observers.extend(pending);
        advanced
    }

    /// Runs display cycles until no deferred content is pending.
    ///
    /// Returns the number of cycles run.
    pub fn run_until_idle(&self) -> u64 {
        let mut cycles = 0;
        while self.tick() {
            cycles += 1;
        }
        cycles
    }

    /// Drives `future` to completion, running a display cycle whenever it is pending.
    ///
    /// Fails with [`SnapshotError::Stalled`] if the future is pending and no
    /// display work is left to make progress with.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, SnapshotError> {
        let mut future = pin!(future);
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return Ok(output);
            }
            if !self.tick() {
                return Err(SnapshotError::Stalled {
                    cycles: self.cycle(),
                });
            }
        }
    }
}

/// Render state of one mounted piece of deferred content.
pub(crate) struct DeferredState {
    node: NodeId,
    remaining: u32,
    content: AnyView,
    size: Size,
    env: Environment,
    picture: Option<DisplayList>,
    waiters: Vec<oneshot::Sender<DisplayList>>,
}

impl fmt::Debug for DeferredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredState")
            .field("node", &self.node)
            .field("remaining", &self.remaining)
            .field("loaded", &self.picture.is_some())
            .field("waiters", &self.waiters.len())
            .finish_non_exhaustive()
    }
}

impl DeferredState {
    pub(crate) fn new(
        node: NodeId,
        content: AnyView,
        size: Size,
        env: Environment,
        ready_after: u32,
    ) -> Self {
        let mut state = Self {
            node,
            remaining: ready_after,
            content,
            size,
            env,
            picture: None,
            waiters: Vec::new(),
        };
        if ready_after == 0 {
            state.load();
        }
        state
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.picture.is_some()
    }

    /// Renders the content in its own coordinate space and wakes every waiter.
    fn load(&mut self) {
        let bounds = Rect::from_origin_size((0.0, 0.0), self.size);
        let picture = record(&*self.content, bounds, &self.env);
        for waiter in self.waiters.drain(..) {
            // A dropped receiver means nobody is waiting anymore.
            let _ = waiter.send(picture.clone());
        }
        self.picture = Some(picture);
    }

    /// Counts down one display cycle. Returns true once loaded.
    pub(crate) fn advance(&mut self) -> bool {
        if self.is_loaded() {
            return true;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.load();
        }
        self.is_loaded()
    }

    /// A signal that resolves with the rendered picture.
    pub(crate) fn subscribe(&mut self) -> ReadySignal {
        let (sender, receiver) = oneshot::channel();
        match &self.picture {
            Some(picture) => {
                let _ = sender.send(picture.clone());
            }
            None => self.waiters.push(sender),
        }
        ReadySignal {
            node: self.node,
            receiver,
        }
    }
}

/// Rendered deferred content, delivered through a [`ReadySignal`].
#[derive(Clone, Debug, PartialEq)]
pub struct Subrender {
    /// Node the content is mounted at.
    pub node: NodeId,
    /// The content's picture, in the node's coordinate space.
    pub picture: DisplayList,
}

/// One-shot readiness of a deferred node.
///
/// Resolves with the node's picture once it has rendered, or with
/// [`SnapshotError::SubrenderDropped`] if the node goes away first.
#[derive(Debug)]
#[must_use = "ready signals do nothing unless awaited"]
pub struct ReadySignal {
    node: NodeId,
    receiver: oneshot::Receiver<DisplayList>,
}

impl ReadySignal {
    /// Node this signal belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Future for ReadySignal {
    type Output = Result<Subrender, SnapshotError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.receiver.poll_unpin(cx).map(|result| match result {
            Ok(picture) => {
                tracing::trace!(node = this.node.get(), "subrender ready");
                Ok(Subrender {
                    node: this.node,
                    picture,
                })
            }
            Err(oneshot::Canceled) => Err(SnapshotError::SubrenderDropped {
                node: this.node.get(),
            }),
        })
    }
}

/// Waits for every signal; completion order does not matter.
///
/// Results come back in the order the signals were given.
pub async fn join_all(signals: Vec<ReadySignal>) -> Result<Vec<Subrender>, SnapshotError> {
    futures::future::join_all(signals)
        .await
        .into_iter()
        .collect()
}
