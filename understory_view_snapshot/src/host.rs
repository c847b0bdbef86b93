// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hosting views, their mounted node hierarchy, and off-screen windows.
//!
//! A [`HostingView`] owns a view value and the platform state built for it: a
//! frame, appearance and trait overrides, safe-area insets, a tree of
//! [`PlatformNode`]s, retained backing layers, and an optional attachment to an
//! [`OffscreenWindow`].
//!
//! The hierarchy is rebuilt lazily. Changing anything that affects layout marks
//! the host with [`HostFlags::NEEDS_LAYOUT`]; [`HostingView::layout_if_needed`]
//! mounts the root view and any deferred content it embeds, and
//! [`HostingView::display`] records backing layers for every node.

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use understory_raster::DisplayList;

use crate::run_loop::DeferredState;
use crate::view::{Embed, record};
use crate::{
    Appearance, Environment, Insets, PaintCx, ProposedSize, ReadySignal, RunLoop, SnapshotError,
    TraitCollection, View,
};

static NEXT_HOST: AtomicU64 = AtomicU64::new(1);
static NEXT_NODE: AtomicU64 = AtomicU64::new(1);

/// Identifier of a [`HostingView`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(u64);

impl HostId {
    fn next() -> Self {
        Self(NEXT_HOST.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logs and error messages.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifier of a [`PlatformNode`].
///
/// Ids are never reused within a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logs and error messages.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

bitflags::bitflags! {
    /// Pending work on a hosting view.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HostFlags: u8 {
        /// The node hierarchy must be rebuilt.
        const NEEDS_LAYOUT  = 0b0000_0001;
        /// Backing layers must be re-recorded.
        const NEEDS_DISPLAY = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Per-node flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Added for the duration of one capture; removed on restore.
        const TEMPORARY = 0b0000_0001;
    }
}

/// What a node shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Content painted during layout.
    Content,
    /// Deferred content. Its backing layer stays empty; it is shown through an
    /// overlay once it has rendered.
    Deferred,
    /// A picture shown on top of its parent.
    Overlay,
}

/// A node in a host's mounted hierarchy.
///
/// Frames are relative to the parent node.
#[derive(Debug)]
pub struct PlatformNode {
    id: NodeId,
    frame: Rect,
    kind: NodeKind,
    slot: Option<usize>,
    picture: DisplayList,
    deferred: Option<Rc<RefCell<DeferredState>>>,
    flags: NodeFlags,
    layer: Option<DisplayList>,
    children: Vec<Self>,
}

impl PlatformNode {
    fn new(frame: Rect, kind: NodeKind, picture: DisplayList, flags: NodeFlags) -> Self {
        Self {
            id: NodeId::next(),
            frame,
            kind,
            slot: None,
            picture,
            deferred: None,
            flags,
            layer: None,
            children: Vec::new(),
        }
    }

    /// This node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Frame relative to the parent.
    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// What the node shows.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Node flags.
    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Recorded backing layer, if displayed.
    #[must_use]
    pub fn layer(&self) -> Option<&DisplayList> {
        self.layer.as_ref()
    }

    /// Child nodes, back to front.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Slot in the parent's layer this node is composited at.
    ///
    /// Nodes without a slot are composited after the parent's layer.
    #[must_use]
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    fn visit(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    fn display(&mut self) {
        self.visit_mut(&mut |node| {
            node.layer = Some(match node.kind {
                NodeKind::Content | NodeKind::Overlay => node.picture.clone(),
                NodeKind::Deferred => DisplayList::new(),
            });
        });
    }

    fn composite(&self, origin: Vec2, out: &mut DisplayList) {
        let origin = origin + self.frame.origin().to_vec2();
        let Some(layer) = &self.layer else {
            for child in &self.children {
                child.composite(origin, out);
            }
            return;
        };
        out.append_with_slots(layer, Affine::translate(origin), |slot, out| {
            if let Some(child) = self.children.iter().find(|c| c.slot == Some(slot)) {
                child.composite(origin, out);
            }
        });
        for child in self.children.iter().filter(|c| c.slot.is_none()) {
            child.composite(origin, out);
        }
    }

    fn remove_temporary(&mut self) -> usize {
        let before = self.children.len();
        self.children
            .retain(|child| !child.flags.contains(NodeFlags::TEMPORARY));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_temporary();
        }
        removed
    }
}

struct WindowState {
    backing_scale: f64,
    appearance: Option<Appearance>,
    content: Option<HostId>,
}

/// An off-screen window that hosts at most one content view.
///
/// Cloning yields another handle to the same window. The window contributes its
/// backing scale and appearance to the environment of its content view.
#[derive(Clone)]
pub struct OffscreenWindow {
    state: Rc<RefCell<WindowState>>,
}

impl fmt::Debug for OffscreenWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("OffscreenWindow")
            .field("backing_scale", &state.backing_scale)
            .field("appearance", &state.appearance)
            .field("content", &state.content)
            .finish()
    }
}

impl OffscreenWindow {
    /// An empty window with the given backing scale.
    #[must_use]
    pub fn new(backing_scale: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(WindowState {
                backing_scale,
                appearance: None,
                content: None,
            })),
        }
    }

    /// Sets the window's appearance.
    #[must_use]
    pub fn with_appearance(self, appearance: Appearance) -> Self {
        self.state.borrow_mut().appearance = Some(appearance);
        self
    }

    /// Pixels per logical point.
    #[must_use]
    pub fn backing_scale(&self) -> f64 {
        self.state.borrow().backing_scale
    }

    /// The window's appearance, if set.
    #[must_use]
    pub fn appearance(&self) -> Option<Appearance> {
        self.state.borrow().appearance
    }

    /// Id of the current content view.
    #[must_use]
    pub fn content_view(&self) -> Option<HostId> {
        self.state.borrow().content
    }

    /// True if the window has no content view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_view().is_none()
    }

    /// True if both handles refer to the same window.
    #[must_use]
    pub fn same_window(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Makes `host` this window's content view.
    ///
    /// Fails if the host is already in a window or this window is occupied.
    pub fn set_content_view<V>(&self, host: &mut HostingView<V>) -> Result<(), SnapshotError> {
        if host.window.is_some() {
            return Err(SnapshotError::HostAlreadyAttached {
                host: host.id.get(),
            });
        }
        if let Some(occupant) = self.content_view() {
            return Err(SnapshotError::WindowOccupied {
                occupant: occupant.get(),
            });
        }
        self.state.borrow_mut().content = Some(host.id);
        host.window = Some(self.clone());
        host.flags.insert(HostFlags::NEEDS_LAYOUT);
        tracing::debug!(host = host.id.get(), "attached to window");
        Ok(())
    }

    /// Detaches `host` if it is this window's content view.
    ///
    /// Returns true if it was detached.
    pub fn remove_content_view<V>(&self, host: &mut HostingView<V>) -> bool {
        match &host.window {
            Some(window) if window.same_window(self) => host.remove_from_window(),
            _ => false,
        }
    }

    fn clear_content(&self, host: HostId) {
        let mut state = self.state.borrow_mut();
        if state.content == Some(host) {
            state.content = None;
        }
    }
}

/// Hosts a view value inside a minimal platform hierarchy.
pub struct HostingView<V> {
    id: HostId,
    root: V,
    frame: Size,
    appearance: Option<Appearance>,
    traits: TraitCollection,
    safe_area: Insets,
    flags: HostFlags,
    hierarchy: Option<PlatformNode>,
    window: Option<OffscreenWindow>,
}

impl<V: fmt::Debug> fmt::Debug for HostingView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostingView")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("frame", &self.frame)
            .field("appearance", &self.appearance)
            .field("traits", &self.traits)
            .field("safe_area", &self.safe_area)
            .field("flags", &self.flags)
            .field("hierarchy", &self.hierarchy)
            .field("window", &self.window)
            .finish()
    }
}

impl<V> HostingView<V> {
    /// Hosts `root` with a zero frame and no overrides.
    pub fn new(root: V) -> Self {
        Self {
            id: HostId::next(),
            root,
            frame: Size::ZERO,
            appearance: None,
            traits: TraitCollection::new(),
            safe_area: Insets::ZERO,
            flags: HostFlags::NEEDS_LAYOUT | HostFlags::NEEDS_DISPLAY,
            hierarchy: None,
            window: None,
        }
    }

    /// This host's id.
    #[must_use]
    pub fn id(&self) -> HostId {
        self.id
    }

    /// The hosted view.
    #[must_use]
    pub fn root_view(&self) -> &V {
        &self.root
    }

    /// Pending work.
    #[must_use]
    pub fn flags(&self) -> HostFlags {
        self.flags
    }

    /// Marks the hierarchy for rebuilding.
    pub fn set_needs_layout(&mut self) {
        self.flags
            .insert(HostFlags::NEEDS_LAYOUT | HostFlags::NEEDS_DISPLAY);
    }

    /// Frame size in logical points.
    #[must_use]
    pub fn frame(&self) -> Size {
        self.frame
    }

    /// Resizes the host.
    pub fn set_frame(&mut self, frame: Size) {
        if self.frame != frame {
            self.frame = frame;
            self.set_needs_layout();
        }
    }

    /// Appearance override.
    #[must_use]
    pub fn appearance(&self) -> Option<Appearance> {
        self.appearance
    }

    /// Sets or clears the appearance override. It wins over traits and the window.
    pub fn set_appearance(&mut self, appearance: Option<Appearance>) {
        if self.appearance != appearance {
            self.appearance = appearance;
            self.set_needs_layout();
        }
    }

    /// Trait overrides.
    #[must_use]
    pub fn traits(&self) -> &TraitCollection {
        &self.traits
    }

    /// Replaces the trait overrides.
    pub fn set_traits(&mut self, traits: TraitCollection) {
        if self.traits != traits {
            self.traits = traits;
            self.set_needs_layout();
        }
    }

    /// Safe-area insets.
    #[must_use]
    pub fn safe_area(&self) -> Insets {
        self.safe_area
    }

    /// Sets the safe-area insets. Content is laid out inside them.
    pub fn set_safe_area(&mut self, safe_area: Insets) {
        if self.safe_area != safe_area {
            self.safe_area = safe_area;
            self.set_needs_layout();
        }
    }

    /// The window this host is the content view of.
    #[must_use]
    pub fn window(&self) -> Option<&OffscreenWindow> {
        self.window.as_ref()
    }

    /// Detaches from the window, if any. Returns true if it was attached.
    pub fn remove_from_window(&mut self) -> bool {
        let Some(window) = self.window.take() else {
            return false;
        };
        window.clear_content(self.id);
        self.set_needs_layout();
        tracing::debug!(host = self.id.get(), "detached from window");
        true
    }

    /// Environment the root view measures and paints against.
    ///
    /// The appearance override wins over trait overrides, which win over the
    /// window. Scale comes from traits, then the window, then `1.0`.
    #[must_use]
    pub fn environment(&self) -> Environment {
        let mut traits = match &self.window {
            Some(window) => {
                let mut inherited =
                    TraitCollection::new().with_display_scale(window.backing_scale());
                inherited.appearance = window.appearance();
                inherited.merged(&self.traits)
            }
            None => self.traits.clone(),
        };
        if let Some(appearance) = self.appearance {
            traits.appearance = Some(appearance);
        }
        Environment::resolve(&traits)
    }

    /// The mounted hierarchy, if laid out.
    #[must_use]
    pub fn hierarchy(&self) -> Option<&PlatformNode> {
        self.hierarchy.as_ref()
    }

    /// Number of nodes below the root.
    #[must_use]
    pub fn subview_count(&self) -> usize {
        let mut count = 0;
        if let Some(root) = &self.hierarchy {
            root.visit(&mut |_| count += 1);
            count -= 1;
        }
        count
    }

    /// Number of nodes with a recorded backing layer.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        let mut count = 0;
        if let Some(root) = &self.hierarchy {
            root.visit(&mut |node| count += usize::from(node.layer.is_some()));
        }
        count
    }

    /// Records backing layers for every node.
    pub fn display(&mut self)
    where
        V: View,
    {
        self.layout_if_needed();
        if let Some(root) = &mut self.hierarchy {
            root.display();
        }
        self.flags.remove(HostFlags::NEEDS_DISPLAY);
    }

    /// Drops every backing layer.
    pub fn clear_layers(&mut self) {
        if let Some(root) = &mut self.hierarchy {
            root.visit_mut(&mut |node| node.layer = None);
        }
        self.flags.insert(HostFlags::NEEDS_DISPLAY);
    }

    /// Composites all backing layers, clipped to the host's bounds.
    #[must_use]
    pub fn composite(&self) -> DisplayList {
        let mut out = DisplayList::new();
        let Some(root) = &self.hierarchy else {
            return out;
        };
        out.push_clip(&Rect::from_origin_size(Point::ZERO, self.frame));
        root.composite(Vec2::ZERO, &mut out);
        out.pop_clip();
        out
    }

    /// Ids of every deferred node, in tree order.
    #[must_use]
    pub fn deferred_subviews(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        if let Some(root) = &self.hierarchy {
            root.visit(&mut |node| {
                if node.kind == NodeKind::Deferred {
                    ids.push(node.id);
                }
            });
        }
        ids
    }

    /// One ready signal per deferred node, in tree order.
    pub fn ready_signals(&self) -> Vec<ReadySignal> {
        let mut signals = Vec::new();
        if let Some(root) = &self.hierarchy {
            root.visit(&mut |node| {
                if let Some(state) = &node.deferred {
                    signals.push(state.borrow_mut().subscribe());
                }
            });
        }
        signals
    }

    /// Adds a temporary node showing `picture` over the whole of `parent`.
    ///
    /// Returns `None` if `parent` is not mounted.
    pub fn insert_overlay(&mut self, parent: NodeId, picture: DisplayList) -> Option<NodeId> {
        let node = self.hierarchy.as_mut()?.find_mut(parent)?;
        let overlay = PlatformNode::new(
            Rect::from_origin_size(Point::ZERO, node.frame.size()),
            NodeKind::Overlay,
            picture,
            NodeFlags::TEMPORARY,
        );
        let id = overlay.id;
        node.children.push(overlay);
        self.flags.insert(HostFlags::NEEDS_DISPLAY);
        Some(id)
    }

    /// Removes every temporary node. Returns how many were removed.
    pub fn remove_temporary_subviews(&mut self) -> usize {
        let removed = self
            .hierarchy
            .as_mut()
            .map_or(0, PlatformNode::remove_temporary);
        if removed > 0 {
            self.flags.insert(HostFlags::NEEDS_DISPLAY);
        }
        removed
    }
}

impl<V: View> HostingView<V> {
    /// Size the host needs for `proposal`, including its safe area.
    #[must_use]
    pub fn size_that_fits(&self, proposal: ProposedSize) -> Size {
        let insets = self.safe_area;
        let inner = ProposedSize {
            width: proposal.width.map(|w| (w - insets.horizontal()).max(0.0)),
            height: proposal.height.map(|h| (h - insets.vertical()).max(0.0)),
        };
        insets.outset_size(self.root.size_that_fits(inner, &self.environment()))
    }

    /// Rebuilds the hierarchy if anything affecting layout changed.
    pub fn layout_if_needed(&mut self) {
        if self.hierarchy.is_some() && !self.flags.contains(HostFlags::NEEDS_LAYOUT) {
            return;
        }
        let env = self.environment();
        let bounds = Rect::from_origin_size(Point::ZERO, self.frame);
        let content = self.safe_area.inset_rect(bounds);

        let mut list = DisplayList::new();
        let mut embeds = Vec::new();
        list.fill(&bounds, env.appearance.system_background());
        {
            let mut cx = PaintCx::new(&mut list, Some(&mut embeds), &env);
            cx.with_clip(&content, |cx| self.root.paint(cx, content));
        }

        let mut root = PlatformNode::new(bounds, NodeKind::Content, list, NodeFlags::empty());
        let run_loop = RunLoop::current();
        for (slot, embed) in embeds.into_iter().enumerate() {
            root.children.push(mount_deferred(slot, embed, &env, &run_loop));
        }
        tracing::debug!(
            host = self.id.get(),
            width = self.frame.width,
            height = self.frame.height,
            deferred = root.children.len(),
            "mounted"
        );
        self.hierarchy = Some(root);
        self.flags.remove(HostFlags::NEEDS_LAYOUT);
        self.flags.insert(HostFlags::NEEDS_DISPLAY);
    }

    /// Draws the root view directly, bypassing the hierarchy.
    ///
    /// Only meaningful when the root view snapshots itself.
    #[must_use]
    pub fn draw_directly(&self) -> DisplayList {
        let bounds = Rect::from_origin_size(Point::ZERO, self.frame);
        record(&self.root, self.safe_area.inset_rect(bounds), &self.environment())
    }
}

fn mount_deferred(
    slot: usize,
    embed: Embed,
    env: &Environment,
    run_loop: &RunLoop,
) -> PlatformNode {
    let id = NodeId::next();
    let state = DeferredState::new(
        id,
        embed.content,
        embed.frame.size(),
        env.clone(),
        embed.ready_after,
    );
    let state = Rc::new(RefCell::new(state));
    run_loop.schedule(&state);
    PlatformNode {
        id,
        frame: embed.frame,
        kind: NodeKind::Deferred,
        slot: Some(slot),
        picture: DisplayList::new(),
        deferred: Some(state),
        flags: NodeFlags::empty(),
        layer: None,
        children: Vec::new(),
    }
}

impl<V> Drop for HostingView<V> {
    fn drop(&mut self) {
        self.remove_from_window();
    }
}
