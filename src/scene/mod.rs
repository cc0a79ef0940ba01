//! The scene tree: an arena of nodes addressed by stable handles.
//!
//! Nodes are identified by [`NodeId`] keys in a [`SlotMap`]; parent links,
//! ordered child lists and per-node state live in [`SecondaryMap`]s keyed by
//! the same handle. Parents are plain handles rather than owning pointers,
//! so ancestor walks are O(1) per step and the tree cannot form reference
//! cycles. The [`Scene`] is an explicitly owned value passed through by the
//! caller; nothing here lives in process-wide storage.

mod state;

use std::cell::RefCell;
use std::rc::Rc;

use peniko::kurbo::Point;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::event::{EventCallback, EventListener, EventPropagation, InputEvent};
use crate::gesture::DragOptions;
use crate::pool::{PoolMeta, Pooled};
use crate::style::Style;

pub use state::{AbsolutePosition, ChangeFlags, NodeState};

new_key_type! {
    /// A small stable identifier for a node in the scene tree.
    pub struct NodeId;
}

#[derive(Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, ()>,
    parent: SecondaryMap<NodeId, Option<NodeId>>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    states: SecondaryMap<NodeId, NodeState>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with default style and state.
    pub fn create_node(&mut self) -> NodeId {
        let id = self.nodes.insert(());
        self.parent.insert(id, None);
        self.children.insert(id, Vec::new());
        self.states.insert(id, NodeState::default());
        id
    }

    /// Whether `id` still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Remove `id` and its entire subtree from the arena.
    pub fn remove_node(&mut self, id: NodeId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(children) = self.children.remove(node) {
                stack.extend(children);
            }
            self.parent.remove(node);
            self.states.remove(node);
            self.nodes.remove(node);
        }
    }

    // =========================================================================
    // Tree management
    // =========================================================================

    /// Attach `child` under `parent`, optionally at a sibling index. The
    /// child is detached from any previous parent first. Returns `false`
    /// without mutating when the attachment would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> bool {
        if parent == child || self.is_ancestor(child, parent) {
            log::debug!("rejected add_child: {child:?} is an ancestor of {parent:?}");
            return false;
        }
        self.detach(child);
        let siblings = &mut self.children[parent];
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, child);
        self.parent[child] = Some(parent);
        self.resort_children(parent);
        true
    }

    /// Detach `child` from `parent`. Returns `false` if it was not a child
    /// of `parent`. The node stays alive, parentless.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent.get(child).copied().flatten() != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied().flatten()
    }

    /// Children of `id` in z-order (back to front).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn for_each_child(&self, id: NodeId, mut f: impl FnMut(NodeId)) {
        for child in self.children(id) {
            f(*child);
        }
    }

    /// True if `ancestor` appears on `id`'s parent chain (inclusive of `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent.get(id).copied().flatten() {
            self.children[parent].retain(|c| *c != id);
        }
        self.parent[id] = None;
    }

    /// Stable resort of `parent`'s children by z-index; insertion order is
    /// preserved among equal z values.
    fn resort_children(&mut self, parent: NodeId) {
        let mut order: Vec<NodeId> = self.children[parent].clone();
        order.sort_by_key(|id| self.states[*id].style.z_index);
        self.children[parent] = order;
    }

    // =========================================================================
    // Style and state
    // =========================================================================

    pub fn style(&self, id: NodeId) -> &Style {
        &self.states[id].style
    }

    pub fn state(&self, id: NodeId) -> &NodeState {
        &self.states[id]
    }

    /// Mutate a node's style. Size changes run the resize hook (setting
    /// [`ChangeFlags::REFLOW`]); z-index changes trigger a stable resort of
    /// the sibling list; any change marks the node for repaint.
    pub fn update_style(&mut self, id: NodeId, f: impl FnOnce(&mut Style)) {
        let (old_w, old_h, old_z) = {
            let style = &self.states[id].style;
            (style.width, style.height, style.z_index)
        };
        f(&mut self.states[id].style);
        let style = &self.states[id].style;
        let resized = style.width != old_w || style.height != old_h;
        let reordered = style.z_index != old_z;
        self.states[id].changes |= ChangeFlags::REPAINT;
        if resized {
            self.on_resize(id);
        }
        if reordered && let Some(parent) = self.parent(id) {
            self.resort_children(parent);
        }
    }

    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        self.update_style(id, |s| {
            s.x = x;
            s.y = y;
        });
    }

    pub fn set_size(&mut self, id: NodeId, width: f64, height: f64) {
        self.update_style(id, |s| {
            s.width = width;
            s.height = height;
        });
    }

    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) {
        self.update_style(id, |s| s.z_index = z_index);
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.update_style(id, |s| s.visible = visible);
    }

    fn on_resize(&mut self, id: NodeId) {
        self.states[id].changes |= ChangeFlags::REFLOW;
    }

    /// Read and clear the node's dirty flags. Called by the external layout
    /// and render passes once per tick.
    pub fn take_changes(&mut self, id: NodeId) -> ChangeFlags {
        std::mem::take(&mut self.states[id].changes)
    }

    pub fn set_can_handle_events(&mut self, id: NodeId, can: bool) {
        self.states[id].can_handle_events = can;
    }

    /// Prevent dispatch to `id` and all of its descendants, even when
    /// geometrically hit.
    pub fn set_block_events(&mut self, id: NodeId, block: bool) {
        self.states[id].block_events = block;
    }

    // =========================================================================
    // Coordinate mapping
    // =========================================================================

    /// Map a point in root coordinates into `id`'s local coordinates by
    /// inverting the full ancestor transform chain: per node, translate by
    /// position plus anchor, rotate by `-rotation`, divide by the effective
    /// scale, then re-add the anchor. O(depth).
    pub fn localize(&self, id: NodeId, global: Point) -> Point {
        let mut chain: smallvec::SmallVec<[NodeId; 16]> = smallvec::SmallVec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        let mut point = global;
        for node in chain.iter().rev() {
            point = self.localize_step(*node, point);
        }
        point
    }

    /// One inversion step: parent coordinates to this node's coordinates.
    fn localize_step(&self, id: NodeId, point: Point) -> Point {
        let style = &self.states[id].style;
        let (ax, ay) = style.anchor();
        let mut x = point.x - style.x - ax;
        let mut y = point.y - style.y - ay;
        if style.rotation != 0.0 {
            let (sin, cos) = (-style.rotation).sin_cos();
            (x, y) = (x * cos - y * sin, x * sin + y * cos);
        }
        x /= style.effective_scale_x();
        y /= style.effective_scale_y();
        Point::new(x + ax, y + ay)
    }

    /// Absolute origin, size and accumulated uniform scale of `id`,
    /// composed over the ancestor chain.
    pub fn absolute_position(&self, id: NodeId) -> AbsolutePosition {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut scale = 1.0;
        let mut current = Some(id);
        while let Some(node) = current {
            let style = &self.states[node].style;
            x = style.x + style.scale * x;
            y = style.y + style.scale * y;
            scale *= style.scale;
            current = self.parent(node);
        }
        let style = &self.states[id].style;
        AbsolutePosition {
            x,
            y,
            width: style.width * scale,
            height: style.height * scale,
            scale,
        }
    }

    /// Whether a root-coordinate point falls inside `id`'s own bounds.
    pub fn contains_point(&self, id: NodeId, global: Point) -> bool {
        let local = self.localize(id, global);
        let style = &self.states[id].style;
        local.x >= 0.0 && local.x <= style.width && local.y >= 0.0 && local.y <= style.height
    }

    // =========================================================================
    // Publish / subscribe
    // =========================================================================

    /// Register a bubble-phase handler for one event category.
    pub fn subscribe(&mut self, id: NodeId, listener: EventListener, handler: Box<EventCallback>) {
        self.states[id]
            .listeners
            .entry(listener)
            .or_default()
            .push(Rc::new(RefCell::new(handler)));
    }

    /// Register a capture-phase handler, invoked root to target before
    /// bubbling begins.
    pub fn subscribe_capture(
        &mut self,
        id: NodeId,
        listener: EventListener,
        handler: Box<EventCallback>,
    ) {
        self.states[id]
            .capture_listeners
            .entry(listener)
            .or_default()
            .push(Rc::new(RefCell::new(handler)));
    }

    /// Invoke `id`'s own bubble handlers for the event's category, in
    /// registration order, stopping at the first handler that returns
    /// [`EventPropagation::Stop`].
    pub fn publish(&self, id: NodeId, event: &InputEvent) -> EventPropagation {
        self.run_handlers(id, event, false)
    }

    pub(crate) fn run_handlers(
        &self,
        id: NodeId,
        event: &InputEvent,
        capture: bool,
    ) -> EventPropagation {
        let Some(state) = self.states.get(id) else {
            return EventPropagation::Continue;
        };
        let table = if capture {
            &state.capture_listeners
        } else {
            &state.listeners
        };
        let Some(handlers) = table.get(&event.kind.listener()) else {
            return EventPropagation::Continue;
        };
        // Clone the Rc list so handlers may subscribe/unsubscribe reentrantly.
        let handlers: Vec<_> = handlers.to_vec();
        for handler in handlers {
            if (handler.borrow_mut())(self, event).is_stop() {
                return EventPropagation::Stop;
            }
        }
        EventPropagation::Continue
    }

    // =========================================================================
    // Dragging and pooling
    // =========================================================================

    /// Arm drag sessions for pointers that go down on `id` (or a descendant
    /// that does not handle the drag itself).
    pub fn start_drag(&mut self, id: NodeId, options: DragOptions) {
        self.states[id].draggable = Some(options);
    }

    /// Stop arming new drag sessions on `id`. In-flight sessions finish
    /// normally.
    pub fn stop_drag(&mut self, id: NodeId) {
        self.states[id].draggable = None;
    }

    /// Reset a recycled node to default style, flags and handlers, detached
    /// from the tree. Pool obtain hooks call this before reuse.
    pub fn reset_node(&mut self, id: NodeId) {
        self.detach(id);
        let children = std::mem::take(&mut self.children[id]);
        for child in children {
            self.parent[child] = None;
        }
        self.states[id] = NodeState::default();
    }

    /// Mirror pool bookkeeping into the node's state after an obtain.
    pub fn note_pool_obtain(&mut self, id: NodeId, meta: PoolMeta) {
        self.states[id].note_pool_obtain(meta);
    }

    /// Clear the pool mirror after a release.
    pub fn note_pool_release(&mut self, id: NodeId) {
        self.states[id].note_pool_release();
    }
}

/// A scene node managed by a [`crate::pool::Pool`]. The node itself lives in
/// the scene arena; the pool recycles this lightweight handle and the obtain
/// hook resets the node's state.
pub struct PooledNode {
    pub id: NodeId,
    meta: PoolMeta,
}

impl PooledNode {
    /// Create a detached node for the pool's factory.
    pub fn create(scene: &Rc<RefCell<Scene>>) -> Self {
        let id = scene.borrow_mut().create_node();
        Self {
            id,
            meta: PoolMeta::default(),
        }
    }
}

impl Pooled for PooledNode {
    fn pool_meta(&self) -> &PoolMeta {
        &self.meta
    }
    fn pool_meta_mut(&mut self) -> &mut PoolMeta {
        &mut self.meta
    }
}
