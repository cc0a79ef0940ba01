//! Per-node state kept alongside the tree structure.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::event::{EventCallback, EventListener};
use crate::gesture::DragOptions;
use crate::pool::PoolMeta;
use crate::style::Style;

bitflags! {
    /// Dirty flags consumed by the external layout/render passes.
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        const REFLOW = 1;
        const REPAINT = 1 << 1;
    }
}

/// Absolute geometry of a node, accumulated over its ancestor chain.
/// Rotation is not folded in; consumers needing rotated bounds compose the
/// chain themselves via [`crate::scene::Scene::localize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsolutePosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

pub(crate) type ListenerTable = IndexMap<EventListener, Vec<Rc<RefCell<EventCallback>>>>;

pub struct NodeState {
    pub(crate) style: Style,
    pub(crate) changes: ChangeFlags,
    /// Whether the node itself can be a hit-test target.
    pub(crate) can_handle_events: bool,
    /// Excludes the node and all descendants from dispatch when set.
    pub(crate) block_events: bool,
    pub(crate) draggable: Option<DragOptions>,
    /// Bubble-phase handlers, keyed by category, in registration order.
    pub(crate) listeners: ListenerTable,
    /// Capture-phase handlers (root to target); rarely used.
    pub(crate) capture_listeners: ListenerTable,
    /// Mirror of the pool slot this node was obtained from, if any.
    pub(crate) pool_index: usize,
    pub(crate) obtained_from_pool: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            style: Style::default(),
            changes: ChangeFlags::empty(),
            can_handle_events: true,
            block_events: false,
            draggable: None,
            listeners: IndexMap::new(),
            capture_listeners: IndexMap::new(),
            pool_index: 0,
            obtained_from_pool: false,
        }
    }
}

impl NodeState {
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn changes(&self) -> ChangeFlags {
        self.changes
    }

    pub fn can_handle_events(&self) -> bool {
        self.can_handle_events
    }

    pub fn block_events(&self) -> bool {
        self.block_events
    }

    pub fn draggable(&self) -> Option<&DragOptions> {
        self.draggable.as_ref()
    }

    pub fn obtained_from_pool(&self) -> bool {
        self.obtained_from_pool
    }

    pub fn pool_index(&self) -> usize {
        self.pool_index
    }

    pub(crate) fn note_pool_obtain(&mut self, meta: PoolMeta) {
        self.pool_index = meta.index();
        self.obtained_from_pool = true;
    }

    pub(crate) fn note_pool_release(&mut self) {
        self.pool_index = 0;
        self.obtained_from_pool = false;
    }
}
