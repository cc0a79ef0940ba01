//! Input event types and the per-dispatch event value.
//!
//! A raw platform sample is resolved to an [`InputEvent`] carrying the
//! propagation trace from the hit target up to the dispatch root. Handlers
//! receive the scene and the event during the capture and bubble phases and
//! control further propagation either by returning
//! [`EventPropagation::Stop`] or by calling [`InputEvent::cancel`].

use std::cell::{Cell, RefCell};
use std::time::Duration;

use peniko::kurbo::{Point, Vec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scene::{NodeId, Scene};

pub mod dispatch;
pub mod path;

/// Control whether an event will continue propagating or whether it should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPropagation {
    /// Stop event propagation and mark the event as processed.
    Stop,
    /// Let event propagation continue.
    Continue,
}

impl EventPropagation {
    pub fn is_continue(&self) -> bool {
        matches!(self, EventPropagation::Continue)
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, EventPropagation::Stop)
    }
}

/// Logical event categories a node can subscribe to.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub enum EventListener {
    /// Receives [`EventKind::Start`]
    InputStart,
    /// Receives [`EventKind::Move`]
    InputMove,
    /// Receives [`EventKind::End`]
    InputEnd,
    /// Receives [`EventKind::Cancel`]
    InputCancel,
    /// Receives [`EventKind::Select`]: a release before the drag radius was
    /// exceeded.
    InputSelect,
    /// Receives [`EventKind::Out`]: the pointer's hit target moved off this
    /// node.
    InputOut,
    /// Receives [`EventKind::DragStart`]
    DragStart,
    /// Receives [`EventKind::Drag`]
    Drag,
    /// Receives [`EventKind::DragStop`]
    DragStop,
    /// Receives [`EventKind::Pinch`]
    Pinch,
    /// Receives [`EventKind::Rotate`]
    Rotate,
    /// Receives [`EventKind::Swipe`]
    Swipe,
}

/// Direction a swipe was classified into at release time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// The event payload, tagged by category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Start,
    Move,
    End,
    Cancel,
    /// Synthesized on release when no drag was activated.
    Select,
    /// Synthesized when a pointer's hit target changes on a move.
    Out,
    DragStart,
    Drag {
        /// Offset from the gesture's start point.
        delta: Vec2,
    },
    DragStop,
    Pinch {
        /// Current inter-pointer distance over the baseline distance.
        scale: f64,
    },
    Rotate {
        /// Current inter-pointer angle minus the baseline angle, radians.
        angle: f64,
    },
    Swipe {
        direction: SwipeDirection,
    },
}

impl EventKind {
    /// The listener category this event is delivered to.
    pub fn listener(&self) -> EventListener {
        match self {
            EventKind::Start => EventListener::InputStart,
            EventKind::Move => EventListener::InputMove,
            EventKind::End => EventListener::InputEnd,
            EventKind::Cancel => EventListener::InputCancel,
            EventKind::Select => EventListener::InputSelect,
            EventKind::Out => EventListener::InputOut,
            EventKind::DragStart => EventListener::DragStart,
            EventKind::Drag { .. } => EventListener::Drag,
            EventKind::DragStop => EventListener::DragStop,
            EventKind::Pinch { .. } => EventListener::Pinch,
            EventKind::Rotate { .. } => EventListener::Rotate,
            EventKind::Swipe { .. } => EventListener::Swipe,
        }
    }
}

/// Identity of a pointer across its down/move/up lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

/// Phase of a raw platform input sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One raw sample from the platform input layer, delivered in per-tick
/// batches. The core never polls hardware directly.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    /// Time since an arbitrary epoch chosen by the platform layer.
    pub timestamp: Duration,
}

impl RawSample {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Handler invoked during capture or bubble, with read access to the scene
/// so it can resolve localized coordinates via [`InputEvent::local_point`].
/// Returning [`EventPropagation::Stop`] cancels the remainder of the current
/// pass.
pub type EventCallback = dyn FnMut(&Scene, &InputEvent) -> EventPropagation;

/// An event resolved against the scene tree, consumed within a single
/// synchronous dispatch pass.
pub struct InputEvent {
    pub pointer_id: PointerId,
    pub kind: EventKind,
    /// The raw source point in root coordinates.
    pub raw: Point,
    pub timestamp: Duration,
    pub target: NodeId,
    pub root: NodeId,
    trace: SmallVec<[NodeId; 16]>,
    /// Per-node localized coordinates, filled lazily on first access.
    local_points: RefCell<FxHashMap<NodeId, Point>>,
    cancelled: Cell<bool>,
}

impl InputEvent {
    /// Build an event for direct publishing via
    /// [`crate::scene::Scene::publish`]. Events routed through a
    /// [`dispatch::Dispatcher`] carry a propagation trace; hand-built ones
    /// start with none.
    pub fn new(
        pointer_id: PointerId,
        kind: EventKind,
        raw: Point,
        timestamp: Duration,
        target: NodeId,
        root: NodeId,
    ) -> Self {
        Self::with_trace(
            pointer_id,
            kind,
            raw,
            timestamp,
            target,
            root,
            SmallVec::new(),
        )
    }

    pub(crate) fn with_trace(
        pointer_id: PointerId,
        kind: EventKind,
        raw: Point,
        timestamp: Duration,
        target: NodeId,
        root: NodeId,
        trace: SmallVec<[NodeId; 16]>,
    ) -> Self {
        Self {
            pointer_id,
            kind,
            raw,
            timestamp,
            target,
            root,
            trace,
            local_points: RefCell::new(FxHashMap::default()),
            cancelled: Cell::new(false),
        }
    }

    /// The propagation trace, ordered target to root inclusive.
    pub fn trace(&self) -> &[NodeId] {
        &self.trace
    }

    /// Suppress handlers not yet invoked in the current dispatch pass.
    /// Side effects of handlers that already ran are never rolled back, and
    /// subsequent, unrelated dispatch passes are unaffected.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// The raw point mapped into `node`'s local coordinates. Memoized per
    /// node so repeated access across the trace does not recompute the
    /// ancestor-chain inversion.
    pub fn local_point(&self, scene: &Scene, node: NodeId) -> Point {
        if let Some(point) = self.local_points.borrow().get(&node) {
            return *point;
        }
        let point = scene.localize(node, self.raw);
        self.local_points.borrow_mut().insert(node, point);
        point
    }

    /// A fresh event with the same identity and raw coordinates but no trace
    /// or memoized points; both are recomputed when the clone goes through
    /// [`dispatch::Dispatcher::redispatch`].
    pub fn clone_for_redispatch(&self) -> InputEvent {
        InputEvent::new(
            self.pointer_id,
            self.kind,
            self.raw,
            self.timestamp,
            self.target,
            self.root,
        )
    }
}
