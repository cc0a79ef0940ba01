//! Hit testing and two-phase path dispatch.
//!
//! Dispatch is split into three steps:
//! 1. **Hit testing**: find the deepest node under the point, honoring
//!    visibility, clip bounds, `block_events` and reverse z-order.
//! 2. **Path building**: walk from the hit target to the root, producing the
//!    propagation trace.
//! 3. **Dispatch**: capture handlers root→target, then bubble handlers
//!    target→root, stopping as soon as the event is cancelled.

use peniko::kurbo::Point;
use smallvec::SmallVec;

use super::InputEvent;
use crate::scene::{NodeId, Scene};

/// Find the deepest descendant of `root` under `point` that can handle
/// events. Siblings are checked topmost-first (reverse z-order); a node with
/// `block_events` excludes its whole subtree; an invisible node or a clip
/// miss prunes the subtree.
pub fn hit_test(scene: &Scene, root: NodeId, point: Point) -> Option<NodeId> {
    if !scene.contains(root) {
        return None;
    }
    hit_test_node(scene, root, point)
}

fn hit_test_node(scene: &Scene, id: NodeId, point: Point) -> Option<NodeId> {
    let state = scene.state(id);
    if !state.style().visible || state.block_events() {
        return None;
    }

    let inside = scene.contains_point(id, point);
    if state.style().clip && !inside {
        // Clip bounds prune everything beneath this node.
        return None;
    }

    // Topmost sibling first: children are stored back-to-front.
    for child in scene.children(id).iter().rev() {
        if let Some(target) = hit_test_node(scene, *child, point) {
            return Some(target);
        }
    }

    if state.can_handle_events() && inside {
        return Some(id);
    }
    None
}

/// Build the propagation trace from `target` up to its root, inclusive.
/// The trace length always equals the target's depth from the root.
pub fn build_trace(scene: &Scene, target: NodeId) -> SmallVec<[NodeId; 16]> {
    let mut trace = SmallVec::new();
    let mut current = Some(target);
    while let Some(node) = current {
        trace.push(node);
        current = scene.parent(node);
    }
    trace
}

/// Run the capture phase (root→target) then the bubble phase (target→root)
/// over the event's trace. A handler returning
/// [`crate::event::EventPropagation::Stop`] cancels the event; either way,
/// cancellation only suppresses handlers not yet invoked in this pass.
pub fn dispatch_through_path(scene: &Scene, event: &InputEvent) {
    for node in event.trace().iter().rev() {
        if event.is_cancelled() {
            return;
        }
        if scene.run_handlers(*node, event, true).is_stop() {
            event.cancel();
            return;
        }
    }
    for node in event.trace() {
        if event.is_cancelled() {
            return;
        }
        if scene.run_handlers(*node, event, false).is_stop() {
            event.cancel();
            return;
        }
    }
}
