//! The input dispatcher: raw samples in, propagated events and gesture
//! emissions out.
//!
//! Each raw sample runs to completion synchronously: hit test, trace build,
//! capture and bubble phases, hover bookkeeping, then gesture-session
//! transitions. Samples for one pointer are processed strictly in arrival
//! order; sessions for different pointers are independent.

use rustc_hash::FxHashMap;

use super::path::{build_trace, dispatch_through_path, hit_test};
use super::{EventKind, InputEvent, PointerId, PointerPhase, RawSample};
use crate::error::Result;
use crate::gesture::{DragBound, Emissions, GestureConfig, GestureEmission, GestureRecognizer};
use crate::scene::{NodeId, Scene};

pub struct Dispatcher {
    root: NodeId,
    gestures: GestureRecognizer,
    /// Last hit target per pointer, for `Out` bookkeeping on moves.
    hovered: FxHashMap<PointerId, NodeId>,
}

impl Dispatcher {
    pub fn new(root: NodeId, config: GestureConfig) -> Result<Self> {
        Ok(Self {
            root,
            gestures: GestureRecognizer::new(config)?,
            hovered: FxHashMap::default(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Process one tick's batch of raw samples, in order.
    pub fn process_batch(&mut self, scene: &mut Scene, samples: &[RawSample]) {
        for sample in samples {
            self.process(scene, *sample);
        }
    }

    /// Process a single raw sample. Returns the resolved hit target, if any.
    pub fn process(&mut self, scene: &mut Scene, sample: RawSample) -> Option<NodeId> {
        let point = sample.point();
        let target = hit_test(scene, self.root, point);

        if sample.phase == PointerPhase::Move {
            self.update_hover(scene, &sample, target);
        }

        match target {
            Some(target) => {
                let kind = match sample.phase {
                    PointerPhase::Start => EventKind::Start,
                    PointerPhase::Move => EventKind::Move,
                    PointerPhase::End => EventKind::End,
                    PointerPhase::Cancel => EventKind::Cancel,
                };
                let event = InputEvent::with_trace(
                    sample.id,
                    kind,
                    point,
                    sample.timestamp,
                    target,
                    self.root,
                    build_trace(scene, target),
                );
                dispatch_through_path(scene, &event);
            }
            None => {
                // Fully blocked or empty tree under the point: a no-op
                // dispatch, not an error.
                log::debug!("no dispatch target at ({}, {})", point.x, point.y);
            }
        }

        match sample.phase {
            PointerPhase::Start => {
                if let Some(target) = target {
                    self.arm_session(scene, &sample, target);
                }
            }
            PointerPhase::Move => {
                let emissions = self
                    .gestures
                    .update(sample.id, point, |node| node_position(scene, node));
                self.apply_emissions(scene, &sample, emissions);
            }
            PointerPhase::End => {
                self.hovered.remove(&sample.id);
                let emissions = self.gestures.finish(sample.id, point, sample.timestamp);
                self.apply_emissions(scene, &sample, emissions);
            }
            PointerPhase::Cancel => {
                self.hovered.remove(&sample.id);
                let emissions = self.gestures.cancel(sample.id, point, sample.timestamp);
                self.apply_emissions(scene, &sample, emissions);
            }
        }

        target
    }

    /// Arm a gesture session on the first draggable node along the trace.
    fn arm_session(&mut self, scene: &Scene, sample: &RawSample, target: NodeId) {
        let mut current = Some(target);
        while let Some(node) = current {
            if let Some(options) = scene.state(node).draggable().copied() {
                self.gestures.begin(
                    sample.id,
                    node,
                    target,
                    options,
                    sample.point(),
                    sample.timestamp,
                );
                return;
            }
            current = scene.parent(node);
        }
    }

    fn apply_emissions(&mut self, scene: &mut Scene, sample: &RawSample, emissions: Emissions) {
        for emission in emissions {
            match emission {
                GestureEmission::DragStart { node } => {
                    self.publish(scene, sample, node, EventKind::DragStart);
                }
                GestureEmission::Drag {
                    node,
                    delta,
                    position,
                    bound,
                } => {
                    let (x, y) = clamp_to_parent(scene, node, position, bound);
                    scene.set_position(node, x, y);
                    self.publish(scene, sample, node, EventKind::Drag { delta });
                }
                GestureEmission::DragStop { node } => {
                    self.publish(scene, sample, node, EventKind::DragStop);
                }
                GestureEmission::Select { target } => {
                    // Select bubbles from the original press target.
                    if scene.contains(target) {
                        let event = InputEvent::with_trace(
                            sample.id,
                            EventKind::Select,
                            sample.point(),
                            sample.timestamp,
                            target,
                            self.root,
                            build_trace(scene, target),
                        );
                        dispatch_through_path(scene, &event);
                    }
                }
                GestureEmission::Pinch { scale } => {
                    self.publish(scene, sample, self.root, EventKind::Pinch { scale });
                }
                GestureEmission::Rotate { angle } => {
                    self.publish(scene, sample, self.root, EventKind::Rotate { angle });
                }
                GestureEmission::Swipe { node, direction } => {
                    self.publish(scene, sample, node, EventKind::Swipe { direction });
                }
            }
        }
    }

    /// Deliver an event to a single node's own handlers, no propagation.
    fn publish(&self, scene: &Scene, sample: &RawSample, node: NodeId, kind: EventKind) {
        if !scene.contains(node) {
            return;
        }
        let event = InputEvent::new(
            sample.id,
            kind,
            sample.point(),
            sample.timestamp,
            node,
            self.root,
        );
        scene.publish(node, &event);
    }

    /// Run a full capture/bubble pass for a cloned event against the current
    /// tree. The trace is recomputed from the event's target, so handlers
    /// observe any re-parenting since the original pass. A dead target is a
    /// no-op.
    pub fn redispatch(&self, scene: &Scene, event: &InputEvent) {
        if !scene.contains(event.target) {
            return;
        }
        let mut fresh = event.clone_for_redispatch();
        fresh.trace = build_trace(scene, fresh.target);
        dispatch_through_path(scene, &fresh);
    }

    /// Publish `Out` to the previous hit target when a move resolves to a
    /// different node.
    fn update_hover(&mut self, scene: &Scene, sample: &RawSample, target: Option<NodeId>) {
        let previous = self.hovered.get(&sample.id).copied();
        if previous == target {
            return;
        }
        if let Some(old) = previous {
            self.publish(scene, sample, old, EventKind::Out);
        }
        match target {
            Some(node) => {
                self.hovered.insert(sample.id, node);
            }
            None => {
                self.hovered.remove(&sample.id);
            }
        }
    }
}

fn node_position(scene: &Scene, node: NodeId) -> (f64, f64) {
    let style = scene.style(node);
    (style.x, style.y)
}

/// Apply the session's bounding policy against the node's parent extents.
fn clamp_to_parent(
    scene: &Scene,
    node: NodeId,
    position: (f64, f64),
    bound: DragBound,
) -> (f64, f64) {
    if bound == DragBound::Free {
        return position;
    }
    let Some(parent) = scene.parent(node) else {
        return position;
    };
    let node_style = scene.style(node);
    let parent_style = scene.style(parent);
    (
        bound.clamp_axis(position.0, node_style.width, parent_style.width),
        bound.clamp_axis(position.1, node_style.height, parent_style.height),
    )
}
