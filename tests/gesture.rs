//! Gesture lifecycle tests through the dispatcher: activation radius,
//! drag clamping, compound pinch/rotate and swipe classification.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use thicket::event::dispatch::Dispatcher;
use thicket::event::{
    EventKind, EventListener, EventPropagation, PointerId, PointerPhase, RawSample, SwipeDirection,
};
use thicket::gesture::{DragBound, DragOptions, GestureConfig};
use thicket::scene::{NodeId, Scene};

fn sample(pointer: u64, phase: PointerPhase, x: f64, y: f64, ms: u64) -> RawSample {
    RawSample {
        id: PointerId(pointer),
        phase,
        x,
        y,
        timestamp: Duration::from_millis(ms),
    }
}

/// Count deliveries of one listener category on one node.
fn counter(scene: &mut Scene, node: NodeId, listener: EventListener) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0u32));
    let hits = count.clone();
    scene.subscribe(
        node,
        listener,
        Box::new(move |_, _| {
            hits.set(hits.get() + 1);
            EventPropagation::Continue
        }),
    );
    count
}

/// A 500x500 root with a freely draggable 100x100 child at (100, 100).
fn draggable_scene(radius: f64, bound: DragBound) -> (Scene, NodeId, NodeId) {
    let mut scene = Scene::new();
    let root = scene.create_node();
    scene.set_size(root, 500.0, 500.0);
    let node = scene.create_node();
    scene.set_position(node, 100.0, 100.0);
    scene.set_size(node, 100.0, 100.0);
    scene.add_child(root, node, None);
    scene.start_drag(node, DragOptions::new(radius).bounded(bound));
    (scene, root, node)
}

#[test]
fn sub_radius_release_selects_instead_of_dragging() {
    let (mut scene, root, node) = draggable_scene(10.0, DragBound::Free);
    let selects = counter(&mut scene, node, EventListener::InputSelect);
    let drag_starts = counter(&mut scene, node, EventListener::DragStart);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 153.0, 154.0, 50));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 153.0, 154.0, 100));

    assert_eq!(selects.get(), 1);
    assert_eq!(drag_starts.get(), 0);
    let style = scene.style(node);
    assert_eq!((style.x, style.y), (100.0, 100.0), "node never moved");
}

#[test]
fn crossing_the_radius_activates_exactly_one_drag() {
    let (mut scene, root, node) = draggable_scene(10.0, DragBound::Free);
    let starts = counter(&mut scene, node, EventListener::DragStart);
    let drags = counter(&mut scene, node, EventListener::Drag);
    let stops = counter(&mut scene, node, EventListener::DragStop);
    let selects = counter(&mut scene, node, EventListener::InputSelect);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 180.0, 150.0, 20));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 200.0, 170.0, 40));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 200.0, 170.0, 60));

    assert_eq!(starts.get(), 1, "drag start fires once");
    assert_eq!(drags.get(), 2, "one drag per move past the radius");
    assert_eq!(stops.get(), 1);
    assert_eq!(selects.get(), 0, "an activated drag never selects");

    // The node followed the pointer's total delta.
    let style = scene.style(node);
    assert_eq!((style.x, style.y), (150.0, 120.0));
}

#[test]
fn drag_payload_carries_the_delta_from_the_start_point() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Free);
    let deltas: Rc<RefCell<Vec<(f64, f64)>>> = Rc::default();

    let log = deltas.clone();
    scene.subscribe(
        node,
        EventListener::Drag,
        Box::new(move |_, event| {
            if let EventKind::Drag { delta } = event.kind {
                log.borrow_mut().push((delta.x, delta.y));
            }
            EventPropagation::Continue
        }),
    );

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 160.0, 150.0, 20));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 160.0, 180.0, 40));

    assert_eq!(deltas.borrow().as_slice(), &[(10.0, 0.0), (10.0, 30.0)]);
}

#[test]
fn bounded_drag_clamps_inside_the_parent() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Bounded);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    // Way past the parent's right edge.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 900.0, 150.0, 20));
    assert_eq!(scene.style(node).x, 400.0, "500 parent minus 100 node");

    // And past the left edge.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, -900.0, 150.0, 40));
    assert_eq!(scene.style(node).x, 0.0);
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, -900.0, 150.0, 60));
}

#[test]
fn cover_drag_never_exposes_the_parent() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    scene.set_size(root, 200.0, 200.0);
    // Child larger than its parent.
    let node = scene.create_node();
    scene.set_position(node, -50.0, -50.0);
    scene.set_size(node, 300.0, 300.0);
    scene.add_child(root, node, None);
    scene.start_drag(node, DragOptions::new(5.0).bounded(DragBound::Cover));

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 100.0, 100.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 400.0, 100.0, 20));
    assert_eq!(scene.style(node).x, 0.0, "upper edge pinned at zero");
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, -400.0, 100.0, 40));
    assert_eq!(scene.style(node).x, -100.0, "200 parent minus 300 node");
}

#[test]
fn cancellation_stops_the_drag_without_select_or_swipe() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Free);
    let stops = counter(&mut scene, node, EventListener::DragStop);
    let selects = counter(&mut scene, node, EventListener::InputSelect);
    let swipes = counter(&mut scene, node, EventListener::Swipe);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 250.0, 150.0, 50));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Cancel, 250.0, 150.0, 80));

    assert_eq!(stops.get(), 1, "an active drag still stops");
    assert_eq!(selects.get(), 0);
    assert_eq!(swipes.get(), 0, "cancelled gestures never classify");
}

#[test]
fn fast_long_release_classifies_as_a_swipe() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Free);
    let directions: Rc<RefCell<Vec<SwipeDirection>>> = Rc::default();

    let log = directions.clone();
    scene.subscribe(
        node,
        EventListener::Swipe,
        Box::new(move |_, event| {
            if let EventKind::Swipe { direction } = event.kind {
                log.borrow_mut().push(direction);
            }
            EventPropagation::Continue
        }),
    );

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    // 100 units right within 150ms.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 250.0, 150.0, 100));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 250.0, 150.0, 150));
    assert_eq!(directions.borrow().as_slice(), &[SwipeDirection::Right]);

    // 100 units up, pointer starts over the node's new position.
    directions.borrow_mut().clear();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 260.0, 200.0, 1000));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 260.0, 100.0, 1100));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 260.0, 100.0, 1150));
    assert_eq!(directions.borrow().as_slice(), &[SwipeDirection::Up]);
}

#[test]
fn slow_release_is_not_a_swipe() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Free);
    let swipes = counter(&mut scene, node, EventListener::Swipe);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 150.0, 150.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 250.0, 150.0, 200));
    // Release past the 300ms window.
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 250.0, 150.0, 500));
    assert_eq!(swipes.get(), 0);
}

#[test]
fn two_dragging_pointers_derive_pinch_and_rotate() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    scene.set_size(root, 500.0, 500.0);
    scene.start_drag(root, DragOptions::new(5.0));

    let scales: Rc<RefCell<Vec<f64>>> = Rc::default();
    let log = scales.clone();
    scene.subscribe(
        root,
        EventListener::Pinch,
        Box::new(move |_, event| {
            if let EventKind::Pinch { scale } = event.kind {
                log.borrow_mut().push(scale);
            }
            EventPropagation::Continue
        }),
    );
    let angles: Rc<RefCell<Vec<f64>>> = Rc::default();
    let log = angles.clone();
    scene.subscribe(
        root,
        EventListener::Rotate,
        Box::new(move |_, event| {
            if let EventKind::Rotate { angle } = event.kind {
                log.borrow_mut().push(angle);
            }
            EventPropagation::Continue
        }),
    );

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 100.0, 100.0, 0));
    dispatcher.process(&mut scene, sample(2, PointerPhase::Start, 200.0, 100.0, 0));
    // Activate both sessions: baseline span is (90,100)-(210,100) = 120.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 90.0, 100.0, 20));
    dispatcher.process(&mut scene, sample(2, PointerPhase::Move, 210.0, 100.0, 20));
    assert!(
        scales.borrow().is_empty(),
        "the baseline frame emits nothing"
    );

    // Spread to 180: scale 1.5, angle unchanged.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 30.0, 100.0, 40));
    assert_eq!(scales.borrow().len(), 1);
    assert!((scales.borrow()[0] - 1.5).abs() < 1e-9);
    assert!(angles.borrow()[0].abs() < 1e-9);

    // Lifting one pointer drops the baseline; a lone drag derives nothing.
    dispatcher.process(&mut scene, sample(2, PointerPhase::End, 210.0, 100.0, 60));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 20.0, 100.0, 80));
    assert_eq!(scales.borrow().len(), 1);
}

#[test]
fn pending_third_pointer_leaves_the_pinch_baseline_alone() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    scene.set_size(root, 500.0, 500.0);
    scene.start_drag(root, DragOptions::new(5.0));

    let scales: Rc<RefCell<Vec<f64>>> = Rc::default();
    let log = scales.clone();
    scene.subscribe(
        root,
        EventListener::Pinch,
        Box::new(move |_, event| {
            if let EventKind::Pinch { scale } = event.kind {
                log.borrow_mut().push(scale);
            }
            EventPropagation::Continue
        }),
    );

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 100.0, 100.0, 0));
    dispatcher.process(&mut scene, sample(2, PointerPhase::Start, 200.0, 100.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 90.0, 100.0, 20));
    // Baseline frame at span 120, then one pinch at span 180.
    dispatcher.process(&mut scene, sample(2, PointerPhase::Move, 210.0, 100.0, 20));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 30.0, 100.0, 40));
    assert_eq!(scales.borrow().len(), 1);
    assert!((scales.borrow()[0] - 1.5).abs() < 1e-9);

    // A third pointer taps and releases without ever dragging. The pinch in
    // flight must keep its baseline rather than re-record it.
    dispatcher.process(&mut scene, sample(3, PointerPhase::Start, 300.0, 300.0, 50));
    dispatcher.process(&mut scene, sample(3, PointerPhase::End, 300.0, 300.0, 70));

    // Span 240 against the original 120 baseline.
    dispatcher.process(&mut scene, sample(2, PointerPhase::Move, 270.0, 100.0, 80));
    assert_eq!(scales.borrow().len(), 2, "no silent re-baseline frame");
    assert!((scales.borrow()[1] - 2.0).abs() < 1e-9);
}

#[test]
fn drag_arms_on_the_nearest_draggable_ancestor() {
    let (mut scene, root, node) = draggable_scene(5.0, DragBound::Free);
    // A non-draggable child of the draggable node catches the hit.
    let inner = scene.create_node();
    scene.set_position(inner, 20.0, 20.0);
    scene.set_size(inner, 40.0, 40.0);
    scene.add_child(node, inner, None);

    let starts = counter(&mut scene, node, EventListener::DragStart);
    let selects = counter(&mut scene, inner, EventListener::InputSelect);

    let mut dispatcher = Dispatcher::new(root, GestureConfig::default()).unwrap();
    // Press on the inner node, drag past the radius: the draggable ancestor
    // moves.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 140.0, 140.0, 0));
    dispatcher.process(&mut scene, sample(1, PointerPhase::Move, 170.0, 140.0, 20));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 170.0, 140.0, 40));
    assert_eq!(starts.get(), 1);
    assert_eq!(scene.style(node).x, 130.0);

    // A sub-radius tap on the inner node selects the inner node.
    dispatcher.process(&mut scene, sample(1, PointerPhase::Start, 170.0, 140.0, 100));
    dispatcher.process(&mut scene, sample(1, PointerPhase::End, 170.0, 140.0, 120));
    assert_eq!(selects.get(), 1);
}
