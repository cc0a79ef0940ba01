//! Animation sequences stepped by scheduler ticks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use thicket::animate::{Easing, EasingFn, EasingMode, Sequence, SequenceStatus, StyleTarget};
use thicket::scene::{NodeId, Scene};
use thicket::scheduler::{FrameScheduler, TestDriver};

fn node_at(scene: &mut Scene, x: f64, y: f64) -> NodeId {
    let node = scene.create_node();
    scene.set_position(node, x, y);
    node
}

#[test]
fn linear_step_interpolates_from_the_starting_style() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 10.0, 0.0);

    let mut seq = Sequence::new(node).then(
        StyleTarget::new().x(110.0),
        Duration::from_millis(100),
        Easing::default(),
    );
    assert_eq!(
        seq.advance(&mut scene, Duration::from_millis(25)),
        SequenceStatus::Running
    );
    assert!((scene.style(node).x - 35.0).abs() < 1e-9);
    assert_eq!(
        seq.advance(&mut scene, Duration::from_millis(75)),
        SequenceStatus::Finished
    );
    assert!((scene.style(node).x - 110.0).abs() < 1e-9);
    assert!(seq.is_finished());
}

#[test]
fn easing_shapes_the_progress_curve() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 0.0, 0.0);

    let mut seq = Sequence::new(node).then(
        StyleTarget::new().x(100.0),
        Duration::from_millis(100),
        Easing::new(EasingMode::In, EasingFn::Quadratic),
    );
    seq.advance(&mut scene, Duration::from_millis(50));
    // Quadratic-in at t=0.5 is 0.25 of the way.
    assert!((scene.style(node).x - 25.0).abs() < 1e-9);
}

#[test]
fn untargeted_properties_are_left_alone() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 5.0, 7.0);
    scene.update_style(node, |s| s.opacity = 0.5);

    let mut seq = Sequence::new(node).then(
        StyleTarget::new().opacity(1.0),
        Duration::from_millis(100),
        Easing::default(),
    );
    seq.advance(&mut scene, Duration::from_millis(50));
    let style = scene.style(node);
    assert!((style.opacity - 0.75).abs() < 1e-9);
    assert_eq!((style.x, style.y), (5.0, 7.0));
}

#[test]
fn steps_run_in_order_with_waits_between() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 0.0, 0.0);

    let mut seq = Sequence::new(node)
        .then(
            StyleTarget::new().x(10.0),
            Duration::from_millis(100),
            Easing::default(),
        )
        .wait(Duration::from_millis(100))
        .then(
            StyleTarget::new().x(30.0),
            Duration::from_millis(100),
            Easing::default(),
        );

    seq.advance(&mut scene, Duration::from_millis(100));
    assert!((scene.style(node).x - 10.0).abs() < 1e-9);

    // Inside the wait: nothing changes.
    seq.advance(&mut scene, Duration::from_millis(50));
    assert!((scene.style(node).x - 10.0).abs() < 1e-9);

    // 50ms of wait left, then halfway into the final step.
    seq.advance(&mut scene, Duration::from_millis(100));
    assert!((scene.style(node).x - 20.0).abs() < 1e-9);

    assert_eq!(
        seq.advance(&mut scene, Duration::from_millis(50)),
        SequenceStatus::Finished
    );
    assert!((scene.style(node).x - 30.0).abs() < 1e-9);
}

#[test]
fn second_step_starts_from_where_the_first_ended() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 0.0, 0.0);

    let mut seq = Sequence::new(node)
        .then(
            StyleTarget::new().x(100.0),
            Duration::from_millis(100),
            Easing::default(),
        )
        .then(
            StyleTarget::new().x(0.0),
            Duration::from_millis(100),
            Easing::default(),
        );
    seq.advance(&mut scene, Duration::from_millis(100));
    seq.advance(&mut scene, Duration::from_millis(50));
    // Halfway back down from 100.
    assert!((scene.style(node).x - 50.0).abs() < 1e-9);
}

#[test]
fn completion_callback_fires_exactly_once() {
    let mut scene = Scene::new();
    let node = node_at(&mut scene, 0.0, 0.0);
    let completed = Rc::new(Cell::new(0u32));

    let count = completed.clone();
    let mut seq = Sequence::new(node)
        .then(
            StyleTarget::new().x(10.0),
            Duration::from_millis(50),
            Easing::default(),
        )
        .on_complete(move || count.set(count.get() + 1));

    seq.advance(&mut scene, Duration::from_millis(30));
    assert_eq!(completed.get(), 0);
    seq.advance(&mut scene, Duration::from_millis(30));
    assert_eq!(completed.get(), 1);
    // Further advances stay finished and never re-fire.
    assert_eq!(
        seq.advance(&mut scene, Duration::from_millis(30)),
        SequenceStatus::Finished
    );
    assert_eq!(completed.get(), 1);
}

#[test]
fn sequences_consume_scheduler_ticks() {
    let scene = Rc::new(RefCell::new(Scene::new()));
    let node = node_at(&mut scene.borrow_mut(), 0.0, 0.0);

    let seq = Rc::new(RefCell::new(Sequence::new(node).then(
        StyleTarget::new().x(64.0).opacity(0.0),
        Duration::from_millis(64),
        Easing::default(),
    )));

    let driver = Rc::new(RefCell::new(TestDriver::new()));
    let mut scheduler = FrameScheduler::new(vec![Box::new(driver.clone())]);
    let ticking_scene = scene.clone();
    let ticking_seq = seq.clone();
    scheduler
        .start(move |dt| {
            ticking_seq.borrow_mut().advance(&mut ticking_scene.borrow_mut(), dt);
        })
        .unwrap();

    for _ in 0..4 {
        driver.borrow_mut().fire_after(Duration::from_millis(16));
        assert!(scheduler.pump());
    }

    assert!(seq.borrow().is_finished());
    let scene = scene.borrow();
    assert!((scene.style(node).x - 64.0).abs() < 1e-9);
    assert!(scene.style(node).opacity.abs() < 1e-9);
}
