//! Chained style transitions driven by scheduler ticks.

use std::time::Duration;

use crate::scene::{NodeId, Scene};
use crate::style::Style;

use super::Easing;

/// The style properties a step can target. Unset properties are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl StyleTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    fn snapshot_from(&self, style: &Style) -> StyleTarget {
        StyleTarget {
            x: self.x.map(|_| style.x),
            y: self.y.map(|_| style.y),
            scale: self.scale.map(|_| style.scale),
            rotation: self.rotation.map(|_| style.rotation),
            opacity: self.opacity.map(|_| style.opacity),
            width: self.width.map(|_| style.width),
            height: self.height.map(|_| style.height),
        }
    }
}

struct Step {
    target: StyleTarget,
    duration: Duration,
    easing: Easing,
}

struct ActiveStep {
    index: usize,
    elapsed: Duration,
    /// Property values at step start; interpolation runs from here to the
    /// step's target.
    from: StyleTarget,
}

/// Whether a sequence still has work to do after an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished,
}

/// A chain of timed style steps applied to one node. Each scheduler tick
/// advances the active step; normalized progress is passed through the
/// step's easing and each targeted property interpolates linearly from its
/// value at step start.
pub struct Sequence {
    node: NodeId,
    steps: Vec<Step>,
    active: Option<ActiveStep>,
    next_index: usize,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Sequence {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            steps: Vec::new(),
            active: None,
            next_index: 0,
            on_complete: None,
        }
    }

    /// Queue a transition towards `target` over `duration`.
    pub fn then(mut self, target: StyleTarget, duration: Duration, easing: Easing) -> Self {
        self.steps.push(Step {
            target,
            duration,
            easing,
        });
        self
    }

    /// Queue a hold with no interpolation.
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(Step {
            target: StyleTarget::default(),
            duration,
            easing: Easing::default(),
        });
        self
    }

    /// Notification fired once, when the last step completes.
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn is_finished(&self) -> bool {
        self.active.is_none() && self.next_index >= self.steps.len()
    }

    /// Advance by one tick's delta. Overshoot past a step boundary carries
    /// into the next step.
    pub fn advance(&mut self, scene: &mut Scene, dt: Duration) -> SequenceStatus {
        let mut remaining = dt;
        loop {
            if self.active.is_none() {
                if self.next_index >= self.steps.len() {
                    if let Some(f) = self.on_complete.take() {
                        f();
                    }
                    return SequenceStatus::Finished;
                }
                let index = self.next_index;
                self.next_index += 1;
                let from = self.steps[index].target.snapshot_from(scene.style(self.node));
                self.active = Some(ActiveStep {
                    index,
                    elapsed: Duration::ZERO,
                    from,
                });
            }

            let Some(active) = self.active.as_mut() else {
                return SequenceStatus::Finished;
            };
            let step = &self.steps[active.index];
            active.elapsed += remaining;

            let t = if step.duration.is_zero() {
                1.0
            } else {
                (active.elapsed.as_secs_f64() / step.duration.as_secs_f64()).min(1.0)
            };
            let eased = step.easing.ease(t);
            apply(scene, self.node, &active.from, &step.target, eased);

            if t < 1.0 {
                return SequenceStatus::Running;
            }

            remaining = active.elapsed.saturating_sub(step.duration);
            self.active = None;
        }
    }
}

fn apply(scene: &mut Scene, node: NodeId, from: &StyleTarget, target: &StyleTarget, t: f64) {
    scene.update_style(node, |style| {
        if let (Some(a), Some(b)) = (from.x, target.x) {
            style.x = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.y, target.y) {
            style.y = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.scale, target.scale) {
            style.scale = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.rotation, target.rotation) {
            style.rotation = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.opacity, target.opacity) {
            style.opacity = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.width, target.width) {
            style.width = lerp(a, b, t);
        }
        if let (Some(a), Some(b)) = (from.height, target.height) {
            style.height = lerp(a, b, t);
        }
    });
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
