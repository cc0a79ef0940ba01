//! Per-pointer gesture sessions layered on top of event dispatch.
//!
//! Each pointer that goes down on a draggable node arms a session:
//! `Idle → Pending → Dragging → terminal`. Pending sessions activate once
//! movement exceeds the configured radius, emitting exactly one `DragStart`
//! followed by recurring `Drag`s; release emits exactly one `DragStop` (with
//! an optional swipe classification), while a sub-radius release emits only
//! `Select`. When exactly two sessions are dragging, the recognizer derives
//! pinch and rotate factors against a baseline recorded on the first frame
//! both are active.

use std::time::Duration;

use peniko::kurbo::{Point, Vec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::event::{PointerId, SwipeDirection};
use crate::scene::NodeId;

/// How a dragged node is clamped against its parent's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragBound {
    /// No clamping.
    #[default]
    Free,
    /// The node stays fully inside the parent:
    /// `0 <= x <= parent_w - node_w` (same for y).
    Bounded,
    /// The (larger) node never exposes the parent's edges:
    /// `parent_w - node_w <= x <= 0` (same for y).
    Cover,
}

impl DragBound {
    /// Clamp one axis. A single deterministic max-then-min: the lower edge
    /// wins over the upper edge when the ranges are degenerate.
    pub fn clamp_axis(self, value: f64, node_extent: f64, parent_extent: f64) -> f64 {
        match self {
            DragBound::Free => value,
            DragBound::Bounded => value.max(0.0).min(parent_extent - node_extent),
            DragBound::Cover => value.max(parent_extent - node_extent).min(0.0),
        }
    }
}

/// Options passed to [`crate::scene::Scene::start_drag`].
#[derive(Debug, Clone, Copy)]
pub struct DragOptions {
    /// Movement magnitude required before a pending session activates.
    pub radius: f64,
    pub bound: DragBound,
}

impl DragOptions {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            bound: DragBound::Free,
        }
    }

    pub fn bounded(mut self, bound: DragBound) -> Self {
        self.bound = bound;
        self
    }
}

/// Thresholds shared by every session.
#[derive(Debug, Clone, Copy)]
pub struct GestureConfig {
    /// Minimum displacement magnitude for a release to classify as a swipe.
    pub swipe_min_distance: f64,
    /// Maximum gesture duration for a release to classify as a swipe.
    pub swipe_max_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_min_distance: 60.0,
            swipe_max_duration: Duration::from_millis(300),
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.swipe_min_distance <= 0.0 {
            return Err(Error::Configuration(
                "swipe_min_distance must be positive".into(),
            ));
        }
        if self.swipe_max_duration.is_zero() {
            return Err(Error::Configuration(
                "swipe_max_duration must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum SessionState {
    /// Armed but not yet past the activation radius.
    Pending,
    /// Actively dragging; holds the node's position at activation.
    Dragging { node_start: (f64, f64) },
}

/// Transient per-pointer state for a potential or active drag.
#[derive(Debug, Clone, Copy)]
struct GestureSession {
    node: NodeId,
    target: NodeId,
    radius: f64,
    bound: DragBound,
    start: Point,
    start_time: Duration,
    last: Point,
    state: SessionState,
}

/// What the recognizer asks the dispatcher to do in response to a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEmission {
    DragStart {
        node: NodeId,
    },
    Drag {
        node: NodeId,
        delta: Vec2,
        /// Clamp-ready position: node-start plus delta, before bounding.
        position: (f64, f64),
        bound: DragBound,
    },
    DragStop {
        node: NodeId,
    },
    /// Released before the radius was exceeded.
    Select {
        target: NodeId,
    },
    Pinch {
        scale: f64,
    },
    Rotate {
        angle: f64,
    },
    Swipe {
        node: NodeId,
        direction: SwipeDirection,
    },
}

struct TwoPointerBaseline {
    distance: f64,
    angle: f64,
}

pub struct GestureRecognizer {
    config: GestureConfig,
    sessions: FxHashMap<PointerId, GestureSession>,
    baseline: Option<TwoPointerBaseline>,
}

pub type Emissions = SmallVec<[GestureEmission; 4]>;

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: FxHashMap::default(),
            baseline: None,
        })
    }

    /// Arm a session for `pointer` on a draggable `node`. `target` is the
    /// original hit target; it receives the `Select` on a sub-radius release.
    pub fn begin(
        &mut self,
        pointer: PointerId,
        node: NodeId,
        target: NodeId,
        options: DragOptions,
        point: Point,
        timestamp: Duration,
    ) {
        self.sessions.insert(
            pointer,
            GestureSession {
                node,
                target,
                radius: options.radius,
                bound: options.bound,
                start: point,
                start_time: timestamp,
                last: point,
                state: SessionState::Pending,
            },
        );
    }

    /// Advance the session for a move sample. `node_position` is the dragged
    /// node's current style position, sampled by the dispatcher so the
    /// recognizer itself never touches the scene.
    pub fn update(
        &mut self,
        pointer: PointerId,
        point: Point,
        node_position: impl FnOnce(NodeId) -> (f64, f64),
    ) -> Emissions {
        let mut out = Emissions::new();
        let Some(session) = self.sessions.get_mut(&pointer) else {
            return out;
        };
        session.last = point;
        let delta = point - session.start;

        match session.state {
            SessionState::Pending => {
                if delta.hypot() > session.radius {
                    let node_start = node_position(session.node);
                    session.state = SessionState::Dragging { node_start };
                    out.push(GestureEmission::DragStart { node: session.node });
                    out.push(Self::drag_emission(session, node_start, delta));
                }
            }
            SessionState::Dragging { node_start } => {
                out.push(Self::drag_emission(session, node_start, delta));
            }
        }

        self.derive_compound(&mut out);
        out
    }

    /// Terminate the session on release or cancellation.
    pub fn finish(&mut self, pointer: PointerId, point: Point, timestamp: Duration) -> Emissions {
        self.end_session(pointer, point, timestamp, false)
    }

    pub fn cancel(&mut self, pointer: PointerId, point: Point, timestamp: Duration) -> Emissions {
        self.end_session(pointer, point, timestamp, true)
    }

    fn end_session(
        &mut self,
        pointer: PointerId,
        point: Point,
        timestamp: Duration,
        cancelled: bool,
    ) -> Emissions {
        let mut out = Emissions::new();
        let Some(session) = self.sessions.remove(&pointer) else {
            return out;
        };

        match session.state {
            SessionState::Pending => {
                // A pending pointer was never a compound partner; an
                // in-flight pinch keeps its baseline.
                if !cancelled {
                    out.push(GestureEmission::Select {
                        target: session.target,
                    });
                }
            }
            SessionState::Dragging { .. } => {
                // A compound partner ended; the next two-pointer frame
                // records a fresh baseline.
                self.baseline = None;
                out.push(GestureEmission::DragStop { node: session.node });
                if !cancelled
                    && let Some(direction) = self.classify_swipe(&session, point, timestamp)
                {
                    out.push(GestureEmission::Swipe {
                        node: session.node,
                        direction,
                    });
                }
            }
        }
        out
    }

    pub fn has_session(&self, pointer: PointerId) -> bool {
        self.sessions.contains_key(&pointer)
    }

    fn drag_emission(
        session: &GestureSession,
        node_start: (f64, f64),
        delta: Vec2,
    ) -> GestureEmission {
        GestureEmission::Drag {
            node: session.node,
            delta,
            position: (node_start.0 + delta.x, node_start.1 + delta.y),
            bound: session.bound,
        }
    }

    /// With exactly two dragging sessions, record the baseline on the first
    /// frame both are active and emit pinch/rotate factors afterwards.
    fn derive_compound(&mut self, out: &mut Emissions) {
        let mut points: SmallVec<[Point; 2]> = SmallVec::new();
        for session in self.sessions.values() {
            if matches!(session.state, SessionState::Dragging { .. }) {
                points.push(session.last);
            }
        }
        if points.len() != 2 {
            self.baseline = None;
            return;
        }
        let span = points[1] - points[0];
        let distance = span.hypot();
        let angle = span.y.atan2(span.x);
        match &self.baseline {
            None => {
                self.baseline = Some(TwoPointerBaseline { distance, angle });
            }
            Some(baseline) => {
                if baseline.distance > 0.0 {
                    out.push(GestureEmission::Pinch {
                        scale: distance / baseline.distance,
                    });
                }
                out.push(GestureEmission::Rotate {
                    angle: angle - baseline.angle,
                });
            }
        }
    }

    /// Classify the gesture's total displacement at release: the magnitude
    /// must exceed the distance threshold and the elapsed time stay under
    /// the duration cap, both strictly. Quadrants use the ±60°/±120°
    /// boundaries, with y growing downwards.
    fn classify_swipe(
        &self,
        session: &GestureSession,
        end: Point,
        timestamp: Duration,
    ) -> Option<SwipeDirection> {
        let delta = end - session.start;
        let elapsed = timestamp.saturating_sub(session.start_time);
        if delta.hypot() <= self.config.swipe_min_distance
            || elapsed >= self.config.swipe_max_duration
        {
            return None;
        }
        let degrees = (-delta.y).atan2(delta.x).to_degrees();
        Some(if degrees.abs() <= 60.0 {
            SwipeDirection::Right
        } else if degrees.abs() >= 120.0 {
            SwipeDirection::Left
        } else if degrees > 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        })
    }
}
