//! A retained scene-graph core.
//!
//! The crate provides the pieces a widget layer and a renderer backend are
//! built on top of:
//!
//! - [`scene`]: a hierarchical node tree with transform/style state, stored
//!   as an arena of [`scene::NodeId`] handles, with coordinate mapping
//!   ([`scene::Scene::localize`]) over the full ancestor chain.
//! - [`event`]: hit testing, capture/bubble dispatch with cooperative
//!   cancellation, and a per-node publish/subscribe contract.
//! - [`gesture`]: a multi-pointer drag/pinch/rotate/swipe state machine
//!   layered on the dispatcher.
//! - [`pool`]: a generic reusable-object allocator with O(1) obtain/release
//!   and a swap-based compaction invariant.
//! - [`scheduler`]: a frame scheduler that degrades across heterogeneous
//!   timing drivers and bounds concurrency to one tick in flight.
//! - [`animate`]: easing functions and chained style transitions consuming
//!   scheduler ticks.
//!
//! Everything runs single-threaded and cooperatively: tree mutation,
//! dispatch, gesture transitions and animation stepping happen synchronously
//! inside the scheduler's tick or in direct response to a raw input sample.
//! Pixel rendering, text shaping and platform input collection are external
//! collaborators; the core only exposes geometry and consumes raw sample
//! batches.

pub mod animate;
pub mod error;
pub mod event;
pub mod gesture;
pub mod pool;
pub mod scene;
pub mod scheduler;
pub mod style;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::animate::{Easing, EasingFn, EasingMode, Sequence, StyleTarget};
    pub use crate::event::dispatch::Dispatcher;
    pub use crate::event::{
        EventKind, EventListener, EventPropagation, InputEvent, PointerId, PointerPhase,
        RawSample, SwipeDirection,
    };
    pub use crate::gesture::{DragBound, DragOptions, GestureConfig};
    pub use crate::pool::{Pool, PoolAction, Pooled};
    pub use crate::scene::{AbsolutePosition, ChangeFlags, NodeId, PooledNode, Scene};
    pub use crate::scheduler::{FrameDriver, FrameScheduler, TestDriver};
    pub use crate::style::Style;
}
