//! Style animation: easing functions and chained transition sequences.

mod easing;
mod sequence;

pub use easing::{Easing, EasingFn, EasingMode, ease};
pub use sequence::{Sequence, SequenceStatus, StyleTarget};
