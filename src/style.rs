//! The per-node style block.
//!
//! Style is plain data; setters with tree-level side effects (resize hooks,
//! z-order resorts) live on [`crate::scene::Scene`] because they need access
//! to the node's siblings and dirty flags.

use peniko::{Color, Mix};

/// Transform, paint and layout state for a single scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub x: f64,
    pub y: f64,
    /// Uniform scale, multiplied with the per-axis factors below.
    pub scale: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Anchor as a fraction of the node's size. `(0.5, 0.5)` rotates and
    /// scales around the center.
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Rotation in radians around the anchor.
    pub rotation: f64,
    pub opacity: f64,
    pub visible: bool,
    pub z_index: i32,
    pub width: f64,
    pub height: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// When set, descendants outside the node's bounds are pruned from hit
    /// testing and rendering.
    pub clip: bool,
    pub background_color: Option<Color>,
    pub composite_op: Mix,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            z_index: 0,
            width: 0.0,
            height: 0.0,
            flip_x: false,
            flip_y: false,
            clip: false,
            background_color: None,
            composite_op: Mix::Normal,
        }
    }
}

impl Style {
    /// Effective x scale after the uniform factor and flip are applied.
    pub fn effective_scale_x(&self) -> f64 {
        let flip = if self.flip_x { -1.0 } else { 1.0 };
        self.scale * self.scale_x * flip
    }

    /// Effective y scale after the uniform factor and flip are applied.
    pub fn effective_scale_y(&self) -> f64 {
        let flip = if self.flip_y { -1.0 } else { 1.0 };
        self.scale * self.scale_y * flip
    }

    /// Anchor point in local coordinates.
    pub fn anchor(&self) -> (f64, f64) {
        (self.anchor_x * self.width, self.anchor_y * self.height)
    }
}
