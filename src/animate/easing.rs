use std::f64::consts::PI;

/// Alters how the easing function behaves, i.e. how the animation interpolates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EasingMode {
    #[default]
    /// Interpolation follows the mathematical formula associated with the easing function.
    In,
    /// Interpolation follows 100% interpolation minus the output of the formula.
    Out,
    /// `In` for the first half of the animation, `Out` for the second half.
    InOut,
}

// See https://easings.net/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EasingFn {
    #[default]
    Linear,
    /// Accelerates and/or decelerates using a circular function.
    Circle,
    /// Resembles a spring oscillating back and forth until it comes to rest.
    Elastic,
    /// Accelerates and/or decelerates using an exponential formula.
    Exponential,
    /// `f(t) = t^2`.
    Quadratic,
    /// `f(t) = t^3`.
    Cubic,
    /// `f(t) = t^4`.
    Quartic,
    /// `f(t) = t^5`.
    Quintic,
    /// Accelerates and/or decelerates using a sine formula.
    Sine,
}

fn elastic_easing(time: f64) -> f64 {
    let c4: f64 = (2.0 * PI) / 3.0;
    if time == 0.0 {
        0.0
    } else if (1.0 - time).abs() < f64::EPSILON {
        1.0
    } else {
        -(2.0_f64.powf(10.0 * time - 10.0) * ((time * 10.0 - 10.75) * c4).sin())
    }
}

fn apply_easing_fn(v: f64, func: EasingFn) -> f64 {
    match func {
        EasingFn::Linear => v,
        EasingFn::Circle => 1.0 - (1.0 - v.powi(2)).sqrt(),
        EasingFn::Elastic => elastic_easing(v),
        EasingFn::Exponential => {
            if v == 0.0 {
                0.0
            } else {
                2.0f64.powf(10.0 * v - 10.0)
            }
        }
        EasingFn::Quadratic => v.powf(2.0),
        EasingFn::Cubic => v.powf(3.0),
        EasingFn::Quartic => v.powf(4.0),
        EasingFn::Quintic => v.powf(5.0),
        EasingFn::Sine => 1.0 - ((v * PI) / 2.0).cos(),
    }
}

/// An easing mode and function pair applied to normalized progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Easing {
    pub mode: EasingMode,
    pub func: EasingFn,
}

impl Easing {
    pub fn new(mode: EasingMode, func: EasingFn) -> Self {
        Self { mode, func }
    }

    pub fn ease(&self, v: f64) -> f64 {
        ease(v, self.mode, self.func)
    }
}

pub fn ease(v: f64, mode: EasingMode, func: EasingFn) -> f64 {
    match mode {
        EasingMode::In => apply_easing_fn(v, func),
        EasingMode::Out => 1.0 - apply_easing_fn(1.0 - v, func),
        EasingMode::InOut => {
            if v < 0.5 {
                apply_easing_fn(v * 2.0, func) / 2.0
            } else {
                1.0 - apply_easing_fn(2.0 - v * 2., func) / 2.0
            }
        }
    }
}
