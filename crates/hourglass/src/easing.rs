//! Easing curves for interpolators.
//!
//! Every curve maps progress in `[0, 1]` to eased progress and is pinned to
//! exactly `0` at the start and exactly `1` at the end, in every direction.
//! Completion is detected on raw progress, never on the eased value.

/// Which end of the curve the easing applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EaseDirection {
    /// Slow start.
    In,
    /// Slow finish.
    Out,
    /// Slow start and finish, split at the midpoint.
    #[default]
    InOut,
}

/// Signature of a custom easing curve.
pub type EasingFn = fn(f32, EaseDirection) -> f32;

/// Overshoot used by the spring curve.
pub const SPRING_OVERSHOOT: f32 = 1.701_58;

/// Overshoot multiplier for the spring curve's in-out blend.
pub const SPRING_IN_OUT_SCALE: f32 = 1.525;

/// Easing curve selection.
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// Straight line.
    #[default]
    Linear,
    /// Power of two.
    Quadratic,
    /// Power of three.
    Cubic,
    /// Power of four.
    Quartic,
    /// Power of five.
    Quintic,
    /// `2^(10(p - 1))` on the in side.
    Exponential,
    /// Quarter-circle arcs.
    Circular,
    /// Cubic that overshoots before/after the endpoints.
    Spring,
    /// A caller-supplied curve.
    Custom(EasingFn),
}

impl Easing {
    /// All built-in curves.
    pub const BUILT_IN: [Self; 8] = [
        Self::Linear,
        Self::Quadratic,
        Self::Cubic,
        Self::Quartic,
        Self::Quintic,
        Self::Exponential,
        Self::Circular,
        Self::Spring,
    ];

    /// Applies the curve to `progress`.
    #[must_use]
    pub fn apply(self, progress: f32, direction: EaseDirection) -> f32 {
        if progress <= 0.0 {
            return 0.0;
        }
        if progress >= 1.0 {
            return 1.0;
        }

        match self {
            Self::Linear => linear(progress, direction),
            Self::Quadratic => quadratic(progress, direction),
            Self::Cubic => cubic(progress, direction),
            Self::Quartic => quartic(progress, direction),
            Self::Quintic => quintic(progress, direction),
            Self::Exponential => exponential(progress, direction),
            Self::Circular => circular(progress, direction),
            Self::Spring => spring(progress, direction),
            Self::Custom(curve) => curve(progress, direction),
        }
    }
}

/// Linear curve. Direction has no effect.
#[must_use]
pub fn linear(progress: f32, _direction: EaseDirection) -> f32 {
    progress
}

/// Quadratic curve.
#[must_use]
pub fn quadratic(progress: f32, direction: EaseDirection) -> f32 {
    power(progress, direction, 2)
}

/// Cubic curve.
#[must_use]
pub fn cubic(progress: f32, direction: EaseDirection) -> f32 {
    power(progress, direction, 3)
}

/// Quartic curve.
#[must_use]
pub fn quartic(progress: f32, direction: EaseDirection) -> f32 {
    power(progress, direction, 4)
}

/// Quintic curve.
#[must_use]
pub fn quintic(progress: f32, direction: EaseDirection) -> f32 {
    power(progress, direction, 5)
}

fn power(p: f32, direction: EaseDirection, n: i32) -> f32 {
    match direction {
        EaseDirection::In => p.powi(n),
        EaseDirection::Out => 1.0 - (1.0 - p).powi(n),
        EaseDirection::InOut => {
            let p = p * 2.0;
            if p < 1.0 {
                0.5 * p.powi(n)
            } else {
                1.0 - 0.5 * (2.0 - p).powi(n)
            }
        }
    }
}

/// Exponential curve with explicit endpoints.
#[must_use]
pub fn exponential(p: f32, direction: EaseDirection) -> f32 {
    match direction {
        EaseDirection::In => {
            if p <= 0.0 {
                0.0
            } else {
                2.0_f32.powf(10.0 * (p - 1.0))
            }
        }
        EaseDirection::Out => {
            if p >= 1.0 {
                1.0
            } else {
                1.0 - 2.0_f32.powf(-10.0 * p)
            }
        }
        EaseDirection::InOut => {
            if p <= 0.0 {
                return 0.0;
            }
            if p >= 1.0 {
                return 1.0;
            }
            let p = p * 2.0;
            if p < 1.0 {
                0.5 * 2.0_f32.powf(10.0 * (p - 1.0))
            } else {
                0.5 * (2.0 - 2.0_f32.powf(-10.0 * (p - 1.0)))
            }
        }
    }
}

/// Circular curve.
#[must_use]
pub fn circular(p: f32, direction: EaseDirection) -> f32 {
    match direction {
        EaseDirection::In => 1.0 - (1.0 - p * p).sqrt(),
        EaseDirection::Out => {
            let p = p - 1.0;
            (1.0 - p * p).sqrt()
        }
        EaseDirection::InOut => {
            let p = p * 2.0;
            if p < 1.0 {
                -0.5 * ((1.0 - p * p).sqrt() - 1.0)
            } else {
                let p = p - 2.0;
                0.5 * ((1.0 - p * p).sqrt() + 1.0)
            }
        }
    }
}

/// Spring curve. Dips below 0 (in) or above 1 (out) before settling.
#[must_use]
pub fn spring(p: f32, direction: EaseDirection) -> f32 {
    let s = SPRING_OVERSHOOT;
    match direction {
        EaseDirection::In => p * p * ((s + 1.0) * p - s),
        EaseDirection::Out => {
            let p = p - 1.0;
            p * p * ((s + 1.0) * p + s) + 1.0
        }
        EaseDirection::InOut => {
            let s = s * SPRING_IN_OUT_SCALE;
            let p = p * 2.0;
            if p < 1.0 {
                0.5 * (p * p * ((s + 1.0) * p - s))
            } else {
                let p = p - 2.0;
                0.5 * (p * p * ((s + 1.0) * p + s) + 2.0)
            }
        }
    }
}
