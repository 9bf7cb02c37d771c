#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! Everything here is toolkit-agnostic: values are plain `f64`s advanced by
//! explicit `Duration` ticks, so a host can drive them from any frame clock
//! and tests can drive them deterministically.
//!
//! # Pieces
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Animation`] | Common tick/value surface |
//! | [`EasingFn`] + curves | Pure `[0,1] -> R` shaping functions |
//! | [`Easing`] | Serializable choice of curve or spring |
//! | [`Tween`] / [`Motion`] | Delayed scalar interpolation `from -> to` |
//! | [`Spring`] | Damped harmonic oscillator |
//! | [`stagger_offsets`] | Cascade start delays |
//!
//! # Invariants
//!
//! 1. Every easing curve maps 0 to 0 and 1 to 1.
//! 2. A completed [`Motion`] reports exactly its target value.
//! 3. Inputs outside `[0, 1]` are clamped before shaping.

pub mod spring;
pub mod stagger;
pub mod tween;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use spring::Spring;
pub use stagger::{StaggerMode, stagger_offsets};
pub use tween::{Motion, Tween};

/// A time-driven animated value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Current value.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time ticked past completion. Zero while running.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Shaping function applied to normalized progress.
pub type EasingFn = fn(f64) -> f64;

#[inline]
fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Identity curve.
pub fn linear(t: f64) -> f64 {
    clamp_unit(t)
}

/// Quadratic acceleration.
pub fn ease_in(t: f64) -> f64 {
    let t = clamp_unit(t);
    t * t
}

/// Quadratic deceleration.
pub fn ease_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic acceleration then deceleration.
pub fn ease_in_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic deceleration.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t).powi(3)
}

/// Deceleration that overshoots the target by ~10% before settling.
pub fn ease_out_back(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    let t = clamp_unit(t);
    let u = t - 1.0;
    1.0 + C3 * u.powi(3) + C1 * u.powi(2)
}

/// Decaying oscillation around the target.
pub fn ease_out_elastic(t: f64) -> f64 {
    const C4: f64 = (2.0 * std::f64::consts::PI) / 3.0;
    let t = clamp_unit(t);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
}

/// Serializable easing choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    #[default]
    EaseOutCubic,
    EaseOutBack,
    EaseOutElastic,
    /// Physically simulated; the duration only caps how long it may run.
    Spring { stiffness: f64, damping: f64 },
}

impl Easing {
    /// A lively spring that overshoots a little.
    pub const SPRING_BOUNCY: Self = Self::Spring {
        stiffness: 260.0,
        damping: 20.0,
    };

    /// Curve function, or `None` for [`Easing::Spring`].
    #[must_use]
    pub fn curve(&self) -> Option<EasingFn> {
        Some(match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
            Self::EaseOutCubic => ease_out_cubic,
            Self::EaseOutBack => ease_out_back,
            Self::EaseOutElastic => ease_out_elastic,
            Self::Spring { .. } => return None,
        })
    }

    /// Whether the motion can pass its target before settling.
    #[must_use]
    pub fn overshoots(&self) -> bool {
        match self {
            Self::EaseOutBack | Self::EaseOutElastic => true,
            Self::Spring { stiffness, damping } => {
                *damping < 2.0 * stiffness.max(spring::MIN_STIFFNESS).sqrt()
            }
            _ => false,
        }
    }
}
