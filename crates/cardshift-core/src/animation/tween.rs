#![forbid(unsafe_code)]

//! Delayed scalar motion between two values.
//!
//! [`Tween`] is curve-driven: progress is `(elapsed - delay) / duration`
//! shaped by an [`EasingFn`]. [`Motion`] wraps either a tween or a
//! [`Spring`] behind one surface so callers can pick the feel from an
//! [`Easing`] value without caring which integrator runs.

use std::time::Duration;

use super::{Animation, Easing, EasingFn, Spring, ease_out_cubic};

/// Curve-driven interpolation from `from` to `to`.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    delay: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Tween with no delay and ease-out-cubic shaping.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            elapsed: Duration::ZERO,
            easing: ease_out_cubic,
        }
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Normalized progress in `[0, 1]`, before easing.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let Some(active) = self.elapsed.checked_sub(self.delay) else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        (active.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn end(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.end()
    }

    fn value(&self) -> f64 {
        if self.is_complete() {
            return self.to;
        }
        let eased = (self.easing)(self.progress());
        self.from + (self.to - self.from) * eased
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.end())
    }
}

/// A tween or a delayed spring, chosen by [`Easing`].
#[derive(Debug, Clone)]
pub enum Motion {
    Tween(Tween),
    Spring {
        spring: Spring,
        delay: Duration,
        /// Hard stop: the spring is settled once this much active time passes.
        cap: Duration,
        elapsed: Duration,
    },
}

/// Springs get this many multiples of the nominal duration before being forced to rest.
const SPRING_CAP_FACTOR: u32 = 4;

impl Motion {
    /// Build the motion for `easing`.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration, delay: Duration, easing: Easing) -> Self {
        match easing {
            Easing::Spring { stiffness, damping } => Self::Spring {
                spring: Spring::new(from, to)
                    .with_stiffness(stiffness)
                    .with_damping(damping),
                delay,
                cap: duration.saturating_mul(SPRING_CAP_FACTOR),
                elapsed: Duration::ZERO,
            },
            curve => {
                let easing = curve.curve().unwrap_or(ease_out_cubic);
                Self::Tween(Tween::new(from, to, duration).delay(delay).easing(easing))
            }
        }
    }

    /// Final value.
    #[must_use]
    pub fn target(&self) -> f64 {
        match self {
            Self::Tween(tween) => tween.target(),
            Self::Spring { spring, .. } => spring.target(),
        }
    }
}

impl Animation for Motion {
    fn tick(&mut self, dt: Duration) {
        match self {
            Self::Tween(tween) => tween.tick(dt),
            Self::Spring {
                spring,
                delay,
                cap,
                elapsed,
            } => {
                let before = *elapsed;
                *elapsed = elapsed.saturating_add(dt);
                // Only the part of dt past the delay drives the spring.
                let active = elapsed.saturating_sub((*delay).max(before));
                spring.tick(active);
                if elapsed.saturating_sub(*delay) >= *cap {
                    spring.settle();
                }
            }
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::Tween(tween) => tween.is_complete(),
            Self::Spring {
                spring,
                delay,
                elapsed,
                ..
            } => elapsed >= delay && spring.is_complete(),
        }
    }

    fn value(&self) -> f64 {
        match self {
            Self::Tween(tween) => tween.value(),
            Self::Spring { spring, .. } => spring.value(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Tween(tween) => tween.reset(),
            Self::Spring {
                spring, elapsed, ..
            } => {
                spring.reset();
                *elapsed = Duration::ZERO;
            }
        }
    }

    fn overshoot(&self) -> Duration {
        match self {
            Self::Tween(tween) => tween.overshoot(),
            Self::Spring { .. } => Duration::ZERO,
        }
    }
}
