#![forbid(unsafe_code)]

//! Start-delay schedules for cascades.
//!
//! When one reorder displaces several neighbors, their motions start one
//! after another instead of all at once. [`stagger_offsets`] produces the
//! per-item delays in scan order.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ease_out;

/// How delays are distributed across items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerMode {
    /// `i * step`.
    #[default]
    Linear,
    /// Same total spread as linear, front-loaded: early gaps are wider.
    EaseOut,
    /// Last item first.
    Reverse,
}

/// Delays for `count` items spaced by `step`.
///
/// Always returns exactly `count` entries; the first (or last, for
/// [`StaggerMode::Reverse`]) is zero.
#[must_use]
pub fn stagger_offsets(count: usize, step: Duration, mode: StaggerMode) -> Vec<Duration> {
    if count == 0 {
        return Vec::new();
    }
    let last = count - 1;
    (0..count)
        .map(|i| match mode {
            StaggerMode::Linear => step.saturating_mul(i as u32),
            StaggerMode::Reverse => step.saturating_mul((last - i) as u32),
            StaggerMode::EaseOut if i == 0 => Duration::ZERO,
            StaggerMode::EaseOut if i == last => step.saturating_mul(last as u32),
            StaggerMode::EaseOut => step
                .saturating_mul(last as u32)
                .mul_f64(ease_out(i as f64 / last as f64)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(12);

    #[test]
    fn empty_for_zero_items() {
        assert!(stagger_offsets(0, STEP, StaggerMode::Linear).is_empty());
    }

    #[test]
    fn linear_spacing() {
        let offsets = stagger_offsets(3, STEP, StaggerMode::Linear);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(12),
                Duration::from_millis(24)
            ]
        );
    }

    #[test]
    fn reverse_spacing() {
        let offsets = stagger_offsets(3, STEP, StaggerMode::Reverse);
        assert_eq!(offsets[0], Duration::from_millis(24));
        assert_eq!(offsets[2], Duration::ZERO);
    }

    #[test]
    fn ease_out_keeps_total_spread_and_order() {
        let offsets = stagger_offsets(5, STEP, StaggerMode::EaseOut);
        assert_eq!(offsets[0], Duration::ZERO);
        assert_eq!(offsets[4], Duration::from_millis(48));
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert!(offsets[1] > Duration::from_millis(12));
    }

    #[test]
    fn single_item_has_no_delay() {
        for mode in [StaggerMode::Linear, StaggerMode::EaseOut, StaggerMode::Reverse] {
            assert_eq!(stagger_offsets(1, STEP, mode), vec![Duration::ZERO]);
        }
    }
}
