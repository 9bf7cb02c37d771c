#![forbid(unsafe_code)]

//! Live reordering during a drag.
//!
//! [`SwapReorderEngine`] decides, one pointer sample at a time, whether the
//! dragged card should move to a new index, and which neighbors are
//! displaced by that move. It never mutates the ordering itself; the caller
//! applies the single-position move and animates the reported shifts.
//!
//! # Swap rules
//!
//! - **Center swap** (single column): the dragged center must strictly pass
//!   a neighbor's center. Moving up, the scan walks backward from the current
//!   index; moving down, forward. Either way it keeps going while the
//!   condition holds, so a fast drag crosses several cards in one decision.
//! - **Insertion** (grids, or on request): the nearest slot wins, see
//!   [`calculate_insertion_index`].
//!
//! # Invariants
//!
//! 1. Two swaps are never accepted less than `cooldown` apart.
//! 2. The dragged card is never its own neighbor.
//! 3. Shifts are listed nearest-first, with delays growing by the stagger step.
//!
//! # Failure Modes
//!
//! An out-of-range `current_index` yields a non-swap with
//! [`SwapRejection::UnknownIndex`]; geometry is never trusted past the slice.

use std::time::Duration;

use cardshift_core::animation::{StaggerMode, stagger_offsets};
use cardshift_core::geometry::{Offset, Rect, Sides};
use cardshift_core::logging::TARGET_SWAP;
use cardshift_layout::{GridLayout, LayoutItem, calculate_insertion_index, move_target};
use tracing::{debug, trace};
use web_time::Instant;

use crate::card::CardId;
use crate::config::DragConfig;

/// How far one displaced neighbor moved and when its catch-up starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborShift {
    pub card: CardId,
    /// New layout position minus old layout position.
    pub displacement: Offset,
    pub delay: Duration,
}

/// Why a sample did not produce a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapRejection {
    /// The previous swap is too recent.
    CoolingDown,
    /// The dragged card has not passed any neighbor.
    NoCrossing,
    /// `current_index` is outside the card slice.
    UnknownIndex,
}

/// Outcome of one pointer sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapDecision {
    pub new_index: usize,
    pub swapped: bool,
    pub shifts: Vec<NeighborShift>,
    pub rejection: Option<SwapRejection>,
}

impl SwapDecision {
    fn stay(index: usize, rejection: SwapRejection) -> Self {
        Self {
            new_index: index,
            swapped: false,
            shifts: Vec::new(),
            rejection: Some(rejection),
        }
    }

    fn moved(new_index: usize, shifts: Vec<NeighborShift>) -> Self {
        Self {
            new_index,
            swapped: true,
            shifts,
            rejection: None,
        }
    }
}

/// Swap detector with cooldown.
#[derive(Debug, Clone)]
pub struct SwapReorderEngine {
    cooldown: Duration,
    stagger_step: Duration,
    stagger_mode: StaggerMode,
    margin: Sides,
    last_swap: Option<Instant>,
}

impl Default for SwapReorderEngine {
    fn default() -> Self {
        Self::from_config(&DragConfig::default())
    }
}

impl SwapReorderEngine {
    #[must_use]
    pub fn new(cooldown: Duration, stagger_step: Duration) -> Self {
        Self {
            cooldown,
            stagger_step,
            stagger_mode: StaggerMode::Linear,
            margin: Sides::default(),
            last_swap: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &DragConfig) -> Self {
        Self::new(config.swap_cooldown, config.stagger_step).with_margin(config.layout.margin)
    }

    /// Margin added to the dragged card's height when displacing neighbors.
    #[must_use]
    pub fn with_margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_stagger_mode(mut self, mode: StaggerMode) -> Self {
        self.stagger_mode = mode;
        self
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// When the last swap was accepted.
    #[must_use]
    pub fn last_swap(&self) -> Option<Instant> {
        self.last_swap
    }

    #[must_use]
    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.last_swap
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    /// Forget the last swap; call between sessions.
    pub fn reset(&mut self) {
        self.last_swap = None;
    }

    /// Center-swap decision for a single-column list.
    ///
    /// `cards` is the current ordering with the dragged card at
    /// `current_index`; rectangles are layout positions.
    pub fn on_drag_move<T: LayoutItem>(
        &mut self,
        dragged_center_y: f64,
        cards: &[T],
        current_index: usize,
        now: Instant,
    ) -> SwapDecision {
        let Some(dragged) = cards.get(current_index) else {
            return SwapDecision::stay(current_index, SwapRejection::UnknownIndex);
        };
        if self.is_cooling_down(now) {
            trace!(target: TARGET_SWAP, current_index, "swap suppressed by cooldown");
            return SwapDecision::stay(current_index, SwapRejection::CoolingDown);
        }

        let mut target = current_index;
        for j in (0..current_index).rev() {
            if dragged_center_y < cards[j].rect().center().y {
                target = j;
            } else {
                break;
            }
        }
        if target == current_index {
            for (j, card) in cards.iter().enumerate().skip(current_index + 1) {
                if dragged_center_y > card.rect().center().y {
                    target = j;
                } else {
                    break;
                }
            }
        }
        if target == current_index {
            return SwapDecision::stay(current_index, SwapRejection::NoCrossing);
        }

        let shifts = self.stack_shifts(dragged.rect(), cards, current_index, target);
        self.accept(current_index, target, shifts, now)
    }

    /// Insertion-based decision for grids (or stacks under
    /// [`ReorderStrategy::Insertion`](crate::ReorderStrategy::Insertion)).
    ///
    /// `layout` must have been computed from `cards`. `dragged` is the
    /// dragged card's visual rectangle.
    pub fn on_grid_move<T: LayoutItem>(
        &mut self,
        dragged: Rect,
        cards: &[T],
        layout: &GridLayout,
        current_index: usize,
        now: Instant,
    ) -> SwapDecision {
        let Some(dragged_card) = cards.get(current_index) else {
            return SwapDecision::stay(current_index, SwapRejection::UnknownIndex);
        };
        if self.is_cooling_down(now) {
            trace!(target: TARGET_SWAP, current_index, "swap suppressed by cooldown");
            return SwapDecision::stay(current_index, SwapRejection::CoolingDown);
        }

        let insertion =
            calculate_insertion_index(dragged, cards, &[dragged_card.id()], Some(layout));
        let target = move_target(insertion, current_index).min(cards.len() - 1);
        if target == current_index {
            return SwapDecision::stay(current_index, SwapRejection::NoCrossing);
        }

        let shifts = if layout.is_stack() {
            self.stack_shifts(dragged_card.rect(), cards, current_index, target)
        } else {
            self.slot_shifts(cards, current_index, target)
        };
        self.accept(current_index, target, shifts, now)
    }

    fn accept(
        &mut self,
        from: usize,
        to: usize,
        shifts: Vec<NeighborShift>,
        now: Instant,
    ) -> SwapDecision {
        self.last_swap = Some(now);
        debug!(
            target: TARGET_SWAP,
            from,
            to,
            displaced = shifts.len(),
            "swap accepted"
        );
        SwapDecision::moved(to, shifts)
    }

    /// Neighbors between `from` and `to`, nearest first, each moved by the
    /// dragged card's full extent opposite the drag.
    fn stack_shifts<T: LayoutItem>(
        &self,
        dragged: Rect,
        cards: &[T],
        from: usize,
        to: usize,
    ) -> Vec<NeighborShift> {
        let extent = dragged.height + self.margin.vertical_sum();
        let (indices, dy): (Vec<usize>, f64) = if to < from {
            ((to..from).rev().collect(), extent)
        } else {
            ((from + 1..=to).collect(), -extent)
        };
        self.staggered(cards, &indices, |_| Offset::new(0.0, dy))
    }

    /// Neighbors between `from` and `to`, nearest first, each sliding into
    /// the slot of the card next to it (toward the drag origin).
    fn slot_shifts<T: LayoutItem>(&self, cards: &[T], from: usize, to: usize) -> Vec<NeighborShift> {
        let upward = to < from;
        let indices: Vec<usize> = if upward {
            (to..from).rev().collect()
        } else {
            (from + 1..=to).collect()
        };
        self.staggered(cards, &indices, |j| {
            let next = if upward { j + 1 } else { j - 1 };
            cards[j].rect().origin().offset_to(cards[next].rect().origin())
        })
    }

    fn staggered<T: LayoutItem>(
        &self,
        cards: &[T],
        indices: &[usize],
        displacement: impl Fn(usize) -> Offset,
    ) -> Vec<NeighborShift> {
        let delays = stagger_offsets(indices.len(), self.stagger_step, self.stagger_mode);
        indices
            .iter()
            .zip(delays)
            .map(|(&j, delay)| NeighborShift {
                card: cards[j].id(),
                displacement: displacement(j),
                delay,
            })
            .collect()
    }
}
