#![forbid(unsafe_code)]

//! Per-card offset animation.
//!
//! The controller never touches visuals directly. It describes offsets
//! through [`AnimationDriver`]: "card X should sit `(dx, dy)` away from its
//! layout position", either immediately or via an [`OffsetAnimation`]. A
//! toolkit can implement the trait on top of its own animation system;
//! [`AnimationScheduler`] is the built-in driver for hosts without one and
//! for tests.
//!
//! # Invariants
//!
//! 1. A finished animation leaves the channel exactly at its target.
//! 2. A card with no running animation and a zero offset is dropped from the
//!    scheduler, so an idle scheduler is empty.
//! 3. Starting an animation replaces whatever ran on that axis before.

use std::time::Duration;

use cardshift_core::animation::{Animation, Easing, Motion};
use cardshift_core::geometry::{Axis, Offset};
use cardshift_core::logging::TARGET_ANIMATION;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::card::CardId;

/// Animate one axis of one card's offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetAnimation {
    pub card: CardId,
    pub axis: Axis,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl OffsetAnimation {
    #[must_use]
    pub fn new(card: CardId, axis: Axis, from: f64, to: f64, duration: Duration) -> Self {
        Self {
            card,
            axis,
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Reported once per finished [`OffsetAnimation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationCompletion {
    pub card: CardId,
    pub axis: Axis,
    /// Final value; always the animation's `to`.
    pub value: f64,
}

/// Sink for offset instructions.
pub trait AnimationDriver {
    /// Start `animation`, replacing any running animation on the same axis.
    fn animate(&mut self, animation: OffsetAnimation);

    /// Jump to `offset` on both axes, stopping running animations.
    fn set_offset(&mut self, card: CardId, offset: Offset);

    /// Current offset (zero when unknown).
    fn offset(&self, card: CardId) -> Offset;

    /// Stop animating `card`, keeping its current offset.
    fn stop(&mut self, card: CardId);

    /// Drop every offset and animation.
    fn clear(&mut self);

    /// Cards with an animation still running, in id order.
    fn active_cards(&self) -> Vec<CardId>;

    fn is_animating(&self, card: CardId) -> bool {
        self.active_cards().contains(&card)
    }

    /// Animate `card` from `from` to `to` on every axis where they differ.
    fn animate_offset(
        &mut self,
        card: CardId,
        from: Offset,
        to: Offset,
        duration: Duration,
        delay: Duration,
        easing: Easing,
    ) {
        self.set_offset(card, from);
        for axis in Axis::BOTH {
            let (start, end) = (from.along(axis), to.along(axis));
            if start != end {
                self.animate(
                    OffsetAnimation::new(card, axis, start, end, duration)
                        .delay(delay)
                        .easing(easing),
                );
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Channel {
    value: f64,
    motion: Option<Motion>,
}

impl Channel {
    fn is_running(&self) -> bool {
        self.motion.is_some()
    }

    /// Advance; returns the final value if the motion finished on this tick.
    fn advance(&mut self, dt: Duration) -> Option<f64> {
        let motion = self.motion.as_mut()?;
        motion.tick(dt);
        self.value = motion.value();
        if motion.is_complete() {
            self.value = motion.target();
            self.motion = None;
            Some(self.value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CardChannels {
    x: Channel,
    y: Channel,
}

impl CardChannels {
    fn axis_mut(&mut self, axis: Axis) -> &mut Channel {
        match axis {
            Axis::Horizontal => &mut self.x,
            Axis::Vertical => &mut self.y,
        }
    }

    fn offset(&self) -> Offset {
        Offset::new(self.x.value, self.y.value)
    }

    fn is_running(&self) -> bool {
        self.x.is_running() || self.y.is_running()
    }

    fn is_idle_at_rest(&self) -> bool {
        !self.is_running() && self.offset().is_zero()
    }
}

/// Built-in [`AnimationDriver`] advanced by explicit frame deltas.
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    cards: FxHashMap<CardId, CardChannels>,
}

impl AnimationScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every running animation by `dt`.
    ///
    /// Completions are returned in card-id order, horizontal before vertical.
    pub fn advance(&mut self, dt: Duration) -> Vec<AnimationCompletion> {
        let mut done = Vec::new();
        for (card, channels) in &mut self.cards {
            for axis in Axis::BOTH {
                if let Some(value) = channels.axis_mut(axis).advance(dt) {
                    done.push(AnimationCompletion {
                        card: *card,
                        axis,
                        value,
                    });
                }
            }
        }
        self.cards.retain(|_, channels| !channels.is_idle_at_rest());
        done.sort_by_key(|c| (c.card, axis_rank(c.axis)));
        if !done.is_empty() {
            trace!(
                target: TARGET_ANIMATION,
                completed = done.len(),
                remaining = self.cards.len(),
                "animations completed"
            );
        }
        done
    }

    /// Whether no card carries an offset or animation.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of cards with a non-zero offset or running animation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every tracked card and its current offset, in id order.
    #[must_use]
    pub fn offsets(&self) -> Vec<(CardId, Offset)> {
        let mut out: Vec<_> = self
            .cards
            .iter()
            .map(|(card, channels)| (*card, channels.offset()))
            .collect();
        out.sort_by_key(|(card, _)| *card);
        out
    }
}

impl AnimationDriver for AnimationScheduler {
    fn animate(&mut self, animation: OffsetAnimation) {
        let motion = Motion::new(
            animation.from,
            animation.to,
            animation.duration,
            animation.delay,
            animation.easing,
        );
        let channel = self
            .cards
            .entry(animation.card)
            .or_default()
            .axis_mut(animation.axis);
        channel.value = animation.from;
        channel.motion = Some(motion);
    }

    fn set_offset(&mut self, card: CardId, offset: Offset) {
        if offset.is_zero() {
            self.cards.remove(&card);
            return;
        }
        let channels = self.cards.entry(card).or_default();
        for axis in Axis::BOTH {
            let channel = channels.axis_mut(axis);
            channel.motion = None;
            channel.value = offset.along(axis);
        }
    }

    fn offset(&self, card: CardId) -> Offset {
        self.cards
            .get(&card)
            .map_or(Offset::ZERO, CardChannels::offset)
    }

    fn stop(&mut self, card: CardId) {
        if let Some(channels) = self.cards.get_mut(&card) {
            channels.x.motion = None;
            channels.y.motion = None;
            if channels.is_idle_at_rest() {
                self.cards.remove(&card);
            }
        }
    }

    fn clear(&mut self) {
        self.cards.clear();
    }

    fn active_cards(&self) -> Vec<CardId> {
        let mut out: Vec<CardId> = self
            .cards
            .iter()
            .filter(|(_, channels)| channels.is_running())
            .map(|(card, _)| *card)
            .collect();
        out.sort();
        out
    }
}

fn axis_rank(axis: Axis) -> u8 {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}
