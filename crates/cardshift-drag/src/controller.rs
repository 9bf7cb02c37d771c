#![forbid(unsafe_code)]

//! Drag session controller.
//!
//! [`DragController`] turns raw input into a drag gesture: press, threshold,
//! capture, live reordering (or link targeting), and drop or cancel. Every
//! call to [`DragController::handle`] returns one [`DragTransition`] naming
//! the phase before and after and what happened, so a host can log, replay,
//! or assert on the whole gesture.
//!
//! # Invariants
//!
//! 1. At most one session exists. A press while a session is still active
//!    discards it first (restoring the ordering if the drag never committed).
//! 2. Host failures never escape: they become [`DragEffect::Failed`], a
//!    [`UserMessage`](crate::UserMessage) for the host, and a return to a
//!    stable phase.
//! 3. Cancel restores the ordering the drag started from and leaves no
//!    neighbor offsets behind; the dragged card animates back to its slot.
//! 4. A reorder is saved once per drop, only if the index changed.
//! 5. Every session that reached Dragging ends in Finishing, whether it was
//!    dropped, canceled, or failed. [`DragController::tick`] then clears the
//!    per-card transforms. Only [`DragController::force_cancel`] and a press
//!    that replaces a stale session clear them immediately.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Press on nothing / unknown card | `Rejected`, stays Idle |
//! | Card vanished before the drag started | `Failed(InvalidDragTarget)`, Idle |
//! | Card vanished mid-drag | `Failed(StaleSessionState)`, session reverted, Finishing |
//! | `move_item_to_index` fails | `Failed(OrderingMutationFailed)`, session reverted, Finishing |
//! | `save` / `link_items` fails | `Failed(..)`, message shown, Finishing |
//! | Escape / capture or focus loss mid-drag | `Canceled(..)`, snap-back, Finishing |
//! | Escape / capture or focus loss while Pending | `Canceled(..)`, Idle |
//! | Release while Finishing | `Noop(AlreadyFinishing)` |

use std::time::Duration;

use cardshift_core::event::{
    DragInput, KeyCode, KeyEvent, KeyEventKind, PointerButton, PointerEvent, PointerEventKind,
};
use cardshift_core::geometry::{Offset, Point};
use cardshift_core::logging::TARGET_DRAG;
use cardshift_layout::GridPlacementSolver;
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::animator::{AnimationDriver, AnimationScheduler};
use crate::card::{CardId, CardSnapshot, NoteKind, renderable};
use crate::config::{ConfigError, DragConfig, ReorderStrategy};
use crate::error::DragError;
use crate::host::BoardHost;
use crate::session::{DragMode, DragPhase, DragSession, PendingPress, Settling};
use crate::swap::SwapReorderEngine;

/// Why a press did not arm a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The press hit no card.
    NoCard,
    /// The press landed in an embedded editor.
    EditableRegion,
    /// The press landed on a nested drag handle without a link modifier.
    DragHandle,
    /// The host does not list the pressed card.
    UnknownCard,
}

/// Why a session ended without a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    Escape,
    CaptureLost,
    FocusLost,
    /// Dropped while reordering is disabled.
    ReorderDisabled,
    /// A new press replaced a session that was still active.
    StaleSession,
    /// Link drop with no card to link to.
    NoLinkTarget,
    Programmatic,
}

/// Input that was safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoopReason {
    IdleWithoutSession,
    ThresholdNotReached,
    /// Position updated; placement not recomputed this sample.
    Throttled,
    AlreadyFinishing,
    ForeignButton,
    IgnoredKey,
}

/// What one transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    Armed {
        card: CardId,
    },
    Rejected(RejectReason),
    DragStarted {
        card: CardId,
        origin_index: usize,
        mode: DragMode,
    },
    Moved {
        offset: Offset,
    },
    Swapped {
        from: usize,
        to: usize,
        displaced: usize,
    },
    LinkTargetChanged {
        target: Option<CardId>,
    },
    ModeChanged {
        mode: DragMode,
    },
    ReorderCompleted {
        from: usize,
        to: usize,
        saved: bool,
    },
    Linked {
        target: CardId,
    },
    Canceled(CancelReason),
    Failed(DragError),
    /// Deferred cleanup ran; per-card transforms are gone.
    Settled,
    Noop(NoopReason),
}

/// One controller step.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

#[derive(Debug, Clone)]
enum DragState {
    Idle,
    Pending(PendingPress),
    Dragging(DragSession),
    Finishing(Settling),
}

/// Drag gesture state machine.
#[derive(Debug)]
pub struct DragController<A: AnimationDriver = AnimationScheduler> {
    config: DragConfig,
    solver: GridPlacementSolver,
    engine: SwapReorderEngine,
    animator: A,
    state: DragState,
    transition_counter: u64,
}

impl DragController<AnimationScheduler> {
    /// Controller driving the built-in [`AnimationScheduler`].
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self::with_animator(config, AnimationScheduler::new())
    }

    /// Like [`DragController::new`], rejecting invalid configs.
    pub fn try_new(config: DragConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.validated()?))
    }
}

impl Default for DragController<AnimationScheduler> {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl<A: AnimationDriver> DragController<A> {
    #[must_use]
    pub fn with_animator(config: DragConfig, animator: A) -> Self {
        Self {
            solver: GridPlacementSolver::new(config.layout),
            engine: SwapReorderEngine::from_config(&config),
            config,
            animator,
            state: DragState::Idle,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    #[must_use]
    pub fn engine(&self) -> &SwapReorderEngine {
        &self.engine
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Pending(_) => DragPhase::Pending,
            DragState::Dragging(_) => DragPhase::Dragging,
            DragState::Finishing(_) => DragPhase::Finishing,
        }
    }

    /// Whether any gesture state is held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// The drag in progress.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingPress> {
        match &self.state {
            DragState::Pending(press) => Some(press),
            _ => None,
        }
    }

    /// Transitions emitted so far.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Feed one input.
    pub fn handle<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        input: &DragInput,
        now: Instant,
    ) -> DragTransition {
        let from = self.phase();
        let effect = match input {
            DragInput::Pointer(event) => self.on_pointer(host, event, now),
            DragInput::Key(key) => self.on_key(host, key, now),
            DragInput::CaptureLost => self.on_interrupt(host, CancelReason::CaptureLost, now),
            DragInput::FocusLost => self.on_interrupt(host, CancelReason::FocusLost, now),
        };
        self.record(from, effect)
    }

    /// Run deferred cleanup once the settle delay has passed and the driver
    /// has no animation left.
    pub fn tick(&mut self, now: Instant) -> Option<DragTransition> {
        let DragState::Finishing(settling) = &self.state else {
            return None;
        };
        if now < settling.cleanup_at || !self.animator.active_cards().is_empty() {
            return None;
        }
        self.animator.clear();
        self.engine.reset();
        self.state = DragState::Idle;
        Some(self.record(DragPhase::Finishing, DragEffect::Settled))
    }

    /// Unconditionally end whatever is in progress, dropping every per-card
    /// transform on the spot. `None` when Idle.
    pub fn force_cancel<H: BoardHost + ?Sized>(&mut self, host: &mut H) -> Option<DragTransition> {
        let from = self.phase();
        let effect = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return None,
            DragState::Pending(_) => DragEffect::Canceled(CancelReason::Programmatic),
            DragState::Dragging(session) => {
                let failure = self.revert(host, &session, true);
                self.animator.clear();
                match failure {
                    Some(error) => self.report(host, &error),
                    None => DragEffect::Canceled(CancelReason::Programmatic),
                }
            }
            DragState::Finishing(_) => {
                self.animator.clear();
                self.engine.reset();
                DragEffect::Canceled(CancelReason::Programmatic)
            }
        };
        Some(self.record(from, effect))
    }

    fn record(&mut self, from: DragPhase, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.phase(),
            effect,
        };
        match &transition.effect {
            DragEffect::Noop(_) | DragEffect::Moved { .. } => trace!(
                target: TARGET_DRAG,
                id = transition.transition_id,
                from = ?transition.from,
                to = ?transition.to,
                effect = ?transition.effect,
                "drag transition"
            ),
            _ => debug!(
                target: TARGET_DRAG,
                id = transition.transition_id,
                from = ?transition.from,
                to = ?transition.to,
                effect = ?transition.effect,
                "drag transition"
            ),
        }
        transition
    }

    fn on_pointer<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
        now: Instant,
    ) -> DragEffect {
        if event.button != PointerButton::Primary {
            return DragEffect::Noop(NoopReason::ForeignButton);
        }
        match event.kind {
            PointerEventKind::Press => self.on_press(host, event, now),
            PointerEventKind::Move => self.on_move(host, event, now),
            PointerEventKind::Release => self.on_release(host, event, now),
        }
    }

    fn on_press<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
        now: Instant,
    ) -> DragEffect {
        let stale = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging(session) => {
                debug!(target: TARGET_DRAG, card = %session.card, "discarding stale drag session");
                if let Some(error) = self.revert(host, &session, true) {
                    self.report(host, &error);
                }
                self.animator.clear();
                true
            }
            DragState::Finishing(_) => {
                self.animator.clear();
                self.engine.reset();
                true
            }
            DragState::Pending(_) | DragState::Idle => false,
        };

        let Some(hit) = event.hit.card else {
            return DragEffect::Rejected(RejectReason::NoCard);
        };
        if let Some(region) = event.hit.region {
            if host.is_editable_region(region) {
                return DragEffect::Rejected(RejectReason::EditableRegion);
            }
            if host.is_drag_handle_region(region)
                && !event.modifiers.intersects(self.config.link_modifiers)
            {
                return DragEffect::Rejected(RejectReason::DragHandle);
            }
        }
        let Some(card) = renderable(host.all_cards())
            .into_iter()
            .find(|c| c.contains(hit))
        else {
            return DragEffect::Rejected(RejectReason::UnknownCard);
        };

        self.state = DragState::Pending(PendingPress {
            card: card.id,
            origin: event.position,
            grab: card.rect.origin().offset_to(event.position),
            modifiers: event.modifiers,
            pressed_at: now,
        });
        if stale {
            DragEffect::Canceled(CancelReason::StaleSession)
        } else {
            DragEffect::Armed { card: card.id }
        }
    }

    fn on_move<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
        now: Instant,
    ) -> DragEffect {
        match &self.state {
            DragState::Idle => DragEffect::Noop(NoopReason::IdleWithoutSession),
            DragState::Finishing(_) => DragEffect::Noop(NoopReason::AlreadyFinishing),
            DragState::Pending(press) => {
                let press = *press;
                if press.origin.distance(event.position) <= self.config.drag_threshold {
                    DragEffect::Noop(NoopReason::ThresholdNotReached)
                } else {
                    self.start_drag(host, press, event, now)
                }
            }
            DragState::Dragging(_) => self.update_drag(host, event.position, now),
        }
    }

    fn start_drag<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        press: PendingPress,
        event: &PointerEvent,
        now: Instant,
    ) -> DragEffect {
        let cards = renderable(host.all_cards());
        let Some(origin_index) = cards.iter().position(|c| c.id == press.card) else {
            self.state = DragState::Idle;
            return DragEffect::Failed(DragError::InvalidDragTarget);
        };
        let card = &cards[origin_index];

        host.capture_pointer();
        let held = press.modifiers | event.modifiers;
        let mode = if held.intersects(self.config.link_modifiers) {
            DragMode::Link
        } else {
            DragMode::Reorder
        };
        let locked_width = self
            .config
            .lock_layout_width
            .then(|| host.container_bounds().width);
        let mut session = DragSession {
            card: card.id,
            dragged_ids: card.dragged_ids(),
            kind: card.kind,
            origin_index,
            current_index: origin_index,
            grab: press.grab,
            pointer: event.position,
            drag_offset: Offset::ZERO,
            mode,
            highlighted: None,
            original_rect: card.rect,
            locked_width,
            started_at: now,
            last_check: None,
            swaps: 0,
        };
        self.engine.reset();

        if let Err(error) = self.reposition(host, &mut session) {
            return self.abort(host, session, error, now);
        }
        if mode == DragMode::Link {
            self.refresh_link_target(host, &mut session);
        }
        let effect = DragEffect::DragStarted {
            card: session.card,
            origin_index,
            mode,
        };
        self.state = DragState::Dragging(session);
        effect
    }

    fn update_drag<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        position: Point,
        now: Instant,
    ) -> DragEffect {
        let DragState::Dragging(mut session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return DragEffect::Noop(NoopReason::IdleWithoutSession);
        };
        session.pointer = position;
        if let Err(error) = self.reposition(host, &mut session) {
            return self.abort(host, session, error, now);
        }

        let effect = match session.mode {
            DragMode::Link => {
                if self.refresh_link_target(host, &mut session) {
                    DragEffect::LinkTargetChanged {
                        target: session.highlighted,
                    }
                } else {
                    DragEffect::Moved {
                        offset: session.drag_offset,
                    }
                }
            }
            DragMode::Reorder if !self.config.reorder_enabled => DragEffect::Moved {
                offset: session.drag_offset,
            },
            DragMode::Reorder => {
                let throttled = session.last_check.is_some_and(|last| {
                    now.saturating_duration_since(last) < self.config.swap_check_interval
                });
                if throttled {
                    DragEffect::Noop(NoopReason::Throttled)
                } else {
                    session.last_check = Some(now);
                    match self.check_reorder(host, &mut session, now) {
                        Ok(Some(effect)) => effect,
                        Ok(None) => DragEffect::Moved {
                            offset: session.drag_offset,
                        },
                        Err(error) => return self.abort(host, session, error, now),
                    }
                }
            }
        };
        self.state = DragState::Dragging(session);
        effect
    }

    /// Place the dragged visual so the grab point follows the pointer,
    /// clamped horizontally to the container and from above.
    fn reposition<H: BoardHost + ?Sized>(
        &mut self,
        host: &H,
        session: &mut DragSession,
    ) -> Result<(), DragError> {
        let layout = host
            .card_geometry(session.card)
            .ok_or(DragError::StaleSessionState)?;
        let bounds = host.container_bounds();
        let desired = session.desired_origin();
        let max_x = (bounds.right() - layout.width).max(bounds.left());
        let x = desired.x.max(bounds.left()).min(max_x);
        let y = desired.y.max(bounds.top());
        session.drag_offset = layout.origin().offset_to(Point::new(x, y));
        self.animator.set_offset(session.card, session.drag_offset);
        Ok(())
    }

    fn check_reorder<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: &mut DragSession,
        now: Instant,
    ) -> Result<Option<DragEffect>, DragError> {
        let cards = renderable(host.all_cards());
        let current = cards
            .iter()
            .position(|c| c.id == session.card)
            .ok_or(DragError::StaleSessionState)?;
        session.current_index = current;

        let width = host.container_bounds().width;
        let layout = self
            .solver
            .compute_layout(&cards, width, session.locked_width);
        let visual = cards[current].rect.translate(session.drag_offset);
        let decision = if layout.is_stack()
            && self.config.reorder_strategy == ReorderStrategy::CenterSwap
        {
            self.engine
                .on_drag_move(visual.center().y, &cards, current, now)
        } else {
            self.engine
                .on_grid_move(visual, &cards, &layout, current, now)
        };
        if !decision.swapped {
            return Ok(None);
        }

        host.move_item_to_index(session.card, decision.new_index)
            .map_err(DragError::OrderingMutationFailed)?;
        session.current_index = decision.new_index;
        session.swaps = session.swaps.saturating_add(1);

        for shift in &decision.shifts {
            let start = self.animator.offset(shift.card) - shift.displacement;
            self.animator.animate_offset(
                shift.card,
                start,
                Offset::ZERO,
                self.config.shift_duration,
                shift.delay,
                self.config.shift_easing,
            );
        }
        // The dragged card has a new layout slot; keep its visual where it was.
        self.reposition(host, session)?;

        Ok(Some(DragEffect::Swapped {
            from: current,
            to: decision.new_index,
            displaced: decision.shifts.len(),
        }))
    }

    fn on_release<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
        now: Instant,
    ) -> DragEffect {
        let mut session = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging(session) => session,
            DragState::Pending(_) => return DragEffect::Noop(NoopReason::ThresholdNotReached),
            DragState::Finishing(settling) => {
                self.state = DragState::Finishing(settling);
                return DragEffect::Noop(NoopReason::AlreadyFinishing);
            }
            DragState::Idle => return DragEffect::Noop(NoopReason::IdleWithoutSession),
        };
        session.pointer = event.position;
        if let Err(error) = self.reposition(host, &mut session) {
            return self.abort(host, session, error, now);
        }
        host.release_pointer_capture();

        if session.mode == DragMode::Reorder && !self.config.reorder_enabled {
            return self.cancel(host, session, CancelReason::ReorderDisabled, now);
        }

        let result = match session.mode {
            DragMode::Reorder => self
                .commit_order(host, &session)
                .map(|saved| DragEffect::ReorderCompleted {
                    from: session.origin_index,
                    to: session.current_index,
                    saved,
                }),
            DragMode::Link => self.finish_link(host, &session),
        };

        self.animator.animate_offset(
            session.card,
            session.drag_offset,
            Offset::ZERO,
            self.config.snap_back_duration,
            Duration::ZERO,
            self.config.snap_easing,
        );
        self.begin_settling(session.card, now);

        match result {
            Ok(effect) => effect,
            Err(error) => self.report(host, &error),
        }
    }

    /// Save once if the drag changed the index.
    fn commit_order<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: &DragSession,
    ) -> Result<bool, DragError> {
        if !session.index_changed() {
            return Ok(false);
        }
        host.save().map_err(DragError::SaveFailed)?;
        Ok(true)
    }

    /// Request the link, then persist any swaps made before switching to
    /// link mode. Both calls are attempted; when both fail the save failure
    /// is reported here and the link failure is returned.
    fn finish_link<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: &DragSession,
    ) -> Result<DragEffect, DragError> {
        let target = self.resolve_link_target(host, session);
        if session.highlighted.is_some() {
            host.set_link_highlight(None);
        }
        let linked = match target {
            Some(target) => host
                .link_items(&session.dragged_ids, target)
                .map(|()| DragEffect::Linked { target })
                .map_err(DragError::LinkFailed),
            None => Ok(DragEffect::Canceled(CancelReason::NoLinkTarget)),
        };
        let saved = self.commit_order(host, session);
        match (linked, saved) {
            (Err(link), Err(save)) => {
                self.report(host, &save);
                Err(link)
            }
            (Err(error), Ok(_)) | (Ok(_), Err(error)) => Err(error),
            (Ok(effect), Ok(_)) => Ok(effect),
        }
    }

    fn on_key<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        key: &KeyEvent,
        now: Instant,
    ) -> DragEffect {
        if key.code == KeyCode::Escape && key.kind == KeyEventKind::Press {
            return match std::mem::replace(&mut self.state, DragState::Idle) {
                DragState::Dragging(session) => {
                    self.cancel(host, session, CancelReason::Escape, now)
                }
                DragState::Pending(_) => DragEffect::Canceled(CancelReason::Escape),
                DragState::Finishing(settling) => {
                    self.state = DragState::Finishing(settling);
                    DragEffect::Noop(NoopReason::AlreadyFinishing)
                }
                DragState::Idle => DragEffect::Noop(NoopReason::IdleWithoutSession),
            };
        }
        if !key.is_modifier() || !matches!(self.state, DragState::Dragging(_)) {
            return DragEffect::Noop(NoopReason::IgnoredKey);
        }
        let DragState::Dragging(mut session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return DragEffect::Noop(NoopReason::IgnoredKey);
        };

        let mode = if key.modifiers.intersects(self.config.link_modifiers) {
            DragMode::Link
        } else {
            DragMode::Reorder
        };
        let effect = if mode == session.mode {
            DragEffect::Noop(NoopReason::IgnoredKey)
        } else {
            session.mode = mode;
            match mode {
                DragMode::Link => {
                    for card in self.animator.active_cards() {
                        if card != session.card {
                            self.animator.set_offset(card, Offset::ZERO);
                        }
                    }
                    self.refresh_link_target(host, &mut session);
                }
                DragMode::Reorder => {
                    if session.highlighted.take().is_some() {
                        host.set_link_highlight(None);
                    }
                    session.last_check = None;
                }
            }
            DragEffect::ModeChanged { mode }
        };
        self.state = DragState::Dragging(session);
        effect
    }

    fn on_interrupt<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        reason: CancelReason,
        now: Instant,
    ) -> DragEffect {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging(session) => self.cancel(host, session, reason, now),
            DragState::Pending(_) => DragEffect::Canceled(reason),
            DragState::Finishing(settling) => {
                self.state = DragState::Finishing(settling);
                DragEffect::Noop(NoopReason::AlreadyFinishing)
            }
            DragState::Idle => DragEffect::Noop(NoopReason::IdleWithoutSession),
        }
    }

    fn cancel<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: DragSession,
        reason: CancelReason,
        now: Instant,
    ) -> DragEffect {
        let release = reason != CancelReason::CaptureLost;
        let failure = self.revert(host, &session, release);
        self.begin_settling(session.card, now);
        match failure {
            Some(error) => self.report(host, &error),
            None => DragEffect::Canceled(reason),
        }
    }

    fn abort<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: DragSession,
        error: DragError,
        now: Instant,
    ) -> DragEffect {
        if let Some(secondary) = self.revert(host, &session, true) {
            warn!(target: TARGET_DRAG, error = %secondary, "could not restore ordering after failure");
        }
        self.begin_settling(session.card, now);
        self.report(host, &error)
    }

    /// Hand the session to deferred cleanup.
    fn begin_settling(&mut self, card: CardId, now: Instant) {
        self.state = DragState::Finishing(Settling {
            card,
            released_at: now,
            cleanup_at: now + self.config.settle_delay,
        });
    }

    /// Undo a session: restore the ordering, drop every neighbor offset, and
    /// animate the dragged card from where it is back into its slot.
    fn revert<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: &DragSession,
        release_capture: bool,
    ) -> Option<DragError> {
        let visual = host
            .card_geometry(session.card)
            .map(|rect| rect.origin().translate(session.drag_offset));

        let mut failure = None;
        if session.index_changed()
            && let Err(error) = host.move_item_to_index(session.card, session.origin_index)
        {
            failure = Some(DragError::OrderingMutationFailed(error));
        }

        self.animator.clear();
        if let (Some(visual), Some(slot)) = (visual, host.card_geometry(session.card)) {
            let start = slot.origin().offset_to(visual);
            self.animator.animate_offset(
                session.card,
                start,
                Offset::ZERO,
                self.config.snap_back_duration,
                Duration::ZERO,
                self.config.snap_easing,
            );
        }
        if session.highlighted.is_some() {
            host.set_link_highlight(None);
        }
        if release_capture {
            host.release_pointer_capture();
        }
        self.engine.reset();
        failure
    }

    fn report<H: BoardHost + ?Sized>(&mut self, host: &mut H, error: &DragError) -> DragEffect {
        warn!(target: TARGET_DRAG, %error, "drag failed");
        if let Some(message) = error.user_message() {
            host.notify(message);
        }
        DragEffect::Failed(error.clone())
    }

    /// Update the highlighted link target under the pointer. Returns whether
    /// it changed.
    fn refresh_link_target<H: BoardHost + ?Sized>(
        &mut self,
        host: &mut H,
        session: &mut DragSession,
    ) -> bool {
        let target = renderable(host.all_cards())
            .into_iter()
            .filter(|c| is_link_candidate(session, c))
            .find(|c| c.rect.contains(session.pointer))
            .map(|c| c.id);
        if target == session.highlighted {
            return false;
        }
        session.highlighted = target;
        host.set_link_highlight(target);
        true
    }

    /// Highlighted card, else nearest by center distance. A blank pick is
    /// replaced by the best non-blank candidate.
    fn resolve_link_target<H: BoardHost + ?Sized>(
        &self,
        host: &H,
        session: &DragSession,
    ) -> Option<CardId> {
        let candidates: Vec<CardSnapshot> = renderable(host.all_cards())
            .into_iter()
            .filter(|c| is_link_candidate(session, c))
            .collect();
        let center = host
            .card_geometry(session.card)
            .map_or(session.pointer, |rect| {
                rect.translate(session.drag_offset).center()
            });

        let pick = |allow_blank: bool| {
            let pool = candidates.iter().filter(|c| allow_blank || !c.blank);
            session
                .highlighted
                .and_then(|id| pool.clone().find(|c| c.id == id))
                .or_else(|| nearest(pool, center))
        };
        let first = pick(true)?;
        if first.blank {
            pick(false).map(|c| c.id)
        } else {
            Some(first.id)
        }
    }
}

fn is_link_candidate(session: &DragSession, card: &CardSnapshot) -> bool {
    if session.drags(card.id) || session.dragged_ids.iter().any(|id| card.contains(*id)) {
        return false;
    }
    !(session.kind == NoteKind::Order && card.kind == NoteKind::StickyNote)
}

fn nearest<'a>(
    cards: impl Iterator<Item = &'a CardSnapshot>,
    center: Point,
) -> Option<&'a CardSnapshot> {
    let mut best: Option<(&CardSnapshot, f64)> = None;
    for card in cards {
        let distance = card.rect.center().distance_squared(center);
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((card, distance)),
        }
    }
    best.map(|(card, _)| card)
}
