#![forbid(unsafe_code)]

//! Scripted gestures against a [`Board`].
//!
//! [`DragRig`] owns a controller, a board, and a [`ManualClock`]. Every
//! pointer move first advances time by one frame (stepping animations and
//! deferred cleanup), so a script reads like a recording of real input:
//!
//! ```
//! use cardshift_core::geometry::Sides;
//! use cardshift_harness::{Board, DragRig};
//!
//! let board = Board::stack(300.0, 3, 100.0).with_margin(Sides::vertical(8.0));
//! let mut rig = DragRig::new(board);
//! rig.press_on(3);
//! rig.move_by(0.0, -120.0);
//! rig.move_by(0.0, -120.0);
//! rig.release();
//! rig.settle();
//! assert_eq!(rig.board().order(), vec![3, 1, 2]);
//! ```

use std::time::Duration;

use cardshift_core::event::{
    DragInput, HitTarget, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent, RegionId,
};
use cardshift_core::geometry::{Offset, Point, Rect};
use cardshift_drag::{
    AnimationDriver, CardId, DragConfig, DragController, DragEffect, DragPhase, DragTransition,
};
use serde_json::json;
use web_time::Instant;

use crate::board::Board;
use crate::clock::ManualClock;

/// Default frame length.
pub const FRAME: Duration = Duration::from_millis(16);

/// Frames [`DragRig::settle`] runs before giving up.
const SETTLE_LIMIT: usize = 600;

/// Controller + board + clock, driven by scripted input.
#[derive(Debug)]
pub struct DragRig {
    controller: DragController,
    board: Board,
    clock: ManualClock,
    frame: Duration,
    pointer: Point,
    log: Vec<(Duration, DragTransition)>,
}

impl DragRig {
    /// Rig with the default [`DragConfig`], its layout margin taken from
    /// the board.
    #[must_use]
    pub fn new(board: Board) -> Self {
        let mut config = DragConfig::default();
        config.layout.margin = board.margin();
        Self::with_config(config, board)
    }

    #[must_use]
    pub fn with_config(config: DragConfig, board: Board) -> Self {
        Self {
            controller: DragController::new(config),
            board,
            clock: ManualClock::new(),
            frame: FRAME,
            pointer: Point::ORIGIN,
            log: Vec::new(),
        }
    }

    /// Change the time each pointer move advances.
    #[must_use]
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    #[must_use]
    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DragController {
        &mut self.controller
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Feed one input at the current time.
    pub fn send(&mut self, input: impl Into<DragInput>) -> DragTransition {
        let input = input.into();
        if let DragInput::Pointer(event) = &input {
            self.pointer = event.position;
        }
        let transition = self.controller.handle(&mut self.board, &input, self.clock.now());
        self.push(transition)
    }

    /// Press the center of the item containing `id`.
    pub fn press_on(&mut self, id: u64) -> DragTransition {
        self.press_on_with(id, Modifiers::NONE)
    }

    pub fn press_on_with(&mut self, id: u64, modifiers: Modifiers) -> DragTransition {
        let at = self.center_of(id);
        self.send(PointerEvent::press(at, HitTarget::card(CardId(id))).with_modifiers(modifiers))
    }

    /// Press inside a nested region of `id`.
    pub fn press_region(&mut self, id: u64, region: RegionId, modifiers: Modifiers) -> DragTransition {
        let at = self.center_of(id);
        self.send(
            PointerEvent::press(at, HitTarget::region(CardId(id), region)).with_modifiers(modifiers),
        )
    }

    pub fn press_at(&mut self, at: Point, hit: HitTarget) -> DragTransition {
        self.send(PointerEvent::press(at, hit))
    }

    /// Advance one frame, then move the pointer to `at`.
    pub fn move_to(&mut self, at: Point) -> DragTransition {
        self.step(self.frame);
        self.send(PointerEvent::moved(at))
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) -> DragTransition {
        let at = self.pointer.translate(Offset::new(dx, dy));
        self.move_to(at)
    }

    /// Move to `at` in `steps` equal increments; returns every transition.
    pub fn glide_to(&mut self, at: Point, steps: usize) -> Vec<DragTransition> {
        let steps = steps.max(1);
        let start = self.pointer;
        (1..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                let next = Point::new(
                    start.x + (at.x - start.x) * t,
                    start.y + (at.y - start.y) * t,
                );
                self.move_to(next)
            })
            .collect()
    }

    /// Release at the current pointer position.
    pub fn release(&mut self) -> DragTransition {
        self.send(PointerEvent::release(self.pointer))
    }

    pub fn key(&mut self, code: KeyCode, kind: KeyEventKind, modifiers: Modifiers) -> DragTransition {
        self.send(KeyEvent::new(code).with_kind(kind).with_modifiers(modifiers))
    }

    pub fn escape(&mut self) -> DragTransition {
        self.key(KeyCode::Escape, KeyEventKind::Press, Modifiers::NONE)
    }

    /// Take pointer capture away from the board and tell the controller.
    pub fn lose_capture(&mut self) -> DragTransition {
        self.board.lose_capture();
        self.send(DragInput::CaptureLost)
    }

    /// End whatever is in progress. `None` when Idle.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        let transition = self.controller.force_cancel(&mut self.board)?;
        Some(self.push(transition))
    }

    /// Advance time by `dt`: step animations, then run deferred cleanup.
    pub fn step(&mut self, dt: Duration) -> Option<DragTransition> {
        let now = self.clock.advance(dt);
        self.controller.animator_mut().advance(dt);
        let transition = self.controller.tick(now)?;
        Some(self.push(transition))
    }

    /// Advance by at least `total`, one frame at a time.
    pub fn wait(&mut self, total: Duration) {
        let mut waited = Duration::ZERO;
        while waited < total {
            self.step(self.frame);
            waited += self.frame;
        }
    }

    /// Run frames until the controller is Idle and no card carries an
    /// offset. Returns whether that state was reached.
    pub fn settle(&mut self) -> bool {
        for _ in 0..SETTLE_LIMIT {
            if self.is_settled() {
                return true;
            }
            self.step(self.frame);
        }
        self.is_settled()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.controller.phase() == DragPhase::Idle && self.controller.animator().is_idle()
    }

    /// Center of the item containing `id`, in layout coordinates.
    #[must_use]
    pub fn center_of(&self, id: u64) -> Point {
        self.board.rect(id).map_or(Point::ORIGIN, |r| r.center())
    }

    /// Current animation offset of `id`.
    #[must_use]
    pub fn offset(&self, id: u64) -> Offset {
        self.controller.animator().offset(CardId(id))
    }

    /// Where `id` is drawn: layout bounds plus its offset.
    #[must_use]
    pub fn visual_rect(&self, id: u64) -> Option<Rect> {
        self.board
            .rect(id)
            .map(|r| r.translate(self.offset(id)))
    }

    pub fn transitions(&self) -> impl Iterator<Item = &DragTransition> {
        self.log.iter().map(|(_, t)| t)
    }

    #[must_use]
    pub fn effects(&self) -> Vec<&DragEffect> {
        self.transitions().map(|t| &t.effect).collect()
    }

    /// Number of transitions whose effect matches.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&DragEffect) -> bool) -> usize {
        self.transitions().filter(|t| predicate(&t.effect)).count()
    }

    #[must_use]
    pub fn last(&self) -> Option<&DragTransition> {
        self.log.last().map(|(_, t)| t)
    }

    /// One JSON object per transition, newline separated.
    #[must_use]
    pub fn transcript_jsonl(&self) -> String {
        let mut out = String::new();
        for (at, transition) in &self.log {
            let line = json!({
                "t_ms": at.as_millis() as u64,
                "id": transition.transition_id,
                "from": transition.from,
                "to": transition.to,
                "effect": format!("{:?}", transition.effect),
            });
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }

    fn push(&mut self, transition: DragTransition) -> DragTransition {
        self.log.push((self.clock.elapsed(), transition.clone()));
        transition
    }
}
