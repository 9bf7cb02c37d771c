//! End-to-end reorder gestures against an in-memory board.

use std::time::Duration;

use cardshift_core::event::{HitTarget, Modifiers, PointerButton, PointerEvent, RegionId};
use cardshift_core::geometry::{Offset, Point, Sides};
use cardshift_drag::{
    CancelReason, CardId, DragConfig, DragEffect, DragMode, DragPhase, NoopReason, RejectReason,
};
use cardshift_harness::{Board, BoardItem, DragRig, Flow, HostCall};

/// Five 100px cards, 8px above and below each: centers at 58, 174, 290, 406, 522.
fn five_stack() -> Board {
    Board::stack(300.0, 5, 100.0).with_margin(Sides::vertical(8.0))
}

/// Press card 3 (index 2) and drag it until it is the first card.
fn drag_third_to_top(rig: &mut DragRig) {
    rig.press_on(3);
    let started = rig.move_by(0.0, -10.0);
    assert!(matches!(started.effect, DragEffect::DragStarted { origin_index: 2, .. }));
    let swapped = rig.move_to(Point::new(150.0, 40.0));
    assert_eq!(
        swapped.effect,
        DragEffect::Swapped {
            from: 2,
            to: 0,
            displaced: 2
        }
    );
}

#[test]
fn dragging_up_two_places_displaces_exactly_two_neighbors() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);

    assert_eq!(rig.board().order(), vec![3, 1, 2, 4, 5]);
    // Displaced cards start where they were drawn, one outer height above
    // their new slot.
    assert_eq!(rig.offset(1), Offset::new(0.0, -116.0));
    assert_eq!(rig.offset(2), Offset::new(0.0, -116.0));
    assert_eq!(rig.offset(4), Offset::ZERO);
    assert_eq!(rig.offset(5), Offset::ZERO);
    assert_eq!(rig.visual_rect(1).map(|r| r.y), Some(8.0));
    assert_eq!(rig.visual_rect(2).map(|r| r.y), Some(124.0));
    assert_eq!(
        rig.board().count(|c| matches!(c, HostCall::MoveItem { .. })),
        1
    );
}

#[test]
fn drop_commits_and_saves_once() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);

    let released = rig.release();
    assert_eq!(
        released.effect,
        DragEffect::ReorderCompleted {
            from: 2,
            to: 0,
            saved: true
        }
    );
    assert_eq!(released.to, DragPhase::Finishing);
    assert!(!rig.board().is_captured());

    assert!(rig.settle());
    assert_eq!(rig.board().order(), vec![3, 1, 2, 4, 5]);
    assert_eq!(rig.board().saves(), 1);
    assert_eq!(rig.count(|e| *e == DragEffect::Settled), 1);
    for id in 1..=5 {
        assert_eq!(rig.offset(id), Offset::ZERO, "card {id} kept an offset");
    }
}

#[test]
fn drop_without_index_change_does_not_save() {
    let mut rig = DragRig::new(five_stack());
    rig.press_on(3);
    rig.move_by(0.0, 20.0);
    rig.move_by(0.0, 20.0);
    let released = rig.release();
    assert_eq!(
        released.effect,
        DragEffect::ReorderCompleted {
            from: 2,
            to: 2,
            saved: false
        }
    );
    assert!(rig.settle());
    assert_eq!(rig.board().saves(), 0);
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn rapid_straddle_inside_cooldown_swaps_once() {
    let mut rig = DragRig::new(five_stack());
    rig.press_on(3);
    rig.move_by(0.0, -10.0);
    rig.move_to(Point::new(150.0, 420.0));
    assert_eq!(rig.board().order(), vec![1, 2, 4, 3, 5]);

    for i in 0..6 {
        let y = if i % 2 == 0 { 380.0 } else { 420.0 };
        rig.move_to(Point::new(150.0, y));
    }
    assert_eq!(rig.count(|e| matches!(e, DragEffect::Swapped { .. })), 1);
    assert_eq!(rig.board().order(), vec![1, 2, 4, 3, 5]);

    // Past the cooldown, hovering just above the old boundary still does
    // not swap back: card 4 now sits at center 290.
    rig.wait(Duration::from_millis(200));
    rig.move_to(Point::new(150.0, 380.0));
    assert_eq!(rig.count(|e| matches!(e, DragEffect::Swapped { .. })), 1);
    assert_eq!(rig.controller().session().map(|s| s.current_index), Some(3));
}

#[test]
fn escape_restores_order_and_clears_offsets() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);

    let canceled = rig.escape();
    assert_eq!(canceled.effect, DragEffect::Canceled(CancelReason::Escape));
    assert_eq!(canceled.to, DragPhase::Finishing);
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
    assert!(
        rig.board()
            .calls()
            .contains(&HostCall::MoveItem { card: CardId(3), index: 2 })
    );
    assert_eq!(rig.offset(1), Offset::ZERO);
    assert_eq!(rig.offset(2), Offset::ZERO);
    assert!(!rig.board().is_captured());

    assert!(rig.settle());
    assert_eq!(rig.offset(3), Offset::ZERO);
    assert_eq!(rig.board().saves(), 0);
    assert_eq!(
        rig.release().effect,
        DragEffect::Noop(NoopReason::IdleWithoutSession)
    );
}

#[test]
fn threshold_is_euclidean_and_exclusive() {
    let mut rig = DragRig::new(five_stack());
    assert_eq!(rig.press_on(1).effect, DragEffect::Armed { card: CardId(1) });
    let small = rig.move_by(2.0, 2.0);
    assert_eq!(small.effect, DragEffect::Noop(NoopReason::ThresholdNotReached));
    assert_eq!(small.to, DragPhase::Pending);
    assert!(!rig.board().is_captured());

    let started = rig.move_by(1.0, 1.0);
    assert_eq!(
        started.effect,
        DragEffect::DragStarted {
            card: CardId(1),
            origin_index: 0,
            mode: DragMode::Reorder
        }
    );
    assert!(rig.board().is_captured());
}

#[test]
fn click_without_travel_is_not_a_drag() {
    let mut rig = DragRig::new(five_stack());
    rig.press_on(2);
    let released = rig.release();
    assert_eq!(released.effect, DragEffect::Noop(NoopReason::ThresholdNotReached));
    assert_eq!(released.to, DragPhase::Idle);
    assert!(rig.board().calls().is_empty());
}

#[test]
fn dragged_visual_tracks_grab_point_and_stays_inside_horizontally() {
    let mut rig = DragRig::new(Board::grid(600.0, 3, 6, 100.0));
    // Card 2 spans x 200..400; grab it 50px in from its left edge.
    rig.press_at(Point::new(250.0, 50.0), HitTarget::card(CardId(2)));
    rig.move_to(Point::new(260.0, 60.0));
    assert_eq!(rig.visual_rect(2).map(|r| (r.x, r.y)), Some((210.0, 10.0)));

    rig.move_to(Point::new(900.0, 60.0));
    let visual = rig.visual_rect(2).unwrap();
    assert_eq!(visual.right(), 600.0);

    rig.move_to(Point::new(-400.0, -300.0));
    let visual = rig.visual_rect(2).unwrap();
    assert_eq!((visual.x, visual.y), (0.0, 0.0));
}

#[test]
fn dragging_past_the_bottom_reaches_the_tail() {
    let mut rig = DragRig::new(five_stack());
    rig.press_on(1);
    rig.move_by(0.0, 10.0);
    rig.move_to(Point::new(150.0, 900.0));
    assert_eq!(rig.board().order(), vec![2, 3, 4, 5, 1]);
    let visual = rig.visual_rect(1).unwrap();
    assert_eq!(visual.center().y, 900.0);
}

/// Three columns of 200px, rows of 100px: slot `s` is centered at
/// `(s % 3 * 200 + 100, s / 3 * 100 + 50)`.
fn six_grid() -> Board {
    Board::grid(600.0, 3, 6, 100.0)
}

fn slot_center(slot: usize) -> Point {
    Point::new((slot % 3) as f64 * 200.0 + 100.0, (slot / 3) as f64 * 100.0 + 50.0)
}

#[test]
fn grid_drag_takes_the_hovered_slot() {
    let mut rig = DragRig::new(six_grid());
    // Card 1 sits at slot 0; slot 4 (row 1, column 1) is held by card 5.
    rig.press_on(1);
    rig.move_by(10.0, 0.0);
    let moved = rig.move_to(slot_center(4));
    assert_eq!(
        moved.effect,
        DragEffect::Swapped {
            from: 0,
            to: 4,
            displaced: 4
        }
    );
    assert_eq!(rig.board().order(), vec![2, 3, 4, 5, 1, 6]);
    // Card 4 wrapped from row 1 back to the end of row 0; card 5 slid left.
    assert_eq!(rig.offset(4), Offset::new(-400.0, 100.0));
    assert_eq!(rig.offset(5), Offset::new(200.0, 0.0));
    assert_eq!(rig.offset(6), Offset::ZERO);

    rig.release();
    assert!(rig.settle());
    assert_eq!(rig.board().saves(), 1);
    assert_eq!(rig.board().rect(1).map(|r| r.center()), Some(slot_center(4)));
}

#[test]
fn grid_drag_forward_by_one_slot() {
    let mut rig = DragRig::new(six_grid());
    rig.press_on(1);
    rig.move_by(10.0, 0.0);
    rig.move_to(slot_center(1));
    assert_eq!(rig.board().order(), vec![2, 1, 3, 4, 5, 6]);
    assert_eq!(rig.offset(2), Offset::new(200.0, 0.0));

    // Hovering on keeps the card where it is.
    for _ in 0..20 {
        rig.move_to(slot_center(1));
    }
    assert_eq!(rig.count(|e| matches!(e, DragEffect::Swapped { .. })), 1);
    assert_eq!(rig.board().order(), vec![2, 1, 3, 4, 5, 6]);
}

#[test]
fn grid_drag_backward_by_one_slot() {
    let mut rig = DragRig::new(six_grid());
    rig.press_on(5);
    rig.move_by(-10.0, 0.0);
    rig.move_to(slot_center(3));
    assert_eq!(rig.board().order(), vec![1, 2, 3, 5, 4, 6]);
    assert_eq!(rig.offset(4), Offset::new(-200.0, 0.0));

    for _ in 0..20 {
        rig.move_to(slot_center(3));
    }
    assert_eq!(rig.count(|e| matches!(e, DragEffect::Swapped { .. })), 1);
    assert_eq!(rig.board().order(), vec![1, 2, 3, 5, 4, 6]);
}

#[test]
fn grid_drop_on_last_slot_lands_there() {
    let mut rig = DragRig::new(six_grid());
    rig.press_on(1);
    rig.move_by(10.0, 0.0);
    let moved = rig.move_to(slot_center(5));
    assert_eq!(
        moved.effect,
        DragEffect::Swapped {
            from: 0,
            to: 5,
            displaced: 5
        }
    );
    let released = rig.release();
    assert_eq!(
        released.effect,
        DragEffect::ReorderCompleted {
            from: 0,
            to: 5,
            saved: true
        }
    );
    assert!(rig.settle());
    assert_eq!(rig.board().order(), vec![2, 3, 4, 5, 6, 1]);
    assert_eq!(rig.board().rect(1).map(|r| r.center()), Some(slot_center(5)));
}

#[test]
fn wide_card_keeps_its_own_row_while_dragging() {
    let board = Board::new(600.0, Flow::Grid { columns: 2 }).with_items([
        BoardItem::new(1, 100.0),
        BoardItem::new(2, 100.0),
        BoardItem::new(3, 100.0).wide(),
        BoardItem::new(4, 100.0),
    ]);
    let mut rig = DragRig::new(board);
    rig.press_on(3);
    rig.move_by(0.0, -10.0);
    rig.move_to(Point::new(300.0, 40.0));
    assert_eq!(rig.board().order(), vec![3, 1, 2, 4]);
    assert_eq!(rig.board().rect(3).map(|r| (r.x, r.width)), Some((0.0, 600.0)));
    assert_eq!(rig.board().rect(1).map(|r| r.y), Some(100.0));
}

#[test]
fn reorder_disabled_snaps_back_without_mutation() {
    let config = DragConfig::default().reorder_enabled(false);
    let mut rig = DragRig::with_config(config, five_stack());
    rig.press_on(3);
    rig.move_by(0.0, -10.0);
    rig.move_to(Point::new(150.0, 40.0));
    assert_eq!(rig.count(|e| matches!(e, DragEffect::Swapped { .. })), 0);

    let released = rig.release();
    assert_eq!(
        released.effect,
        DragEffect::Canceled(CancelReason::ReorderDisabled)
    );
    assert!(rig.settle());
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        rig.board().count(|c| matches!(c, HostCall::MoveItem { .. } | HostCall::Save)),
        0
    );
}

#[test]
fn press_during_drag_discards_the_stale_session() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);

    let pressed = rig.press_on(5);
    assert_eq!(pressed.from, DragPhase::Dragging);
    assert_eq!(pressed.to, DragPhase::Pending);
    assert_eq!(pressed.effect, DragEffect::Canceled(CancelReason::StaleSession));
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
    assert_eq!(rig.controller().pending().map(|p| p.card), Some(CardId(5)));
}

#[test]
fn press_while_finishing_starts_fresh() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);
    rig.release();

    let pressed = rig.press_on(1);
    assert_eq!(pressed.from, DragPhase::Finishing);
    assert_eq!(pressed.effect, DragEffect::Canceled(CancelReason::StaleSession));
    // The committed order survives; only transient state is dropped.
    assert_eq!(rig.board().order(), vec![3, 1, 2, 4, 5]);
    assert!(rig.controller().animator().is_idle());
}

#[test]
fn capture_loss_cancels_without_releasing_capture() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);

    let lost = rig.lose_capture();
    assert_eq!(lost.effect, DragEffect::Canceled(CancelReason::CaptureLost));
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        rig.board()
            .count(|c| matches!(c, HostCall::ReleasePointerCapture)),
        0
    );
    assert!(!rig.board().is_captured());
    assert!(rig.settle());
}

#[test]
fn focus_loss_cancels_pending_press() {
    let mut rig = DragRig::new(five_stack());
    rig.press_on(2);
    let lost = rig.send(cardshift_core::event::DragInput::FocusLost);
    assert_eq!(lost.effect, DragEffect::Canceled(CancelReason::FocusLost));
    assert_eq!(lost.to, DragPhase::Idle);
}

#[test]
fn force_cancel_ends_any_gesture() {
    let mut rig = DragRig::new(five_stack());
    assert!(rig.force_cancel().is_none());

    drag_third_to_top(&mut rig);
    let canceled = rig.force_cancel().unwrap();
    assert_eq!(canceled.effect, DragEffect::Canceled(CancelReason::Programmatic));
    assert_eq!(rig.board().order(), vec![1, 2, 3, 4, 5]);
    assert_eq!(rig.phase(), DragPhase::Idle);
    assert!(rig.controller().animator().is_idle());
}

#[test]
fn presses_that_are_not_card_drags_are_rejected() {
    let editor = RegionId(7);
    let handle = RegionId(8);
    let board = five_stack()
        .with_item(BoardItem::new(9, 100.0).hidden())
        .with_editable_region(editor)
        .with_drag_handle(handle);
    let mut rig = DragRig::new(board);

    let cases = [
        (
            rig.press_at(Point::new(10.0, 10.0), HitTarget::NONE),
            RejectReason::NoCard,
        ),
        (rig.press_region(1, editor, Modifiers::NONE), RejectReason::EditableRegion),
        (rig.press_region(1, handle, Modifiers::NONE), RejectReason::DragHandle),
        (
            rig.press_at(Point::new(10.0, 10.0), HitTarget::card(CardId(99))),
            RejectReason::UnknownCard,
        ),
        (
            rig.press_at(Point::new(10.0, 10.0), HitTarget::card(CardId(9))),
            RejectReason::UnknownCard,
        ),
    ];
    for (transition, reason) in cases {
        assert_eq!(transition.effect, DragEffect::Rejected(reason));
        assert_eq!(transition.to, DragPhase::Idle);
    }

    // A link modifier overrides a nested drag handle.
    let armed = rig.press_region(1, handle, Modifiers::CTRL);
    assert_eq!(armed.effect, DragEffect::Armed { card: CardId(1) });
}

#[test]
fn secondary_button_is_ignored() {
    let mut rig = DragRig::new(five_stack());
    let at = rig.center_of(1);
    let pressed = rig.send(
        PointerEvent::press(at, HitTarget::card(CardId(1))).with_button(PointerButton::Secondary),
    );
    assert_eq!(pressed.effect, DragEffect::Noop(NoopReason::ForeignButton));
    assert_eq!(rig.phase(), DragPhase::Idle);
}

#[test]
fn group_moves_as_one_unit() {
    let board = Board::new(300.0, Flow::Stack)
        .with_margin(Sides::vertical(8.0))
        .with_items([
            BoardItem::new(1, 100.0),
            BoardItem::new(2, 100.0),
            BoardItem::new(0, 100.0).group(&[30, 31]),
        ]);
    let mut rig = DragRig::new(board);
    // Press on a member; the whole group is dragged.
    let armed = rig.press_on(31);
    assert_eq!(armed.effect, DragEffect::Armed { card: CardId(30) });
    rig.move_by(0.0, -10.0);
    rig.move_to(Point::new(150.0, 40.0));
    rig.release();
    assert!(rig.settle());
    assert_eq!(rig.board().order(), vec![30, 1, 2]);
}

#[test]
fn throttled_samples_still_move_the_visual() {
    let mut rig = DragRig::new(five_stack()).with_frame(Duration::from_millis(4));
    rig.press_on(3);
    rig.move_by(0.0, -10.0);
    rig.move_by(0.0, -5.0);
    let throttled = rig.move_by(0.0, -5.0);
    assert_eq!(throttled.effect, DragEffect::Noop(NoopReason::Throttled));
    assert_eq!(rig.offset(3), Offset::new(0.0, -20.0));
}

#[test]
fn transcript_is_one_json_object_per_transition() {
    let mut rig = DragRig::new(five_stack());
    drag_third_to_top(&mut rig);
    rig.release();
    rig.settle();

    let transcript = rig.transcript_jsonl();
    let lines: Vec<&str> = transcript.lines().collect();
    assert_eq!(lines.len(), rig.transitions().count());
    let last: serde_json::Value = serde_json::from_str(lines[lines.len() - 1]).unwrap();
    assert_eq!(last["from"], "finishing");
    assert_eq!(last["to"], "idle");
    assert_eq!(last["effect"], "Settled");
}
