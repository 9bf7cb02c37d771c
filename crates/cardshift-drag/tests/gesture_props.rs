//! Property tests over random gestures.

use cardshift_core::geometry::{Offset, Point, Sides};
use cardshift_harness::{Board, DragRig};
use proptest::prelude::*;

fn board(count: u64, grid: bool) -> Board {
    let board = if grid {
        Board::grid(600.0, 3, count, 80.0)
    } else {
        Board::stack(300.0, count, 60.0)
    };
    board.with_margin(Sides::vertical(4.0))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_gesture_settles_into_a_permutation(
        count in 2u64..8,
        pick in 0u64..8,
        grid in any::<bool>(),
        path in prop::collection::vec((-250.0f64..250.0, -250.0f64..250.0), 1..16),
        cancel in any::<bool>(),
    ) {
        let original: Vec<u64> = (1..=count).collect();
        let mut rig = DragRig::new(board(count, grid));
        rig.press_on(pick % count + 1);
        for (dx, dy) in path {
            rig.move_by(dx, dy);
        }
        if cancel {
            rig.escape();
            prop_assert_eq!(rig.board().order(), original.clone());
        } else {
            rig.release();
        }
        prop_assert!(rig.settle());

        let mut sorted = rig.board().order();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, original);
        for id in 1..=count {
            prop_assert_eq!(rig.offset(id), Offset::ZERO);
        }
        prop_assert!(!rig.board().is_captured());
    }

    #[test]
    fn grid_drop_lands_on_the_hovered_slot(
        pick in 1u64..=6,
        slot in 0usize..6,
        hover in 1usize..12,
    ) {
        // Three 200px columns, 100px rows.
        let mut rig = DragRig::new(Board::grid(600.0, 3, 6, 100.0));
        let target = Point::new(
            (slot % 3) as f64 * 200.0 + 100.0,
            (slot / 3) as f64 * 100.0 + 50.0,
        );
        rig.press_on(pick);
        rig.move_by(0.0, 6.0);
        for _ in 0..hover {
            rig.move_to(target);
        }
        rig.release();
        prop_assert!(rig.settle());

        let order = rig.board().order();
        prop_assert_eq!(order[slot], pick);
        let center = rig.board().rect(pick).map(|r| r.center());
        prop_assert_eq!(center, Some(target));
    }

    #[test]
    fn transition_ids_are_sequential(
        path in prop::collection::vec((-120.0f64..120.0, -120.0f64..120.0), 1..12),
    ) {
        let mut rig = DragRig::new(board(5, false));
        rig.press_on(3);
        for (dx, dy) in path {
            rig.move_by(dx, dy);
        }
        rig.release();
        rig.settle();
        let ids: Vec<u64> = rig.transitions().map(|t| t.transition_id).collect();
        let expected: Vec<u64> = (1..=ids.len() as u64).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn at_most_one_swap_per_cooldown(
        path in prop::collection::vec((-40.0f64..40.0, -200.0f64..200.0), 1..24),
    ) {
        let mut rig = DragRig::new(board(6, false));
        rig.press_on(3);
        rig.move_by(0.0, 10.0);
        for (dx, dy) in path {
            rig.move_by(dx, dy);
        }
        let swaps = rig.count(|e| matches!(e, cardshift_drag::DragEffect::Swapped { .. }));
        // Moves are one 16 ms frame apart; the cooldown is 120 ms.
        let moves = rig.transitions().count() as u64;
        prop_assert!(swaps as u64 <= moves / 7 + 1);
    }
}
