#![forbid(unsafe_code)]

//! Where a dragged card would drop.
//!
//! Results are *gap* indices into the full card sequence: `i` means "before
//! the card currently at `i`", and `cards.len()` means append. Excluded cards
//! (the dragged card or group) keep their positions in the sequence but are
//! never chosen as the card to insert before; hovering over them yields the
//! gap right after, which [`move_target`] turns into a no-op. Use [`move_target`] to turn a
//! gap into the index a single-position move should land on.
//!
//! All inputs must be untransformed layout geometry. Feeding animated
//! positions makes the answer chase its own animation.

use cardshift_core::event::CardId;
use cardshift_core::geometry::Rect;

use crate::LayoutItem;
use crate::grid::GridLayout;

/// Gap for a dragged rectangle, choosing linear or grid math from `layout`.
///
/// Without a layout, or with a single-column one, the linear rule applies.
#[must_use]
pub fn calculate_insertion_index<T: LayoutItem>(
    dragged: Rect,
    cards: &[T],
    excluding: &[CardId],
    layout: Option<&GridLayout>,
) -> usize {
    match layout {
        Some(layout) if !layout.is_stack() => {
            let span = dragged_span(cards, excluding, layout);
            grid_insertion_index(dragged, span, cards, excluding, layout)
        }
        _ => linear_insertion_index(dragged.center().y, cards, excluding),
    }
}

/// Gap before the first non-excluded card whose vertical midpoint is at or
/// below `center_y`.
///
/// A midpoint exactly level with the dragged center has not been passed yet,
/// so ties resolve to the lower index.
#[must_use]
pub fn linear_insertion_index<T: LayoutItem>(
    center_y: f64,
    cards: &[T],
    excluding: &[CardId],
) -> usize {
    cards
        .iter()
        .enumerate()
        .filter(|(_, card)| !excluding.contains(&card.id()))
        .find(|(_, card)| card.rect().center().y >= center_y)
        .map_or(cards.len(), |(index, _)| index)
}

/// Gap chosen by nearest slot center.
///
/// Candidates are slots `0..=total_slots`, restricted to row starts when
/// `span > 1`. The first candidate at minimum squared distance wins.
///
/// A winning slot held by another card means "take its place": the gap is
/// before that card when it precedes the dragged one and after it when it
/// follows, so [`move_target`] lands the dragged card on that slot in both
/// directions. A winning slot left empty (the tail of a row closed by a
/// full-row card) is the gap before the next card. Past the last card is an
/// append. The dragged card's own slot yields the gap right after it, which
/// is a no-op move.
#[must_use]
pub fn grid_insertion_index<T: LayoutItem>(
    dragged: Rect,
    span: usize,
    cards: &[T],
    excluding: &[CardId],
    layout: &GridLayout,
) -> usize {
    let columns = layout.columns.max(1);
    let center = dragged.center();

    let mut best: Option<(usize, f64)> = None;
    for slot in 0..=layout.total_slots {
        if span > 1 && slot % columns != 0 {
            continue;
        }
        let distance = layout.slot_center(slot, span).distance_squared(center);
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((slot, distance)),
        }
    }
    let Some((winner, _)) = best else {
        return cards.len();
    };

    let Some((index, covers)) = layout
        .placements
        .iter()
        .take(cards.len())
        .enumerate()
        .find(|(_, p)| p.end_slot() > winner)
        .map(|(index, p)| (index, p.start_slot <= winner))
    else {
        return cards.len();
    };
    let origin = cards.iter().position(|card| excluding.contains(&card.id()));
    match origin {
        Some(origin) if index == origin => origin + 1,
        Some(origin) if covers && index > origin => index + 1,
        _ => index,
    }
}

/// Index a single-position move should use to realize `insertion` for an
/// item currently at `origin`.
///
/// Removing the item shifts every later gap down by one.
#[inline]
#[must_use]
pub const fn move_target(insertion: usize, origin: usize) -> usize {
    if insertion > origin {
        insertion - 1
    } else {
        insertion
    }
}

fn dragged_span<T: LayoutItem>(cards: &[T], excluding: &[CardId], layout: &GridLayout) -> usize {
    cards
        .iter()
        .position(|card| excluding.contains(&card.id()))
        .map_or(1, |index| layout.span_of(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPlacementSolver;

    fn column(count: usize, height: f64) -> Vec<(CardId, Rect)> {
        (0..count)
            .map(|i| {
                (
                    CardId(i as u64),
                    Rect::new(0.0, i as f64 * height, 300.0, height),
                )
            })
            .collect()
    }

    fn dragged_at(center_y: f64) -> Rect {
        Rect::new(0.0, center_y - 50.0, 300.0, 100.0)
    }

    #[test]
    fn level_midpoint_is_not_yet_passed() {
        let cards = column(5, 100.0);
        let idx = calculate_insertion_index(dragged_at(350.0), &cards, &[CardId(0)], None);
        assert_eq!(idx, 3);
    }

    #[test]
    fn past_midpoint_moves_to_next_gap() {
        let cards = column(5, 100.0);
        let idx = calculate_insertion_index(dragged_at(350.5), &cards, &[CardId(0)], None);
        assert_eq!(idx, 4);
    }

    #[test]
    fn beyond_last_card_appends() {
        let cards = column(5, 100.0);
        assert_eq!(linear_insertion_index(900.0, &cards, &[CardId(0)]), 5);
    }

    #[test]
    fn excluded_card_is_never_the_anchor() {
        let cards = column(3, 100.0);
        // Card 1 would match first, but it is the one being dragged.
        assert_eq!(linear_insertion_index(120.0, &cards, &[CardId(1)]), 2);
    }

    #[test]
    fn stack_layout_uses_linear_rule() {
        let cards = column(4, 100.0);
        let layout = GridPlacementSolver::default().compute_layout(&cards, 300.0, None);
        assert!(layout.is_stack());
        let with = calculate_insertion_index(dragged_at(160.0), &cards, &[CardId(3)], Some(&layout));
        let without = calculate_insertion_index(dragged_at(160.0), &cards, &[CardId(3)], None);
        assert_eq!(with, without);
        assert_eq!(with, 2);
    }

    fn two_by_two() -> (Vec<(CardId, Rect)>, GridLayout) {
        let cards = vec![
            (CardId(0), Rect::new(0.0, 0.0, 280.0, 100.0)),
            (CardId(1), Rect::new(300.0, 0.0, 280.0, 100.0)),
            (CardId(2), Rect::new(0.0, 100.0, 280.0, 100.0)),
            (CardId(3), Rect::new(300.0, 100.0, 280.0, 100.0)),
        ];
        let layout = GridPlacementSolver::default().compute_layout(&cards, 600.0, None);
        (cards, layout)
    }

    #[test]
    fn grid_picks_nearest_slot() {
        let (cards, layout) = two_by_two();
        assert_eq!(layout.columns, 2);
        // Card 0 hovering over the bottom-right slot.
        let dragged = Rect::new(300.0, 110.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(0)], Some(&layout));
        assert_eq!(idx, 4);
        assert_eq!(move_target(idx, 0), 3);
    }

    #[test]
    fn grid_next_slot_takes_the_neighbors_place() {
        let (cards, layout) = two_by_two();
        // Card 0 centered over card 1 at slot 1.
        let dragged = Rect::new(300.0, 0.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(0)], Some(&layout));
        assert_eq!(move_target(idx, 0), 1);
        // And back: card 1 centered over slot 0.
        let dragged = Rect::new(0.0, 0.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(1)], Some(&layout));
        assert_eq!(move_target(idx, 1), 0);
    }

    #[test]
    fn grid_own_slot_is_a_no_op() {
        let (cards, layout) = two_by_two();
        let dragged = Rect::new(5.0, 105.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(2)], Some(&layout));
        assert_eq!(idx, 3);
        assert_eq!(move_target(idx, 2), 2);
    }

    #[test]
    fn grid_empty_slot_before_wide_card_is_the_gap_before_it() {
        let cards = vec![
            (CardId(0), Rect::new(0.0, 0.0, 280.0, 100.0)),
            (CardId(1), Rect::new(0.0, 100.0, 580.0, 100.0)),
            (CardId(2), Rect::new(0.0, 200.0, 280.0, 100.0)),
            (CardId(3), Rect::new(300.0, 200.0, 280.0, 100.0)),
        ];
        let layout = GridPlacementSolver::default().compute_layout(&cards, 600.0, None);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.card_at_slot(1), None);
        // Card 3 hovering the empty tail of row 0.
        let dragged = Rect::new(300.0, 0.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(3)], Some(&layout));
        assert_eq!(idx, 1);
        assert_eq!(move_target(idx, 3), 1);
    }

    #[test]
    fn grid_past_last_slot_appends() {
        let (cards, layout) = two_by_two();
        // Slot 4 is row 2, column 0; its center sits at (150, 250).
        let dragged = Rect::new(10.0, 210.0, 280.0, 100.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(1)], Some(&layout));
        assert_eq!(idx, 4);
        assert_eq!(move_target(idx, 1), 3);
    }

    #[test]
    fn wide_card_only_targets_row_starts() {
        let cards = vec![
            (CardId(0), Rect::new(0.0, 0.0, 280.0, 100.0)),
            (CardId(1), Rect::new(300.0, 0.0, 280.0, 100.0)),
            (CardId(2), Rect::new(0.0, 100.0, 280.0, 100.0)),
            (CardId(3), Rect::new(300.0, 100.0, 280.0, 100.0)),
            (CardId(9), Rect::new(0.0, 200.0, 560.0, 80.0)),
        ];
        let layout = GridPlacementSolver::default().compute_layout(&cards, 600.0, None);
        assert_eq!(layout.placements[4].span, 2);
        // Centered over card 1: the nearest row start is slot 0.
        let dragged = Rect::new(200.0, 10.0, 560.0, 80.0);
        let idx = calculate_insertion_index(dragged, &cards, &[CardId(9)], Some(&layout));
        assert_eq!(idx, 0);
    }

    #[test]
    fn move_target_accounts_for_removal() {
        assert_eq!(move_target(3, 0), 2);
        assert_eq!(move_target(0, 2), 0);
        assert_eq!(move_target(2, 2), 2);
        assert_eq!(move_target(3, 2), 2);
    }

    #[test]
    fn empty_input_appends() {
        let cards: Vec<(CardId, Rect)> = Vec::new();
        assert_eq!(linear_insertion_index(10.0, &cards, &[]), 0);
    }
}
