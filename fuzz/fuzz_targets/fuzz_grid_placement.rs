#![no_main]

use cardshift_core::event::CardId;
use cardshift_core::geometry::Rect;
use cardshift_layout::{GridPlacementSolver, LayoutConfig, calculate_insertion_index};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (f64, Option<f64>, Vec<(f64, f64, f64, f64)>, (f64, f64))| {
    let (width, locked, raw, hover) = input;
    let cards: Vec<(CardId, Rect)> = raw
        .into_iter()
        .take(64)
        .enumerate()
        .map(|(i, (x, y, w, h))| (CardId(i as u64), Rect::new(x, y, w, h)))
        .collect();
    let solver = GridPlacementSolver::new(LayoutConfig::default());
    let layout = solver.compute_layout(&cards, width, locked);

    assert!(layout.columns >= 1);
    assert!(layout.columns <= cards.len().max(1));
    assert_eq!(layout.placements.len(), cards.len());
    for (index, placement) in layout.placements.iter().enumerate() {
        if placement.span > 1 {
            assert_eq!(placement.start_slot % layout.columns, 0);
        }
        assert!(placement.column + placement.span <= layout.columns);
        for slot in placement.start_slot..placement.end_slot() {
            assert_eq!(layout.card_at_slot(slot), Some(index));
        }
    }
    assert_eq!(layout, solver.compute_layout(&cards, width, locked));

    let dragged = Rect::new(hover.0, hover.1, 50.0, 50.0);
    let index = calculate_insertion_index(dragged, &cards, &[], Some(&layout));
    assert!(index <= cards.len());
});
