#![forbid(unsafe_code)]

//! Slot-based grid placement.
//!
//! The container is modeled as a row-major grid of equal-width columns.
//! Every card occupies one slot, except full-row cards which occupy every
//! column of their row. Slots are numbered `row * columns + column`.
//!
//! # Column detection
//!
//! 1. Cluster the measured left edges of single-width cards (within
//!    `column_tolerance`). Two or more clusters give the column stride as the
//!    average gap between them.
//! 2. Otherwise, the stride is the average outer card width and the column
//!    count is `floor(width / stride)`.
//!
//! # Invariants
//!
//! 1. Same inputs, same [`GridLayout`] (no hidden state).
//! 2. A placement with `span > 1` always starts at column 0.
//! 3. `columns >= 1`, and every placement fits inside its row.
//! 4. `slot_to_card` maps every covered slot and nothing else.

use std::collections::BTreeMap;

use cardshift_core::geometry::{Point, Rect, Sides};
use serde::{Deserialize, Serialize};

use crate::{LayoutConfig, LayoutItem};

/// Where one card landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub span: usize,
    pub start_slot: usize,
}

impl Placement {
    /// One past the last covered slot.
    #[inline]
    #[must_use]
    pub const fn end_slot(&self) -> usize {
        self.start_slot + self.span
    }
}

/// Result of one placement pass. Derived data; recompute it after every
/// layout change rather than patching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Number of columns (at least 1).
    pub columns: usize,
    /// Column stride, margins included.
    pub column_width: f64,
    /// Top-left of the first slot, margins included.
    pub origin: Point,
    /// Height of each occupied row, margins included.
    pub row_heights: Vec<f64>,
    /// Slots consumed by the walk, including gaps left before full-row cards.
    pub total_slots: usize,
    /// Covered slot → index of the card covering it.
    pub slot_to_card: BTreeMap<usize, usize>,
    /// Per-card placement, parallel to the input order.
    pub placements: Vec<Placement>,
    /// Height used for rows past the last measured one.
    pub fallback_row_height: f64,
    /// Width the layout was computed against.
    pub width: f64,
}

impl GridLayout {
    /// Single-column layout: reordering is purely vertical.
    #[inline]
    #[must_use]
    pub fn is_stack(&self) -> bool {
        self.columns <= 1
    }

    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_heights.len()
    }

    /// Height of `row`, falling back past the measured rows.
    #[must_use]
    pub fn row_height(&self, row: usize) -> f64 {
        self.row_heights
            .get(row)
            .copied()
            .unwrap_or(self.fallback_row_height)
    }

    /// Distance from `origin.y` to the top of `row`.
    #[must_use]
    pub fn row_top(&self, row: usize) -> f64 {
        (0..row).map(|r| self.row_height(r)).sum()
    }

    /// Total height of all measured rows.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.row_heights.iter().sum()
    }

    #[must_use]
    pub fn placement(&self, card_index: usize) -> Option<&Placement> {
        self.placements.get(card_index)
    }

    /// Index of the card covering `slot`.
    #[must_use]
    pub fn card_at_slot(&self, slot: usize) -> Option<usize> {
        self.slot_to_card.get(&slot).copied()
    }

    /// Span of the card at `card_index` (1 when unknown).
    #[must_use]
    pub fn span_of(&self, card_index: usize) -> usize {
        self.placement(card_index).map_or(1, |p| p.span)
    }

    /// Center of an item of `span` columns starting at `slot`.
    #[must_use]
    pub fn slot_center(&self, slot: usize, span: usize) -> Point {
        let columns = self.columns.max(1);
        let row = slot / columns;
        let column = slot % columns;
        let span = span.clamp(1, columns - column);
        let x = self.origin.x + (column as f64 + span as f64 / 2.0) * self.column_width;
        let y = self.origin.y + self.row_top(row) + self.row_height(row) / 2.0;
        Point::new(x, y)
    }

    /// Outer rectangle of an item of `span` columns starting at `slot`.
    #[must_use]
    pub fn slot_rect(&self, slot: usize, span: usize) -> Rect {
        let columns = self.columns.max(1);
        let row = slot / columns;
        let column = slot % columns;
        let span = span.clamp(1, columns - column);
        Rect::new(
            self.origin.x + column as f64 * self.column_width,
            self.origin.y + self.row_top(row),
            span as f64 * self.column_width,
            self.row_height(row),
        )
    }
}

/// Computes [`GridLayout`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPlacementSolver {
    config: LayoutConfig,
}

impl GridPlacementSolver {
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place `cards` (in display order) into a grid `container_width` wide.
    ///
    /// `locked_width`, when positive, replaces the live width so a drag can
    /// freeze slot math while the container rewraps underneath it.
    #[must_use]
    pub fn compute_layout<T: LayoutItem>(
        &self,
        cards: &[T],
        container_width: f64,
        locked_width: Option<f64>,
    ) -> GridLayout {
        let width = locked_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(container_width);
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let margin = self.config.margin;
        let outer: Vec<Rect> = cards.iter().map(|c| c.rect().outer(margin)).collect();

        let wide_threshold = width * self.config.full_width_ratio;
        let is_wide =
            |r: &Rect| width > 0.0 && r.width.is_finite() && r.width - margin.horizontal_sum() >= wide_threshold;

        let singles: Vec<&Rect> = outer
            .iter()
            .filter(|r| !is_wide(r) && r.width.is_finite() && r.width > margin.horizontal_sum())
            .collect();

        let (columns, column_width) = self.estimate_columns(&singles, width, cards.len().max(1));

        let origin = Point::new(
            min_finite(outer.iter().map(|r| r.x)).unwrap_or(-margin.left),
            min_finite(outer.iter().map(|r| r.y)).unwrap_or(-margin.top),
        );

        let mut placements = Vec::with_capacity(cards.len());
        let mut slot_to_card = BTreeMap::new();
        let mut cursor = 0usize;
        for (index, rect) in outer.iter().enumerate() {
            let span = if columns > 1 && is_wide(rect) { columns } else { 1 };
            if span > 1 && cursor % columns != 0 {
                cursor = (cursor / columns + 1) * columns;
            }
            let start_slot = cursor;
            for slot in start_slot..start_slot + span {
                slot_to_card.insert(slot, index);
            }
            placements.push(Placement {
                row: start_slot / columns,
                column: start_slot % columns,
                span,
                start_slot,
            });
            cursor += span;
        }
        let total_slots = cursor;

        let (row_heights, fallback_row_height) =
            self.row_heights(&outer, &placements, total_slots, columns, margin);

        GridLayout {
            columns,
            column_width,
            origin,
            row_heights,
            total_slots,
            slot_to_card,
            placements,
            fallback_row_height,
            width,
        }
    }

    /// Column count and width. The walk never fills more columns than there
    /// are cards, so the count is capped at `limit`.
    fn estimate_columns(&self, singles: &[&Rect], width: f64, limit: usize) -> (usize, f64) {
        let tolerance = self.config.column_tolerance.max(0.0);
        let mut lefts: Vec<f64> = singles.iter().map(|r| r.x).filter(|x| x.is_finite()).collect();
        lefts.sort_by(f64::total_cmp);

        let mut clusters: Vec<f64> = Vec::new();
        for x in lefts {
            match clusters.last() {
                Some(&anchor) if x - anchor <= tolerance => {}
                _ => clusters.push(x),
            }
        }

        if clusters.len() >= 2 {
            let first = clusters[0];
            let last = clusters[clusters.len() - 1];
            let stride = (last - first) / (clusters.len() - 1) as f64;
            if stride > 0.0 {
                let fit = if width > 0.0 { (width / stride).floor() as usize } else { 0 };
                return (clusters.len().max(fit).clamp(1, limit), stride);
            }
        }

        let average = if singles.is_empty() {
            0.0
        } else {
            singles.iter().map(|r| r.width).sum::<f64>() / singles.len() as f64
        };
        if average > 0.0 && width > 0.0 {
            let columns = ((width / average).floor() as usize).clamp(1, limit);
            (columns, average)
        } else {
            (1, width.max(average))
        }
    }

    fn row_heights(
        &self,
        outer: &[Rect],
        placements: &[Placement],
        total_slots: usize,
        columns: usize,
        margin: Sides,
    ) -> (Vec<f64>, f64) {
        let rows = total_slots.div_ceil(columns);
        let mut heights = vec![0.0f64; rows];
        let mut positive_sum = 0.0;
        let mut positive_count = 0usize;
        for (rect, placement) in outer.iter().zip(placements) {
            let inner_height = rect.height - margin.vertical_sum();
            if inner_height > 0.0 && rect.height.is_finite() {
                heights[placement.row] = heights[placement.row].max(rect.height);
                positive_sum += rect.height;
                positive_count += 1;
            }
        }
        let fallback = if positive_count > 0 {
            positive_sum / positive_count as f64
        } else {
            self.config.default_row_height + margin.vertical_sum()
        };
        for height in &mut heights {
            if *height <= 0.0 {
                *height = fallback;
            }
        }
        (heights, fallback)
    }
}

fn min_finite(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| v.is_finite()).min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardshift_core::event::CardId;

    fn cards(rects: &[Rect]) -> Vec<(CardId, Rect)> {
        rects
            .iter()
            .enumerate()
            .map(|(i, r)| (CardId(i as u64), *r))
            .collect()
    }

    fn solver() -> GridPlacementSolver {
        GridPlacementSolver::default()
    }

    #[test]
    fn empty_input_is_a_single_empty_column() {
        let layout = solver().compute_layout::<(CardId, Rect)>(&[], 300.0, None);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.total_slots, 0);
        assert!(layout.row_heights.is_empty());
        assert!(layout.slot_to_card.is_empty());
        assert_eq!(layout.fallback_row_height, 40.0);
    }

    #[test]
    fn single_column_stack() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 300.0, 100.0),
            Rect::new(0.0, 100.0, 300.0, 100.0),
            Rect::new(0.0, 200.0, 300.0, 100.0),
        ]);
        let layout = solver().compute_layout(&input, 300.0, None);
        assert!(layout.is_stack());
        assert_eq!(layout.total_slots, 3);
        assert_eq!(layout.row_heights, vec![100.0; 3]);
        assert_eq!(layout.slot_center(1, 1), Point::new(150.0, 150.0));
    }

    #[test]
    fn columns_from_measured_left_edges() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 180.0, 50.0),
            Rect::new(200.0, 0.0, 180.0, 60.0),
            Rect::new(403.0, 0.0, 180.0, 50.0),
            Rect::new(2.0, 60.0, 180.0, 40.0),
        ]);
        let layout = solver().compute_layout(&input, 600.0, None);
        assert_eq!(layout.columns, 3);
        assert!((layout.column_width - 201.5).abs() < 1e-9);
        assert_eq!(layout.row_heights, vec![60.0, 40.0]);
        assert_eq!(layout.placements[3].row, 1);
        assert_eq!(layout.placements[3].column, 0);
    }

    #[test]
    fn columns_fallback_to_average_width() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 140.0, 50.0),
            Rect::new(0.0, 50.0, 140.0, 50.0),
            Rect::new(0.0, 100.0, 140.0, 50.0),
            Rect::new(0.0, 150.0, 140.0, 50.0),
            Rect::new(0.0, 200.0, 140.0, 50.0),
        ]);
        let layout = solver().compute_layout(&input, 600.0, None);
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.column_width, 140.0);
    }

    #[test]
    fn column_count_never_exceeds_card_count() {
        let sliver = cards(&[
            Rect::new(0.0, 0.0, 0.001, 50.0),
            Rect::new(0.0, 50.0, 0.001, 50.0),
            Rect::new(0.0, 100.0, 600.0, 50.0),
        ]);
        let layout = solver().compute_layout(&sliver, 600.0, None);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.placements[2].span, 3);
        assert_eq!(layout.slot_to_card.len(), 5);

        let lone = cards(&[Rect::new(0.0, 0.0, 140.0, 50.0)]);
        assert_eq!(solver().compute_layout(&lone, 600.0, None).columns, 1);
    }

    #[test]
    fn full_width_card_starts_a_new_row() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 280.0, 100.0),
            Rect::new(0.0, 110.0, 560.0, 80.0),
            Rect::new(300.0, 0.0, 280.0, 100.0),
        ]);
        let layout = solver().compute_layout(&input, 600.0, None);
        assert_eq!(layout.columns, 2);
        let wide = layout.placements[1];
        assert_eq!(wide.span, 2);
        assert_eq!(wide.start_slot, 2);
        assert_eq!(wide.column, 0);
        assert_eq!(layout.card_at_slot(1), None);
        assert_eq!(layout.card_at_slot(2), Some(1));
        assert_eq!(layout.card_at_slot(3), Some(1));
        assert_eq!(layout.placements[2].start_slot, 4);
        assert_eq!(layout.total_slots, 5);
    }

    #[test]
    fn locked_width_overrides_live_width() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 140.0, 50.0),
            Rect::new(150.0, 0.0, 300.0, 50.0),
        ]);
        let live = solver().compute_layout(&input, 380.0, None);
        assert_eq!(live.placements[1].span, 2);
        let locked = solver().compute_layout(&input, 380.0, Some(600.0));
        assert_eq!(locked.width, 600.0);
        assert_eq!(locked.placements[1].span, 1);
    }

    #[test]
    fn margins_are_part_of_stride_and_height() {
        let solver = GridPlacementSolver::new(LayoutConfig::default().margin(5.0));
        let input = cards(&[
            Rect::new(5.0, 5.0, 100.0, 30.0),
            Rect::new(5.0, 45.0, 100.0, 30.0),
        ]);
        let layout = solver.compute_layout(&input, 110.0, None);
        assert!(layout.is_stack());
        assert_eq!(layout.origin, Point::new(0.0, 0.0));
        assert_eq!(layout.row_heights, vec![40.0, 40.0]);
        assert_eq!(layout.slot_center(1, 1), Point::new(55.0, 60.0));
    }

    #[test]
    fn unmeasured_cards_use_default_height() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 100.0, 0.0),
            Rect::new(0.0, 0.0, 100.0, 0.0),
        ]);
        let layout = solver().compute_layout(&input, 100.0, None);
        assert_eq!(layout.row_heights, vec![40.0, 40.0]);
    }

    #[test]
    fn slot_rect_clamps_span_to_row() {
        let input = cards(&[
            Rect::new(0.0, 0.0, 100.0, 20.0),
            Rect::new(100.0, 0.0, 100.0, 20.0),
        ]);
        let layout = solver().compute_layout(&input, 200.0, None);
        assert_eq!(layout.slot_rect(1, 2), Rect::new(100.0, 0.0, 100.0, 20.0));
        assert_eq!(layout.slot_rect(2, 2), Rect::new(0.0, 20.0, 200.0, 20.0));
    }
}
