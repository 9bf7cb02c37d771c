#![forbid(unsafe_code)]

//! Layout solvers for reorderable card collections.
//!
//! Two pure computations live here:
//!
//! - [`GridPlacementSolver`]: measured card rectangles + container width →
//!   a row-major slot assignment ([`GridLayout`]) that understands
//!   full-row ("double-wide") cards.
//! - [`calculate_insertion_index`]: a dragged rectangle + the current cards →
//!   the gap in the sequence it should drop into.
//!
//! Neither holds state between calls and neither can fail: empty inputs and
//! degenerate sizes fall back to defaults.

pub mod grid;
pub mod insertion;

pub use cardshift_core::event::CardId;
pub use cardshift_core::geometry::{Point, Rect, Sides};
pub use grid::{GridLayout, GridPlacementSolver, Placement};
pub use insertion::{
    calculate_insertion_index, grid_insertion_index, linear_insertion_index, move_target,
};

use serde::{Deserialize, Serialize};

/// Anything the solvers can place: an identity plus its measured rectangle.
///
/// Rectangles must be the untransformed layout bounds; any live animation
/// offset has to be removed before they reach a solver.
pub trait LayoutItem {
    fn id(&self) -> CardId;
    fn rect(&self) -> Rect;
}

impl LayoutItem for (CardId, Rect) {
    fn id(&self) -> CardId {
        self.0
    }

    fn rect(&self) -> Rect {
        self.1
    }
}

impl<T: LayoutItem> LayoutItem for &T {
    fn id(&self) -> CardId {
        (*self).id()
    }

    fn rect(&self) -> Rect {
        (*self).rect()
    }
}

/// Tunables for [`GridPlacementSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Margin around every card; included in strides and row heights.
    pub margin: Sides,
    /// Left edges closer than this belong to the same column.
    pub column_tolerance: f64,
    /// Cards at least this fraction of the container width span a full row.
    pub full_width_ratio: f64,
    /// Row height used when nothing has been measured yet.
    pub default_row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: Sides::default(),
            column_tolerance: 8.0,
            full_width_ratio: 0.75,
            default_row_height: 40.0,
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn margin(mut self, margin: impl Into<Sides>) -> Self {
        self.margin = margin.into();
        self
    }

    #[must_use]
    pub fn column_tolerance(mut self, tolerance: f64) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn full_width_ratio(mut self, ratio: f64) -> Self {
        self.full_width_ratio = ratio;
        self
    }

    #[must_use]
    pub fn default_row_height(mut self, height: f64) -> Self {
        self.default_row_height = height;
        self
    }

    /// Validation errors; empty when the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.column_tolerance >= 0.0) {
            errors.push(format!(
                "layout.column_tolerance must be >= 0 (got {})",
                self.column_tolerance
            ));
        }
        if !(self.full_width_ratio > 0.0 && self.full_width_ratio <= 1.0) {
            errors.push(format!(
                "layout.full_width_ratio must be in (0, 1] (got {})",
                self.full_width_ratio
            ));
        }
        if !(self.default_row_height > 0.0) {
            errors.push(format!(
                "layout.default_row_height must be > 0 (got {})",
                self.default_row_height
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LayoutConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let cfg = LayoutConfig::default()
            .column_tolerance(-1.0)
            .full_width_ratio(1.5)
            .default_row_height(0.0);
        assert_eq!(cfg.validate().len(), 3);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: LayoutConfig = serde_json::from_str(r#"{"column_tolerance": 4.0}"#).unwrap();
        assert_eq!(cfg.column_tolerance, 4.0);
        assert_eq!(cfg.full_width_ratio, 0.75);
        assert_eq!(cfg.default_row_height, 40.0);
    }

    #[test]
    fn tuple_is_a_layout_item() {
        let item = (CardId(3), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(item.id(), CardId(3));
        assert_eq!((&item).rect(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }
}
