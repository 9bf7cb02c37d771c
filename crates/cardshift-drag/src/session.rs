#![forbid(unsafe_code)]

//! Per-gesture state.
//!
//! ```text
//! Idle --press--> Pending --travel > threshold--> Dragging --release--> Finishing --settled--> Idle
//!                    \--release/cancel--> Idle        \--cancel--> Idle
//! ```
//!
//! A [`PendingPress`] exists between press and drag start. A [`DragSession`]
//! exists from drag start until the release (or cancel) is processed; after a
//! release only a small [`Settling`] record is kept until cleanup.

use cardshift_core::event::Modifiers;
use cardshift_core::geometry::{Offset, Point, Rect};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::card::{CardId, NoteKind};

/// Coarse lifecycle phase, used in transition records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Pending,
    Dragging,
    Finishing,
}

/// What a drop will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Dropping commits the live ordering.
    #[default]
    Reorder,
    /// Dropping links the dragged card to a target; ordering is untouched.
    Link,
}

/// A press that has not yet moved far enough to become a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPress {
    /// Card (or group member) under the press.
    pub card: CardId,
    pub origin: Point,
    /// Press point relative to the card's top-left.
    pub grab: Offset,
    pub modifiers: Modifiers,
    pub pressed_at: Instant,
}

/// A drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The dragged unit (group representative for groups).
    pub card: CardId,
    /// Ids handed to the host on link.
    pub dragged_ids: Vec<CardId>,
    pub kind: NoteKind,
    pub origin_index: usize,
    pub current_index: usize,
    /// Press point relative to the card's top-left; kept under the pointer.
    pub grab: Offset,
    pub pointer: Point,
    /// Current visual offset from the card's layout position.
    pub drag_offset: Offset,
    pub mode: DragMode,
    pub highlighted: Option<CardId>,
    /// Layout bounds when the drag started.
    pub original_rect: Rect,
    /// Frozen container width for placement, if locking is enabled.
    pub locked_width: Option<f64>,
    pub started_at: Instant,
    /// Last time placement was recomputed.
    pub last_check: Option<Instant>,
    /// Accepted swaps so far.
    pub swaps: u32,
}

impl DragSession {
    #[must_use]
    pub fn index_changed(&self) -> bool {
        self.current_index != self.origin_index
    }

    /// Whether `id` belongs to the dragged unit.
    #[must_use]
    pub fn drags(&self, id: CardId) -> bool {
        self.card == id || self.dragged_ids.contains(&id)
    }

    /// Top-left of the dragged visual implied by the current pointer.
    #[must_use]
    pub fn desired_origin(&self) -> Point {
        self.pointer.translate(-self.grab)
    }
}

/// What is left of a released drag while its animations settle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settling {
    pub card: CardId,
    pub released_at: Instant,
    /// Cleanup runs at or after this instant.
    pub cleanup_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DragSession {
        let now = Instant::now();
        DragSession {
            card: CardId(1),
            dragged_ids: vec![CardId(1), CardId(2)],
            kind: NoteKind::Order,
            origin_index: 2,
            current_index: 2,
            grab: Offset::new(10.0, 20.0),
            pointer: Point::new(110.0, 220.0),
            drag_offset: Offset::ZERO,
            mode: DragMode::Reorder,
            highlighted: None,
            original_rect: Rect::new(100.0, 200.0, 50.0, 50.0),
            locked_width: None,
            started_at: now,
            last_check: None,
            swaps: 0,
        }
    }

    #[test]
    fn grab_point_tracks_pointer() {
        assert_eq!(session().desired_origin(), Point::new(100.0, 200.0));
    }

    #[test]
    fn group_members_are_dragged() {
        let s = session();
        assert!(s.drags(CardId(2)));
        assert!(!s.drags(CardId(3)));
        assert!(!s.index_changed());
    }
}
